//! Packed slot values: eight optional 16-bit selections in one `u128`.
//!
//! Lane `i` occupies bits `16 * i .. 16 * (i + 1)`, in [`ExteriorSlot`] order
//! (roof in the lowest lane, fence in the highest). An absent selection is
//! stored as [`LANE_ABSENT`] (`0xFFFF`, all bits set). Zero is an ordinary
//! id, so "undyed" (dye 0) survives a round-trip as `Some(0)`.
//!
//! The sentinel never escapes this module: callers only see `Option<u16>`.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{LANE_ABSENT, LANE_BITS, SLOT_COUNT};

/// Eight optional selections, one per [`ExteriorSlot`].
pub type SlotValues = [Option<u16>; SLOT_COUNT];

/// Every lane absent.
pub const ALL_ABSENT: SlotValues = [None; SLOT_COUNT];

const LANE_MASK: u128 = 0xFFFF;

/// Appearance slots, in lane order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode, Serialize,
    Deserialize,
)]
pub enum ExteriorSlot {
    Roof,
    Walls,
    Windows,
    Door,
    OptionalRoof,
    OptionalWall,
    OptionalSignboard,
    Fence,
}

impl ExteriorSlot {
    pub const ALL: [ExteriorSlot; SLOT_COUNT] = [
        ExteriorSlot::Roof,
        ExteriorSlot::Walls,
        ExteriorSlot::Windows,
        ExteriorSlot::Door,
        ExteriorSlot::OptionalRoof,
        ExteriorSlot::OptionalWall,
        ExteriorSlot::OptionalSignboard,
        ExteriorSlot::Fence,
    ];

    pub fn lane(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ExteriorSlot::Roof => "Roof",
            ExteriorSlot::Walls => "Walls",
            ExteriorSlot::Windows => "Windows",
            ExteriorSlot::Door => "Door",
            ExteriorSlot::OptionalRoof => "Roof Decoration",
            ExteriorSlot::OptionalWall => "Wall Decoration",
            ExteriorSlot::OptionalSignboard => "Placard",
            ExteriorSlot::Fence => "Fence",
        }
    }
}

/// Pack eight optional ids into one value.
///
/// `Some(0xFFFF)` is outside the id range and packs as absent.
pub fn pack(values: SlotValues) -> u128 {
    values
        .iter()
        .enumerate()
        .fold(0u128, |packed, (lane, value)| {
            let raw = value.unwrap_or(LANE_ABSENT);
            packed | (u128::from(raw) << (LANE_BITS as usize * lane))
        })
}

/// Unpack a value produced by [`pack`]. Total: every bit pattern decodes.
pub fn unpack(packed: u128) -> SlotValues {
    let mut values = ALL_ABSENT;
    for (lane, value) in values.iter_mut().enumerate() {
        *value = lane_value(packed, lane);
    }
    values
}

/// Read a single lane without unpacking the rest.
pub fn get(packed: u128, slot: ExteriorSlot) -> Option<u16> {
    lane_value(packed, slot.lane())
}

/// Replace a single lane, leaving the others untouched.
pub fn with(packed: u128, slot: ExteriorSlot, value: Option<u16>) -> u128 {
    let shift = LANE_BITS as usize * slot.lane();
    let raw = u128::from(value.unwrap_or(LANE_ABSENT));
    (packed & !(LANE_MASK << shift)) | (raw << shift)
}

/// Packed value with every lane absent.
pub fn empty() -> u128 {
    pack(ALL_ABSENT)
}

/// Number of lanes carrying an explicit selection.
pub fn explicit_count(packed: u128) -> usize {
    unpack(packed).iter().filter(|v| v.is_some()).count()
}

fn lane_value(packed: u128, lane: usize) -> Option<u16> {
    let raw = ((packed >> (LANE_BITS as usize * lane)) & LANE_MASK) as u16;
    (raw != LANE_ABSENT).then_some(raw)
}
