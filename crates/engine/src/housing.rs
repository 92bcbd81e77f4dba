//! Housing location keys: district, division, ward and plot size.
//!
//! The host reports raw numbers (territory id, signed ward, division byte);
//! these types turn them into the checked keys the rest of the engine uses.

use std::ops::Range;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::PLOTS_PER_DIVISION;

// =============================================================================
// District
// =============================================================================

/// Residential district, keyed by the host's territory id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Encode, Decode,
    Serialize, Deserialize,
)]
pub enum District {
    Mist,
    LavenderBeds,
    TheGoblet,
    Shirogane,
    Empyreum,
    /// Any territory that is not a housing district.
    #[default]
    Invalid,
}

impl District {
    /// Every real district, in territory id order.
    pub const ALL: [District; 5] = [
        District::Mist,
        District::LavenderBeds,
        District::TheGoblet,
        District::Shirogane,
        District::Empyreum,
    ];

    pub fn from_territory(territory: u16) -> Self {
        match territory {
            339 => District::Mist,
            340 => District::LavenderBeds,
            341 => District::TheGoblet,
            641 => District::Shirogane,
            979 => District::Empyreum,
            _ => District::Invalid,
        }
    }

    pub fn territory(self) -> u16 {
        match self {
            District::Mist => 339,
            District::LavenderBeds => 340,
            District::TheGoblet => 341,
            District::Shirogane => 641,
            District::Empyreum => 979,
            District::Invalid => 0,
        }
    }

    pub fn is_valid(self) -> bool {
        self != District::Invalid
    }

    pub fn label(self) -> &'static str {
        match self {
            District::Mist => "Mist",
            District::LavenderBeds => "The Lavender Beds",
            District::TheGoblet => "The Goblet",
            District::Shirogane => "Shirogane",
            District::Empyreum => "Empyreum",
            District::Invalid => "Invalid",
        }
    }
}

// =============================================================================
// Division
// =============================================================================

/// One of the two halves of a ward's plot range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode, Serialize,
    Deserialize,
)]
pub enum Division {
    First,
    Second,
}

impl Division {
    pub const ALL: [Division; 2] = [Division::First, Division::Second];

    /// Host division byte: `1` or `2`; anything else means "no division".
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Division::First),
            2 => Some(Division::Second),
            _ => None,
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Division::First => 1,
            Division::Second => 2,
        }
    }

    /// Plot ids owned by this division.
    pub fn plot_range(self) -> Range<u8> {
        match self {
            Division::First => 0..PLOTS_PER_DIVISION,
            Division::Second => PLOTS_PER_DIVISION..PLOTS_PER_DIVISION * 2,
        }
    }

    pub fn contains(self, plot: u8) -> bool {
        self.plot_range().contains(&plot)
    }

    /// Division that owns `plot`, if the id is inside the ward.
    pub fn of_plot(plot: u8) -> Option<Self> {
        Division::ALL.into_iter().find(|d| d.contains(plot))
    }
}

// =============================================================================
// Plot size
// =============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Encode, Decode, Serialize, Deserialize,
)]
pub enum PlotSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl PlotSize {
    pub fn label(self) -> &'static str {
        match self {
            PlotSize::Small => "Small",
            PlotSize::Medium => "Medium",
            PlotSize::Large => "Large",
        }
    }
}

// =============================================================================
// Context
// =============================================================================

/// Where the local player currently is, as far as facades are concerned.
///
/// Two contexts compare equal only when world, district, ward and division
/// all match; any difference invalidates every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HousingContext {
    pub world: u32,
    pub district: District,
    pub ward: Option<u8>,
    pub division: Option<Division>,
}

impl HousingContext {
    /// `Active` state: inside a housing division where overrides may apply.
    pub fn is_active(&self) -> bool {
        self.district.is_valid() && self.ward.is_some() && self.division.is_some()
    }

    /// Same district and ward, regardless of division.
    pub fn same_ward(&self, other: &HousingContext) -> bool {
        self.world == other.world && self.district == other.district && self.ward == other.ward
    }

    /// Whether `plot` belongs to the current division.
    pub fn owns_plot(&self, plot: u8) -> bool {
        self.division.is_some_and(|d| d.contains(plot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_territory_roundtrip() {
        for district in District::ALL {
            assert_eq!(District::from_territory(district.territory()), district);
        }
        assert_eq!(District::from_territory(132), District::Invalid);
        assert_eq!(District::from_territory(0), District::Invalid);
    }

    #[test]
    fn test_division_partition() {
        assert_eq!(Division::First.plot_range(), 0..30);
        assert_eq!(Division::Second.plot_range(), 30..60);
        for plot in 0..60u8 {
            let first = Division::First.contains(plot);
            let second = Division::Second.contains(plot);
            assert!(first ^ second, "plot {plot} must be in exactly one division");
            assert_eq!(first, plot < 30);
        }
        assert_eq!(Division::of_plot(29), Some(Division::First));
        assert_eq!(Division::of_plot(30), Some(Division::Second));
        assert_eq!(Division::of_plot(60), None);
    }

    #[test]
    fn test_division_from_raw() {
        assert_eq!(Division::from_raw(0), None);
        assert_eq!(Division::from_raw(1), Some(Division::First));
        assert_eq!(Division::from_raw(2), Some(Division::Second));
        assert_eq!(Division::from_raw(3), None);
    }

    #[test]
    fn test_context_active() {
        let mut ctx = HousingContext {
            world: 73,
            district: District::Mist,
            ward: Some(4),
            division: Some(Division::First),
        };
        assert!(ctx.is_active());
        assert!(ctx.owns_plot(5));
        assert!(!ctx.owns_plot(35));

        ctx.division = None;
        assert!(!ctx.is_active());
        assert!(!ctx.owns_plot(5));
    }
}
