/// Number of appearance (and dye) slots per plot.
pub const SLOT_COUNT: usize = 8;

/// Bit width of one lane in a packed slot value.
pub const LANE_BITS: u32 = 16;

/// Lane value meaning "no explicit selection". Never a valid id.
pub const LANE_ABSENT: u16 = u16::MAX;

/// Largest id a lane can carry.
pub const MAX_SLOT_ID: u16 = LANE_ABSENT - 1;

/// Plots per division. Division 1 owns `[0, 30)`, division 2 owns `[30, 60)`.
pub const PLOTS_PER_DIVISION: u8 = 30;

/// Plots per ward, i.e. the length of the live exterior plot array.
pub const PLOTS_PER_WARD: usize = PLOTS_PER_DIVISION as usize * 2;

/// Live appearance id meaning the host has not finished loading the plot.
pub const EXTERIOR_NOT_LOADED: i16 = -1;

/// Number of ambient festival slots on the live layout.
pub const FESTIVAL_SLOTS: usize = 8;

/// Padding (map units) used when locating the local player's own plot.
pub const LOCAL_PLAYER_PADDING: f32 = 7.5;

/// Padding (map units) used when deciding whether another character is
/// physically standing on a facade plot.
pub const OTHER_ACTOR_PADDING: f32 = 1.0;
