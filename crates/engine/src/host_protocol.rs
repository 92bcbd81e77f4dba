//! Text protocol types for the headless `facade host` mode.
//!
//! One JSON command per stdin line, one JSON response per stdout line. The
//! host stands in for the game client: it reports the housing context and
//! actor positions, seeds the in-memory layout, edits the configuration and
//! ticks the engine. The I/O loop lives in `crates/app/src/host_mode.rs`.

use serde::{Deserialize, Serialize};

use crate::context::ActorSample;
use crate::housing::{District, HousingContext, PlotSize};
use crate::live::{Festival, PlotExterior};
use crate::records::{Facade, FestivalFacade, Preset};
use crate::slot_codec::{self, SlotValues};

// ---------------------------------------------------------------------------
// Commands (stdin → engine)
// ---------------------------------------------------------------------------

/// A character position as sent by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorPosition {
    pub id: u64,
    pub x: f32,
    pub z: f32,
}

impl From<ActorPosition> for ActorSample {
    fn from(a: ActorPosition) -> Self {
        ActorSample::new(a.id, a.x, a.z)
    }
}

/// A housing location. `ward` and `plot` are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub world: u32,
    pub territory: u16,
    pub ward: u8,
    #[serde(default)]
    pub plot: u8,
}

impl Location {
    pub fn district(&self) -> District {
        District::from_territory(self.territory)
    }

    pub fn facade(&self, exterior: SlotValues, stains: SlotValues, unified: bool) -> Facade {
        let mut facade = Facade::new(
            self.world,
            self.district(),
            self.ward,
            self.plot,
            exterior,
            stains,
        );
        facade.is_unified = unified;
        facade
    }

    pub fn festival_facade(&self, id: u16) -> FestivalFacade {
        FestivalFacade {
            world: self.world,
            district: self.district(),
            ward: self.ward,
            id,
        }
    }
}

/// Each line of stdin is parsed as one `HostCommand`, discriminated by `cmd`.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
pub enum HostCommand {
    /// Report where the local player is. `-1` ward/plot and `0` division
    /// mean "none", as the client reports them.
    #[serde(rename = "set_context")]
    SetContext {
        world: u32,
        territory: u16,
        ward: i8,
        division: u8,
        #[serde(default = "no_plot")]
        current_plot: i8,
    },

    /// Move the local player, or remove them with `null`.
    #[serde(rename = "set_player")]
    SetPlayer { player: Option<ActorPosition> },

    /// Replace the nearby non-local characters.
    #[serde(rename = "set_actors")]
    SetActors { actors: Vec<ActorPosition> },

    /// Overwrite one plot of the in-memory layout, as the client would when
    /// it loads a ward.
    #[serde(rename = "seed_plot")]
    SeedPlot {
        plot: u8,
        size: PlotSize,
        exterior_ids: [i16; 8],
        stain_ids: [i8; 8],
    },

    #[serde(rename = "set_festivals")]
    SetFestivals { festivals: [Festival; 8] },

    /// Toggle whether the in-memory layout is loaded.
    #[serde(rename = "set_available")]
    SetAvailable { available: bool },

    #[serde(rename = "add_facade")]
    AddFacade {
        location: Location,
        #[serde(default)]
        exterior: SlotValues,
        #[serde(default)]
        stains: SlotValues,
        #[serde(default)]
        unified: bool,
    },

    #[serde(rename = "remove_facade")]
    RemoveFacade { location: Location },

    #[serde(rename = "add_festival_facade")]
    AddFestivalFacade { location: Location, id: u16 },

    #[serde(rename = "remove_festival_facade")]
    RemoveFestivalFacade { location: Location },

    /// Store the live exterior of a plot in the current division as a preset.
    #[serde(rename = "save_preset")]
    SavePreset { name: String, plot: u8 },

    #[serde(rename = "apply_preset")]
    ApplyPreset { name: String, location: Location },

    #[serde(rename = "set_hide_players")]
    SetHidePlayers { enabled: bool },

    /// Run `ticks` engine updates.
    #[serde(rename = "tick")]
    Tick {
        #[serde(default = "one_tick")]
        ticks: u32,
    },

    /// Report engine state.
    #[serde(rename = "status")]
    Status,

    /// Report one plot's live data.
    #[serde(rename = "inspect_plot")]
    InspectPlot { plot: u8 },

    /// Record the local player's position as the next corner of the plot
    /// the client reports them on.
    #[serde(rename = "record_corner")]
    RecordCorner,

    /// Write the recorded corners as a geometry dataset.
    #[serde(rename = "export_corners")]
    ExportCorners { path: String },

    /// Write the configuration file.
    #[serde(rename = "save_config")]
    SaveConfig,

    /// Restore everything and end the session.
    #[serde(rename = "quit")]
    Quit,
}

fn no_plot() -> i8 {
    -1
}

fn one_tick() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Responses (engine → stdout)
// ---------------------------------------------------------------------------

/// Every response carries the protocol version and a tagged payload.
#[derive(Debug, Serialize)]
pub struct HostResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

/// A context as reported back to the host. `ward` is 1-based, as shown to
/// players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextReport {
    pub world: u32,
    pub district: String,
    pub ward: Option<u16>,
    pub division: Option<u8>,
}

impl From<HousingContext> for ContextReport {
    fn from(ctx: HousingContext) -> Self {
        Self {
            world: ctx.world,
            district: ctx.district.label().to_string(),
            ward: ctx.ward.map(|w| u16::from(w) + 1),
            division: ctx.division.map(|d| d.raw()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotReport {
    pub plot: u8,
    pub size: PlotSize,
    pub exterior_ids: [i16; 8],
    pub stain_ids: [i8; 8],
    pub loaded: bool,
    /// The engine holds an original snapshot, so the plot shows a facade.
    pub overridden: bool,
}

impl PlotReport {
    pub fn new(plot: u8, data: &PlotExterior, overridden: bool) -> Self {
        Self {
            plot,
            size: data.size,
            exterior_ids: data.exterior_ids,
            stain_ids: data.stain_ids,
            loaded: data.is_loaded(),
            overridden,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetReport {
    pub name: String,
    pub size: PlotSize,
    pub exterior: SlotValues,
    pub stains: SlotValues,
}

impl From<&Preset> for PresetReport {
    fn from(preset: &Preset) -> Self {
        Self {
            name: preset.name.clone(),
            size: preset.plot_size,
            exterior: slot_codec::unpack(preset.packed_exterior_ids),
            stains: slot_codec::unpack(preset.packed_stain_ids),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub context: ContextReport,
    pub occupants: Vec<u8>,
    pub awaiting_load: bool,
    pub overridden_plots: Vec<u8>,
    pub hidden_actors: Vec<u64>,
    pub festivals: [Festival; 8],
    pub facades_here: usize,
    pub facades_elsewhere: usize,
    pub passes: u64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    /// The engine is running and waiting for commands.
    #[serde(rename = "ready")]
    Ready { plots: usize, facades: usize },

    #[serde(rename = "ok")]
    Ok,

    /// Ticks ran; lists every context change they produced.
    #[serde(rename = "ticked")]
    Ticked {
        ticks: u32,
        division_changes: Vec<ContextReport>,
    },

    #[serde(rename = "status")]
    Status { status: StatusReport },

    #[serde(rename = "plot")]
    Plot { plot: PlotReport },

    #[serde(rename = "preset")]
    Preset { preset: PresetReport },

    #[serde(rename = "corner_recorded")]
    CornerRecorded { plot: u8, corner: u8 },

    #[serde(rename = "plot_complete")]
    PlotComplete { plot: u8 },

    #[serde(rename = "error")]
    Error { message: String },

    /// Response to `quit`, after the forced restore.
    #[serde(rename = "goodbye")]
    Goodbye { restored: Vec<PlotReport> },
}

/// Bump when the command or response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub fn make_response(payload: ResponsePayload) -> HostResponse {
    HostResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
