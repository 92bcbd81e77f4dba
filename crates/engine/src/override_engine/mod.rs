//! Per-tick facade orchestration.
//!
//! Each `Update` runs, in order: shutdown handling, context tracking,
//! occupancy, the override pass, hide-players visibility and the festival
//! pass. The override pass only runs when occupancy, the context or the
//! configuration changed, or when the previous pass hit an unloaded plot.
//! The festival pass only runs on ward changes and configuration changes.

mod festival;
mod pass;
mod queries;
mod systems;
mod types;
mod visibility;

pub use festival::{forced_festivals, run_festival_pass};
pub use pass::{merge_facade, run_override_pass};
pub use queries::{plot_exterior, plot_size};
pub use systems::{
    apply_facades, apply_festival, apply_hidden_actors, handle_shutdown, track_context,
    update_occupancy, OverrideEnginePlugin,
};
pub use types::{
    DivisionChanged, FacadeEngineState, FestivalOutcome, PassOutcome, ShutdownFacades,
};
pub use visibility::{actors_to_hide, sync_hidden_actors};
