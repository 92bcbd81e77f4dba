//! Access to host-owned live state.
//!
//! The engine never dereferences host memory directly. The host installs
//! implementations of [`HousingLayout`] and [`ActorVisibility`] as resources,
//! and every read or write goes through an availability check first, so a
//! missing layout (not in a housing instance, layout still loading) turns
//! into a silent no-op for the tick.

mod memory;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{EXTERIOR_NOT_LOADED, FESTIVAL_SLOTS, SLOT_COUNT};
use crate::housing::PlotSize;

pub use memory::{MemoryActors, MemoryHousing};

/// Stable id of a character in the host's object table.
pub type ActorId = u64;

// =============================================================================
// Live data
// =============================================================================

/// Exterior appearance of one plot as stored by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlotExterior {
    pub size: PlotSize,
    /// Appearance ids in slot order. `-1` in slot 0 means "not loaded".
    pub exterior_ids: [i16; SLOT_COUNT],
    pub stain_ids: [i8; SLOT_COUNT],
}

impl PlotExterior {
    /// A plot the host has allocated but not populated yet.
    pub fn unloaded(size: PlotSize) -> Self {
        Self {
            size,
            exterior_ids: [EXTERIOR_NOT_LOADED; SLOT_COUNT],
            stain_ids: [0; SLOT_COUNT],
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.exterior_ids[0] != EXTERIOR_NOT_LOADED
    }
}

/// One ambient festival entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Festival {
    pub id: u16,
    pub phase: u16,
}

/// The full festival state, always exactly [`FESTIVAL_SLOTS`] entries.
pub type FestivalSet = [Festival; FESTIVAL_SLOTS];

// =============================================================================
// Host traits
// =============================================================================

/// The host's active housing layout: per-plot exterior data and festivals.
///
/// Plot indices are absolute ward plot ids (`0..60`).
pub trait HousingLayout: Send + Sync + 'static {
    /// Whether the layout exists and is fully initialised right now.
    fn is_available(&self) -> bool;

    /// Number of plot entries in the exterior array.
    fn plot_count(&self) -> usize;

    fn read_plot(&self, plot: u8) -> Option<PlotExterior>;

    /// Overwrite a plot's ids and flag the layout for re-render.
    /// Returns `false` when nothing was written.
    fn write_plot(&mut self, plot: u8, data: &PlotExterior) -> bool;

    fn read_festivals(&self) -> Option<FestivalSet>;

    fn write_festivals(&mut self, festivals: &FestivalSet) -> bool;
}

/// Render visibility of other characters, used by hide-players mode.
pub trait ActorVisibility: Send + Sync + 'static {
    /// Hide `actor`. Returns `false` if the actor is not present.
    fn hide(&mut self, actor: ActorId) -> bool;

    /// Undo [`ActorVisibility::hide`]. Returns `false` if the actor is gone.
    fn show(&mut self, actor: ActorId) -> bool;
}

// =============================================================================
// Resources
// =============================================================================

/// Host layout accessor installed by the host.
#[derive(Resource)]
pub struct LiveHousing(pub Box<dyn HousingLayout>);

impl LiveHousing {
    pub fn new(layout: impl HousingLayout) -> Self {
        Self(Box::new(layout))
    }
}

/// Host actor-visibility accessor installed by the host.
#[derive(Resource)]
pub struct LiveActors(pub Box<dyn ActorVisibility>);

impl LiveActors {
    pub fn new(actors: impl ActorVisibility) -> Self {
        Self(Box::new(actors))
    }
}

// =============================================================================
// Guarded access
// =============================================================================

/// Read a plot, or `None` when the layout is unavailable or the index is out
/// of range.
pub fn read_plot(layout: &dyn HousingLayout, plot: u8) -> Option<PlotExterior> {
    if !layout.is_available() || usize::from(plot) >= layout.plot_count() {
        return None;
    }
    layout.read_plot(plot)
}

/// Write a plot only if it still has the size `data` was taken from.
///
/// Writing a small-plot snapshot over a plot that has since become a large
/// plot would corrupt the render, so a size change drops the write.
pub fn write_plot(layout: &mut dyn HousingLayout, plot: u8, data: &PlotExterior) -> bool {
    let Some(live) = read_plot(layout, plot) else {
        return false;
    };
    if live.size != data.size {
        warn!(
            "Facade: plot {} is {} but data is for {}, write dropped",
            plot + 1,
            live.size.label(),
            data.size.label()
        );
        return false;
    }
    layout.write_plot(plot, data)
}

pub fn read_festivals(layout: &dyn HousingLayout) -> Option<FestivalSet> {
    if !layout.is_available() {
        return None;
    }
    layout.read_festivals()
}

pub fn write_festivals(layout: &mut dyn HousingLayout, festivals: &FestivalSet) -> bool {
    layout.is_available() && layout.write_festivals(festivals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(size: PlotSize) -> PlotExterior {
        PlotExterior {
            size,
            exterior_ids: [100, 101, 102, 103, 0, 0, 0, 107],
            stain_ids: [1, 2, 3, 4, 0, 0, 0, 8],
        }
    }

    #[test]
    fn test_unloaded_plot_detected() {
        assert!(!PlotExterior::unloaded(PlotSize::Small).is_loaded());
        assert!(loaded(PlotSize::Small).is_loaded());
    }

    #[test]
    fn test_guarded_read_unavailable() {
        let housing = MemoryHousing::new();
        housing.set_plot(3, loaded(PlotSize::Medium));
        assert!(read_plot(&housing, 3).is_some());

        housing.set_available(false);
        assert!(read_plot(&housing, 3).is_none());
        assert!(read_festivals(&housing).is_none());
    }

    #[test]
    fn test_guarded_read_out_of_range() {
        let housing = MemoryHousing::new();
        assert!(read_plot(&housing, 60).is_none());
    }

    #[test]
    fn test_guarded_write_rejects_size_change() {
        let mut housing = MemoryHousing::new();
        housing.set_plot(3, loaded(PlotSize::Large));
        housing.clear_update_pending();

        let mut data = loaded(PlotSize::Small);
        data.exterior_ids[0] = 999;
        assert!(!write_plot(&mut housing, 3, &data));
        assert_eq!(housing.plot(3).unwrap().exterior_ids[0], 100);
        assert!(!housing.update_pending());

        data.size = PlotSize::Large;
        assert!(write_plot(&mut housing, 3, &data));
        assert_eq!(housing.plot(3).unwrap().exterior_ids[0], 999);
        assert!(housing.update_pending());
    }
}
