use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::housing::HousingContext;
use crate::live::{ActorId, FestivalSet};
use crate::plot_locator::OccupancyCache;

// =============================================================================
// Events
// =============================================================================

/// Sent once whenever the (world, district, ward, division) context changes.
/// Open editors for the old division should close on this.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionChanged {
    pub previous: HousingContext,
    pub current: HousingContext,
}

/// Request the forced restore of everything the engine changed. After it has
/// been handled the engine stays inert.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ShutdownFacades;

// =============================================================================
// Pass results
// =============================================================================

/// What one override pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Applied { written: usize, restored: usize },
    /// A plot in the current division is not populated yet. Nothing was
    /// written; the pass has to run again next tick.
    NotLoaded { plot: u8 },
    /// No live layout this tick.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FestivalOutcome {
    Applied { id: u16 },
    Restored,
    Unchanged,
    Unavailable,
}

// =============================================================================
// Engine state
// =============================================================================

/// Everything the engine remembers between ticks, except the per-plot
/// snapshots which live in [`crate::snapshot_store::SnapshotStore`].
#[derive(Resource, Debug, Default)]
pub struct FacadeEngineState {
    pub(crate) context: HousingContext,
    pub(crate) context_changed: bool,
    pub(crate) festival_dirty: bool,
    /// Plots that currently block an override.
    pub(crate) occupants: Vec<u8>,
    pub(crate) occupants_changed: bool,
    /// Plots the local player stands on, ground truth included.
    pub(crate) local_occupants: Vec<u8>,
    pub(crate) was_not_loaded: bool,
    pub(crate) festival_original: Option<FestivalSet>,
    pub(crate) hidden_actors: BTreeSet<ActorId>,
    pub(crate) local_cache: OccupancyCache,
    pub(crate) others_cache: OccupancyCache,
    pub(crate) passes: u64,
    pub(crate) shut_down: bool,
}

impl FacadeEngineState {
    pub fn context(&self) -> HousingContext {
        self.context
    }

    pub fn occupants(&self) -> &[u8] {
        &self.occupants
    }

    pub fn local_occupants(&self) -> &[u8] {
        &self.local_occupants
    }

    /// Whether the last pass found an unloaded plot and will retry.
    pub fn awaiting_load(&self) -> bool {
        self.was_not_loaded
    }

    pub fn festival_original(&self) -> Option<&FestivalSet> {
        self.festival_original.as_ref()
    }

    pub fn hidden_actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.hidden_actors.iter().copied()
    }

    /// Override passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}
