use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::live::PlotExterior;

/// Original exterior data of every plot the engine has overridden.
///
/// A snapshot is taken the first time a plot is overridden and is never
/// replaced while it exists: capturing again would save already-overridden
/// data as if it were the original. It goes away when the plot is restored
/// or when the housing context changes.
#[derive(Resource, Debug, Clone, Default)]
pub struct SnapshotStore {
    originals: BTreeMap<u8, PlotExterior>,
}

impl SnapshotStore {
    pub fn get(&self, plot: u8) -> Option<&PlotExterior> {
        self.originals.get(&plot)
    }

    pub fn contains(&self, plot: u8) -> bool {
        self.originals.contains_key(&plot)
    }

    /// Store `data` for `plot` unless a snapshot already exists.
    /// Returns whether it was stored.
    pub fn capture(&mut self, plot: u8, data: PlotExterior) -> bool {
        if self.originals.contains_key(&plot) {
            return false;
        }
        self.originals.insert(plot, data);
        true
    }

    pub fn release(&mut self, plot: u8) -> Option<PlotExterior> {
        self.originals.remove(&plot)
    }

    pub fn clear(&mut self) {
        self.originals.clear();
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Plots that currently hold a snapshot, ascending.
    pub fn plots(&self) -> Vec<u8> {
        self.originals.keys().copied().collect()
    }
}
