use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;

use crate::housing::HousingContext;
use crate::live::{self, HousingLayout, PlotExterior};
use crate::records::Facade;
use crate::snapshot_store::SnapshotStore;

use super::types::PassOutcome;

/// Overlay a facade on the original data: explicit lanes take the configured
/// value, absent lanes take the original. A value the layout cannot hold
/// (exterior above `i16::MAX`, stain above `u8::MAX`) keeps the original lane.
pub fn merge_facade(facade: &Facade, original: &PlotExterior) -> PlotExterior {
    let mut merged = *original;
    for (lane, value) in facade.exterior_ids().into_iter().enumerate() {
        let Some(id) = value else { continue };
        match i16::try_from(id) {
            Ok(id) => merged.exterior_ids[lane] = id,
            Err(_) => warn!(
                "Facade: exterior id {} for plot {} lane {} is out of range",
                id,
                facade.plot + 1,
                lane
            ),
        }
    }
    for (lane, value) in facade.stain_ids().into_iter().enumerate() {
        let Some(id) = value else { continue };
        match u8::try_from(id) {
            // Stains are bytes; the layout stores them signed.
            Ok(id) => merged.stain_ids[lane] = id as i8,
            Err(_) => warn!(
                "Facade: stain id {} for plot {} lane {} is out of range",
                id,
                facade.plot + 1,
                lane
            ),
        }
    }
    merged
}

/// One override pass over the current division.
///
/// Occupied plots get their original back and drop the snapshot; free plots
/// are snapshotted once and overridden. A `reset` restores every overridden
/// plot but keeps the snapshots. Any snapshot whose plot no longer has a
/// facade here is restored and released at the end.
///
/// Before anything is written every targeted plot, free or occupied, is
/// checked; one that the host has not populated yet aborts the pass without
/// writes. A reset skips the check and leaves unloaded plots alone.
pub fn run_override_pass<'a>(
    layout: &mut dyn HousingLayout,
    snapshots: &mut SnapshotStore,
    ctx: &HousingContext,
    facades: impl IntoIterator<Item = &'a Facade>,
    occupants: &[u8],
    reset: bool,
) -> PassOutcome {
    if !layout.is_available() {
        return PassOutcome::Unavailable;
    }

    // Later records for the same plot win.
    let targets: BTreeMap<u8, &Facade> = facades
        .into_iter()
        .filter(|f| f.applies_to(ctx))
        .map(|f| (f.plot, f))
        .collect();

    let mut live_data = Vec::with_capacity(targets.len());
    for (&plot, &facade) in &targets {
        let Some(live) = live::read_plot(layout, plot) else {
            debug!("Facade: plot {} is outside the live layout", plot + 1);
            continue;
        };
        if !live.is_loaded() && !reset {
            return PassOutcome::NotLoaded { plot };
        }
        live_data.push((plot, facade, live));
    }

    let mut handled = BTreeSet::new();
    let mut written = 0;
    let mut restored = 0;

    for (plot, facade, live) in live_data {
        if reset {
            handled.insert(plot);
            if !live.is_loaded() {
                continue;
            }
            if let Some(original) = snapshots.get(plot) {
                if live::write_plot(layout, plot, original) {
                    restored += 1;
                }
            }
        } else if occupants.contains(&plot) {
            if let Some(original) = snapshots.release(plot) {
                if live::write_plot(layout, plot, &original) {
                    restored += 1;
                }
            }
        } else {
            snapshots.capture(plot, live);
            let original = snapshots.get(plot).copied().unwrap_or(live);
            let merged = merge_facade(facade, &original);
            if merged != live && live::write_plot(layout, plot, &merged) {
                written += 1;
            }
            handled.insert(plot);
        }
    }

    for plot in snapshots.plots() {
        if handled.contains(&plot) {
            continue;
        }
        if let Some(original) = snapshots.release(plot) {
            if live::write_plot(layout, plot, &original) {
                restored += 1;
            }
        }
    }

    PassOutcome::Applied { written, restored }
}
