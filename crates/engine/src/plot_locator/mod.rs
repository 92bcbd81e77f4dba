//! Plot occupancy: which plots characters are standing on.
//!
//! The static corner data is loaded once at startup and never changes. Live
//! positions come from the host every tick; [`OccupancyCache`] skips the
//! actors × plots scan when nobody moved.

mod dataset;
mod recorder;
#[cfg(test)]
mod tests;
mod validate;

use std::collections::HashMap;

use bevy::prelude::*;

use crate::context::ActorSample;
use crate::housing::{District, Division};
use crate::live::ActorId;
use crate::plot_geometry::{self, Quad};

pub use dataset::{
    parse_dataset, read_dataset, write_dataset, Corner, DivisionPlots, PlotCorners,
    PlotDataError,
};
pub use recorder::{CornerRecorder, RecordOutcome};
pub use validate::{sort_dataset, validate_dataset, DatasetIssue};

/// One plot's polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    pub plot: u8,
    pub quad: Quad,
}

impl PlotBounds {
    pub fn contains(&self, point: Vec2, padding: f32) -> bool {
        plot_geometry::contains(&self.quad, point, padding)
    }
}

// =============================================================================
// Locator
// =============================================================================

/// Static plot polygons keyed by (district, division).
#[derive(Resource, Debug, Clone, Default)]
pub struct PlotLocator {
    plots: HashMap<(District, Division), Vec<PlotBounds>>,
}

impl PlotLocator {
    /// Build from dataset records, merging entries that share a key.
    ///
    /// Entries for unknown districts or divisions, plots with a negative id
    /// or an id outside their division, and plots with an unrecorded corner
    /// are skipped with a warning.
    pub fn from_records(records: impl IntoIterator<Item = DivisionPlots>) -> Self {
        let mut plots: HashMap<(District, Division), Vec<PlotBounds>> = HashMap::new();
        for record in records {
            let district = District::from_territory(record.district);
            let Some(division) = Division::from_raw(record.division) else {
                warn!(
                    "Plot dataset: skipping entry with invalid division {} (territory {})",
                    record.division, record.district
                );
                continue;
            };
            if !district.is_valid() {
                warn!(
                    "Plot dataset: skipping entry for unknown territory {}",
                    record.district
                );
                continue;
            }

            let bucket = plots.entry((district, division)).or_default();
            for corners in record.plots {
                let Some(plot) = u8::try_from(corners.plot_id)
                    .ok()
                    .filter(|p| division.contains(*p))
                else {
                    warn!(
                        "Plot dataset: plot id {} is outside {} division {}",
                        corners.plot_id,
                        district.label(),
                        division.raw()
                    );
                    continue;
                };
                if corners.has_empty_corner() {
                    warn!(
                        "Plot dataset: plot {} of {} division {} has an unrecorded corner",
                        plot + 1,
                        district.label(),
                        division.raw()
                    );
                    continue;
                }
                let quad = corners.corners().map(Vec2::from);
                bucket.retain(|b| b.plot != plot);
                bucket.push(PlotBounds { plot, quad });
            }
            bucket.sort_by_key(|b| b.plot);
        }
        Self { plots }
    }

    /// Build from a parsed dataset. A dataset with no usable plot is an
    /// error, and any error here is fatal for the engine.
    pub fn from_dataset(records: Vec<DivisionPlots>) -> Result<Self, PlotDataError> {
        let locator = Self::from_records(records);
        if locator.is_empty() {
            return Err(PlotDataError::Empty);
        }
        info!("Loaded {} plot polygons", locator.plot_count());
        Ok(locator)
    }

    pub fn from_json_str(json: &str) -> Result<Self, PlotDataError> {
        Self::from_dataset(parse_dataset(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.plots.values().all(Vec::is_empty)
    }

    pub fn plot_count(&self) -> usize {
        self.plots.values().map(Vec::len).sum()
    }

    pub fn plots_in(&self, district: District, division: Division) -> Option<&[PlotBounds]> {
        self.plots
            .get(&(district, division))
            .map(Vec::as_slice)
            .filter(|p| !p.is_empty())
    }

    /// First plot of the division containing `point`.
    pub fn locate(
        &self,
        district: District,
        division: Division,
        point: Vec2,
        padding: f32,
    ) -> Option<u8> {
        self.plots_in(district, division)?
            .iter()
            .find(|b| b.contains(point, padding))
            .map(|b| b.plot)
    }

    /// Every (actor, plot) pair where the actor is inside the padded plot.
    /// `None` when there is no geometry for the division.
    pub fn scan(
        &self,
        district: District,
        division: Division,
        actors: &[ActorSample],
        padding: f32,
    ) -> Option<Vec<(ActorId, u8)>> {
        let plots = self.plots_in(district, division)?;
        let mut hits = Vec::new();
        for actor in actors {
            for bounds in plots {
                if bounds.contains(actor.position, padding) {
                    hits.push((actor.id, bounds.plot));
                }
            }
        }
        Some(hits)
    }
}

// =============================================================================
// Occupancy cache
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct ScanKey {
    district: District,
    division: Division,
    padding: f32,
    actors: Vec<ActorSample>,
}

/// Memoised occupancy for one kind of query (local player, or everyone else).
#[derive(Debug, Clone, Default)]
pub struct OccupancyCache {
    key: Option<ScanKey>,
    /// `None` when the division had no geometry at scan time.
    hits: Option<Vec<(ActorId, u8)>>,
    scans: u64,
}

impl OccupancyCache {
    /// Sorted, de-duplicated plots occupied by `actors`, plus the host's
    /// ground-truth plot when it reports one.
    ///
    /// The geometric part is reused as long as district, division, padding
    /// and every (position, id) pair are exactly the same as last call.
    pub fn current_occupants(
        &mut self,
        locator: &PlotLocator,
        district: District,
        division: Division,
        actors: &[ActorSample],
        padding: f32,
        ground_truth: Option<u8>,
    ) -> Vec<u8> {
        self.refresh(locator, district, division, actors, padding);

        let mut plots: Vec<u8> = self
            .hits
            .iter()
            .flatten()
            .map(|&(_, plot)| plot)
            .chain(ground_truth)
            .collect();
        plots.sort_unstable();
        plots.dedup();
        plots
    }

    /// (actor, plot) pairs from the last scan.
    pub fn assignments(&self) -> &[(ActorId, u8)] {
        self.hits.as_deref().unwrap_or(&[])
    }

    /// Number of full scans performed; cache hits do not count.
    pub fn scans(&self) -> u64 {
        self.scans
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.hits = None;
    }

    fn refresh(
        &mut self,
        locator: &PlotLocator,
        district: District,
        division: Division,
        actors: &[ActorSample],
        padding: f32,
    ) {
        let unchanged = self.key.as_ref().is_some_and(|k| {
            k.district == district
                && k.division == division
                && k.padding == padding
                && k.actors == actors
        });
        if unchanged {
            return;
        }

        self.hits = locator.scan(district, division, actors, padding);
        self.key = Some(ScanKey {
            district,
            division,
            padding,
            actors: actors.to_vec(),
        });
        self.scans += 1;
    }
}
