use bevy::math::Vec2;

use crate::housing::{District, Division};

use super::{sort_dataset, Corner, DivisionPlots, PlotCorners};

/// Result of recording one corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Stored corner number `corner` (1..=4) for `plot`.
    Recorded { plot: u8, corner: u8 },
    /// The plot already has four corners; nothing changed.
    Complete { plot: u8 },
    /// The host reports no plot under the player.
    NotOnPlot,
}

/// Authoring helper for the geometry dataset.
///
/// Stand on a corner of the plot the host says you are on and record it;
/// four recordings complete a plot.
#[derive(Debug, Clone, Default)]
pub struct CornerRecorder {
    records: Vec<DivisionPlots>,
}

impl CornerRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue from an existing dataset.
    pub fn with_records(records: Vec<DivisionPlots>) -> Self {
        Self { records }
    }

    pub fn record(
        &mut self,
        district: District,
        division: Division,
        plot: Option<u8>,
        position: Vec2,
    ) -> RecordOutcome {
        let Some(plot) = plot else {
            return RecordOutcome::NotOnPlot;
        };
        let Ok(plot_id) = i8::try_from(plot) else {
            return RecordOutcome::NotOnPlot;
        };

        let territory = district.territory();
        let index = match self
            .records
            .iter()
            .position(|r| r.district == territory && r.division == division.raw())
        {
            Some(index) => index,
            None => {
                self.records.push(DivisionPlots {
                    district: territory,
                    division: division.raw(),
                    plots: Vec::new(),
                });
                self.records.len() - 1
            }
        };
        let entry = &mut self.records[index];

        let corners = match entry.plots.iter().position(|p| p.plot_id == plot_id) {
            Some(i) => &mut entry.plots[i],
            None => {
                entry.plots.push(PlotCorners {
                    plot_id,
                    ..Default::default()
                });
                let last = entry.plots.len() - 1;
                &mut entry.plots[last]
            }
        };

        let corner = Corner::from(position);
        let slots = [
            &mut corners.c1,
            &mut corners.c2,
            &mut corners.c3,
            &mut corners.c4,
        ];
        for (n, slot) in slots.into_iter().enumerate() {
            if slot.is_empty() {
                *slot = corner;
                return RecordOutcome::Recorded {
                    plot,
                    corner: n as u8 + 1,
                };
            }
        }
        RecordOutcome::Complete { plot }
    }

    pub fn records(&self) -> &[DivisionPlots] {
        &self.records
    }

    /// Sorted copy of everything recorded, ready to write out.
    pub fn export(&self) -> Vec<DivisionPlots> {
        let mut records = self.records.clone();
        sort_dataset(&mut records);
        records
    }
}
