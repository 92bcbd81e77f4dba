use std::fmt;

use crate::housing::{District, Division};

use super::DivisionPlots;

/// A gap in the geometry dataset. Plot numbers are shown 1-based, the way
/// players see them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetIssue {
    MissingDivision {
        district: District,
        division: Division,
    },
    MissingPlot {
        district: District,
        division: Division,
        plot: u8,
    },
    EmptyCorner {
        district: District,
        division: Division,
        plot: u8,
    },
}

impl fmt::Display for DatasetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetIssue::MissingDivision { district, division } => write!(
                f,
                "Failed to find entry for District {} Division {}",
                district.territory(),
                division.raw()
            ),
            DatasetIssue::MissingPlot {
                district,
                division,
                plot,
            } => write!(
                f,
                "Failed to find entry for District {} Division {} Plot {}",
                district.territory(),
                division.raw(),
                u16::from(*plot) + 1
            ),
            DatasetIssue::EmptyCorner {
                district,
                division,
                plot,
            } => write!(
                f,
                "Found plot entry with empty corner for District {} Division {} Plot {}",
                district.territory(),
                division.raw(),
                u16::from(*plot) + 1
            ),
        }
    }
}

/// Check that every district and division has all of its plots, each with
/// four recorded corners.
pub fn validate_dataset(records: &[DivisionPlots]) -> Vec<DatasetIssue> {
    let mut issues = Vec::new();
    for district in District::ALL {
        for division in Division::ALL {
            let Some(entry) = records
                .iter()
                .find(|r| r.district == district.territory() && r.division == division.raw())
            else {
                issues.push(DatasetIssue::MissingDivision { district, division });
                continue;
            };

            for plot in division.plot_range() {
                let Some(corners) = entry
                    .plots
                    .iter()
                    .find(|p| i16::from(p.plot_id) == i16::from(plot))
                else {
                    issues.push(DatasetIssue::MissingPlot {
                        district,
                        division,
                        plot,
                    });
                    continue;
                };
                if corners.has_empty_corner() {
                    issues.push(DatasetIssue::EmptyCorner {
                        district,
                        division,
                        plot,
                    });
                }
            }
        }
    }
    issues
}

/// Order entries by (district, division) and each entry's plots by id.
pub fn sort_dataset(records: &mut [DivisionPlots]) {
    records.sort_by_key(|r| (r.district, r.division));
    for record in records.iter_mut() {
        record.plots.sort_by_key(|p| p.plot_id);
    }
}
