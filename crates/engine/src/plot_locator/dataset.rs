//! On-disk plot geometry dataset.
//!
//! ```json
//! [{ "District": 339, "Division": 1,
//!    "Plots": [{ "PlotId": 0, "C1": {"X": 1.0, "Y": 2.0}, "C2": ..., "C3": ..., "C4": ... }] }]
//! ```
//!
//! `Y` holds the map-plane Z coordinate. Several entries may share a
//! (district, division); their plots are merged.

use std::fmt;
use std::path::Path;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// One corner point as stored in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Corner {
    pub x: f32,
    pub y: f32,
}

impl Corner {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Corners are recorded one at a time; an unset corner has `X == 0`.
    pub fn is_empty(&self) -> bool {
        self.x == 0.0
    }
}

impl From<Corner> for Vec2 {
    fn from(c: Corner) -> Self {
        Vec2::new(c.x, c.y)
    }
}

impl From<Vec2> for Corner {
    fn from(v: Vec2) -> Self {
        Corner::new(v.x, v.y)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlotCorners {
    pub plot_id: i8,
    pub c1: Corner,
    pub c2: Corner,
    pub c3: Corner,
    pub c4: Corner,
}

impl PlotCorners {
    pub fn corners(&self) -> [Corner; 4] {
        [self.c1, self.c2, self.c3, self.c4]
    }

    pub fn has_empty_corner(&self) -> bool {
        self.corners().iter().any(Corner::is_empty)
    }
}

/// All plots of one (district, division).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DivisionPlots {
    /// Territory id of the district.
    pub district: u16,
    pub division: u8,
    pub plots: Vec<PlotCorners>,
}

// =============================================================================
// Errors
// =============================================================================

/// The geometry dataset could not be loaded. The engine cannot run without it.
#[derive(Debug)]
pub enum PlotDataError {
    /// The file is missing or unreadable.
    Io(std::io::Error),
    /// The file is not valid dataset JSON.
    Parse(serde_json::Error),
    /// The file parsed but contains no usable plot.
    Empty,
}

impl fmt::Display for PlotDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotDataError::Io(e) => write!(f, "Failed to read plot dataset: {e}"),
            PlotDataError::Parse(e) => write!(f, "Failed to parse plot dataset: {e}"),
            PlotDataError::Empty => write!(f, "Plot dataset contains no housing plots"),
        }
    }
}

impl std::error::Error for PlotDataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlotDataError::Io(e) => Some(e),
            PlotDataError::Parse(e) => Some(e),
            PlotDataError::Empty => None,
        }
    }
}

impl From<std::io::Error> for PlotDataError {
    fn from(e: std::io::Error) -> Self {
        PlotDataError::Io(e)
    }
}

impl From<serde_json::Error> for PlotDataError {
    fn from(e: serde_json::Error) -> Self {
        PlotDataError::Parse(e)
    }
}

// =============================================================================
// Reading and writing
// =============================================================================

pub fn parse_dataset(json: &str) -> Result<Vec<DivisionPlots>, PlotDataError> {
    Ok(serde_json::from_str(json)?)
}

pub fn read_dataset(path: impl AsRef<Path>) -> Result<Vec<DivisionPlots>, PlotDataError> {
    let json = std::fs::read_to_string(path)?;
    parse_dataset(&json)
}

pub fn write_dataset(
    path: impl AsRef<Path>,
    records: &[DivisionPlots],
) -> Result<(), PlotDataError> {
    let json = serde_json::to_string(records)?;
    std::fs::write(path, json)?;
    Ok(())
}
