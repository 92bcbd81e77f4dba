use bevy::prelude::*;

use crate::housing::{District, Division, HousingContext};
use crate::live::ActorId;

/// A character's position on the map plane (X/Z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSample {
    pub id: ActorId,
    pub position: Vec2,
}

impl ActorSample {
    pub fn new(id: ActorId, x: f32, z: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, z),
        }
    }
}

/// Per-frame context reported by the host before each update.
///
/// Fields mirror what the host exposes: raw territory id, `-1` for "no ward"
/// or "no plot", `0` for "no division".
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HostContext {
    pub world: u32,
    pub territory: u16,
    pub ward: i8,
    pub division: u8,
    /// Plot the host itself reports the local player on.
    pub current_plot: i8,
    pub local_player: Option<ActorSample>,
    /// Nearby characters other than the local player.
    pub actors: Vec<ActorSample>,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            world: 0,
            territory: 0,
            ward: -1,
            division: 0,
            current_plot: -1,
            local_player: None,
            actors: Vec::new(),
        }
    }
}

impl HostContext {
    pub fn housing(&self) -> HousingContext {
        let district = District::from_territory(self.territory);
        let ward = u8::try_from(self.ward).ok();
        let division = Division::from_raw(self.division);
        HousingContext {
            world: self.world,
            district,
            ward,
            division,
        }
    }

    /// Host-reported plot, if any.
    pub fn ground_truth_plot(&self) -> Option<u8> {
        u8::try_from(self.current_plot).ok()
    }
}
