use bevy::prelude::*;

pub mod config;
pub mod context;
pub mod host_protocol;
pub mod housing;
pub mod live;
pub mod override_engine;
pub mod plot_geometry;
pub mod plot_locator;
pub mod records;
pub mod slot_codec;
pub mod snapshot_store;

use context::HostContext;
use override_engine::OverrideEnginePlugin;
use plot_locator::PlotLocator;
use records::FacadeConfig;

/// The facade engine.
///
/// Takes the plot geometry up front: the engine cannot run without it, so a
/// dataset that fails to load must stop the host before the plugin exists.
/// The host inserts [`live::LiveHousing`] and [`live::LiveActors`] once it
/// has them and updates [`HostContext`] before every `App::update`.
pub struct FacadePlugin {
    locator: PlotLocator,
}

impl FacadePlugin {
    pub fn new(locator: PlotLocator) -> Self {
        Self { locator }
    }
}

impl Plugin for FacadePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.locator.clone())
            .init_resource::<HostContext>()
            .init_resource::<FacadeConfig>()
            .add_plugins(OverrideEnginePlugin);
    }
}
