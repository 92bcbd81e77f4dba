use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::config::{LOCAL_PLAYER_PADDING, OTHER_ACTOR_PADDING};
use crate::context::HostContext;
use crate::live::{self, LiveActors, LiveHousing};
use crate::plot_locator::PlotLocator;
use crate::records::FacadeConfig;
use crate::snapshot_store::SnapshotStore;

use super::festival::run_festival_pass;
use super::pass::run_override_pass;
use super::types::{
    DivisionChanged, FacadeEngineState, FestivalOutcome, PassOutcome, ShutdownFacades,
};
use super::visibility::{actors_to_hide, sync_hidden_actors};

// =============================================================================
// Shutdown
// =============================================================================

/// Forced restore of every plot, the festival and hidden actors.
pub fn handle_shutdown(
    mut requests: EventReader<ShutdownFacades>,
    mut state: ResMut<FacadeEngineState>,
    mut snapshots: ResMut<SnapshotStore>,
    config: Res<FacadeConfig>,
    live: Option<ResMut<LiveHousing>>,
    actors: Option<ResMut<LiveActors>>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();
    if state.shut_down {
        return;
    }

    let ctx = state.context;
    if let Some(mut live) = live {
        let outcome = run_override_pass(
            live.0.as_mut(),
            &mut snapshots,
            &ctx,
            config.current_facades(&ctx),
            &[],
            true,
        );
        let festival = config.current_festival_facade(&ctx);
        let state = &mut *state;
        run_festival_pass(
            live.0.as_mut(),
            &mut state.festival_original,
            &ctx,
            festival,
            true,
        );
        info!("Facade: shutdown restore {:?}", outcome);
    }
    snapshots.clear();

    if let Some(mut actors) = actors {
        sync_hidden_actors(
            actors.0.as_mut(),
            &mut state.hidden_actors,
            &BTreeSet::new(),
        );
    }

    state.shut_down = true;
}

// =============================================================================
// Context tracking
// =============================================================================

/// Detect (world, district, ward, division) changes. A change drops every
/// snapshot. Within the same ward the layout stays loaded, so the previous
/// division's plots are written back first; a new ward is a fresh layout and
/// only gives back the old ward's festivals.
pub fn track_context(
    host: Res<HostContext>,
    mut state: ResMut<FacadeEngineState>,
    mut snapshots: ResMut<SnapshotStore>,
    mut live: Option<ResMut<LiveHousing>>,
    mut changed: EventWriter<DivisionChanged>,
) {
    if state.shut_down {
        return;
    }
    let current = host.housing();
    let previous = state.context;
    if current == previous {
        return;
    }

    let live = live.as_mut().filter(|_| previous.is_active());
    if current.same_ward(&previous) {
        if let Some(live) = live {
            let mut restored = 0;
            for plot in snapshots.plots() {
                let written = snapshots
                    .get(plot)
                    .is_some_and(|original| live::write_plot(live.0.as_mut(), plot, original));
                if written {
                    restored += 1;
                }
            }
            if restored > 0 {
                debug!("Facade: restored {} plots left behind in the ward", restored);
            }
        }
    } else {
        if let Some(original) = state.festival_original.take() {
            if let Some(live) = live {
                live::write_festivals(live.0.as_mut(), &original);
            }
        }
        state.festival_dirty = true;
    }

    snapshots.clear();
    state.context = current;
    state.context_changed = true;
    state.local_cache.invalidate();
    state.others_cache.invalidate();

    info!(
        "Facade: context {} ward {:?} division {:?} (world {})",
        current.district.label(),
        current.ward.map(|w| u16::from(w) + 1),
        current.division.map(|d| d.raw()),
        current.world
    );
    changed.send(DivisionChanged { previous, current });
}

// =============================================================================
// Occupancy
// =============================================================================

pub fn update_occupancy(
    host: Res<HostContext>,
    locator: Res<PlotLocator>,
    config: Res<FacadeConfig>,
    mut state: ResMut<FacadeEngineState>,
) {
    if state.shut_down {
        return;
    }
    let ctx = state.context;
    let (local, others) = match (ctx.is_active(), ctx.division) {
        (true, Some(division)) => {
            let state = &mut *state;
            let player: Vec<_> = host.local_player.into_iter().collect();
            let local = state.local_cache.current_occupants(
                &locator,
                ctx.district,
                division,
                &player,
                LOCAL_PLAYER_PADDING,
                host.ground_truth_plot(),
            );
            let others = state.others_cache.current_occupants(
                &locator,
                ctx.district,
                division,
                &host.actors,
                OTHER_ACTOR_PADDING,
                None,
            );
            (local, others)
        }
        _ => (Vec::new(), Vec::new()),
    };

    let mut occupants = local.clone();
    if !config.hide_players {
        occupants.extend(others);
        occupants.sort_unstable();
        occupants.dedup();
    }

    state.local_occupants = local;
    if occupants != state.occupants {
        debug!("Facade: occupied plots {:?}", occupants);
        state.occupants = occupants;
        state.occupants_changed = true;
    }
}

// =============================================================================
// Override pass
// =============================================================================

pub fn apply_facades(
    mut state: ResMut<FacadeEngineState>,
    mut snapshots: ResMut<SnapshotStore>,
    config: Res<FacadeConfig>,
    live: Option<ResMut<LiveHousing>>,
) {
    if state.shut_down {
        return;
    }
    let triggered = state.occupants_changed
        || state.was_not_loaded
        || state.context_changed
        || config.is_changed();
    if !triggered {
        return;
    }
    state.occupants_changed = false;
    state.was_not_loaded = false;
    state.context_changed = false;

    let ctx = state.context;
    let outcome = match live {
        Some(mut live) => run_override_pass(
            live.0.as_mut(),
            &mut snapshots,
            &ctx,
            config.current_facades(&ctx),
            &state.occupants,
            false,
        ),
        None => PassOutcome::Unavailable,
    };
    state.passes += 1;

    match outcome {
        PassOutcome::Applied { written, restored } => {
            if written + restored > 0 {
                debug!(
                    "Facade: pass wrote {} plots, restored {}",
                    written, restored
                );
            }
        }
        PassOutcome::NotLoaded { plot } => {
            debug!("Facade: plot {} not loaded yet, retrying", plot + 1);
            state.was_not_loaded = true;
        }
        PassOutcome::Unavailable => {
            if ctx.is_active() {
                debug!("Facade: housing layout unavailable, retrying");
                state.was_not_loaded = true;
            }
        }
    }
}

// =============================================================================
// Hide players
// =============================================================================

pub fn apply_hidden_actors(
    mut state: ResMut<FacadeEngineState>,
    config: Res<FacadeConfig>,
    actors: Option<ResMut<LiveActors>>,
) {
    if state.shut_down {
        return;
    }
    let Some(mut actors) = actors else {
        return;
    };

    let ctx = state.context;
    let wanted = if config.hide_players && ctx.is_active() {
        let facade_plots: BTreeSet<u8> = config.current_facades(&ctx).map(|f| f.plot).collect();
        actors_to_hide(
            state.others_cache.assignments(),
            &facade_plots,
            &state.local_occupants,
        )
    } else {
        BTreeSet::new()
    };

    let (hidden, shown) = sync_hidden_actors(actors.0.as_mut(), &mut state.hidden_actors, &wanted);
    if hidden + shown > 0 {
        debug!("Facade: hid {} actors, showed {}", hidden, shown);
    }
}

// =============================================================================
// Festival
// =============================================================================

pub fn apply_festival(
    mut state: ResMut<FacadeEngineState>,
    config: Res<FacadeConfig>,
    live: Option<ResMut<LiveHousing>>,
) {
    if state.shut_down {
        return;
    }
    if !state.festival_dirty && !config.is_changed() {
        return;
    }
    let Some(mut live) = live else {
        return;
    };

    let ctx = state.context;
    let festival = config.current_festival_facade(&ctx);
    let outcome = run_festival_pass(
        live.0.as_mut(),
        &mut state.festival_original,
        &ctx,
        festival,
        false,
    );
    match outcome {
        FestivalOutcome::Unavailable => {
            debug!("Facade: festival layout unavailable, retrying");
        }
        FestivalOutcome::Applied { id } => {
            info!("Facade: forced festival {}", id);
            state.festival_dirty = false;
        }
        FestivalOutcome::Restored | FestivalOutcome::Unchanged => {
            state.festival_dirty = false;
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct OverrideEnginePlugin;

impl Plugin for OverrideEnginePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FacadeEngineState>()
            .init_resource::<SnapshotStore>()
            .add_event::<DivisionChanged>()
            .add_event::<ShutdownFacades>()
            .add_systems(
                Update,
                (
                    handle_shutdown,
                    track_context,
                    update_occupancy,
                    apply_facades,
                    apply_hidden_actors,
                    apply_festival,
                )
                    .chain(),
            );
    }
}
