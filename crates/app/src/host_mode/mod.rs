//! Headless `host` mode: a blocking synchronous loop that reads JSON
//! commands from stdin and writes JSON responses to stdout.
//!
//! The loop plays the part of the game client. It owns an in-memory housing
//! layout and actor table, reports the housing context into
//! [`HostContext`], and ticks the engine on request.
//!
//! ## Protocol
//!
//! Each line of stdin is a JSON object with a `"cmd"` discriminator.
//! Each line of stdout is a JSON response with `"protocol_version"` and
//! `"type"` fields. See [`engine::host_protocol`] for the full schema.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;

use engine::config::PLOTS_PER_WARD;
use engine::context::HostContext;
use engine::host_protocol::{
    make_response, ContextReport, HostCommand, HostResponse, Location, PlotReport, PresetReport,
    ResponsePayload, StatusReport, PROTOCOL_VERSION,
};
use engine::housing::District;
use engine::live::{LiveActors, LiveHousing, MemoryActors, MemoryHousing, PlotExterior};
use engine::override_engine::{DivisionChanged, FacadeEngineState, ShutdownFacades};
use engine::plot_locator::{
    read_dataset, write_dataset, CornerRecorder, PlotLocator, RecordOutcome,
};
use engine::records::{FacadeConfig, Preset};
use engine::slot_codec::{ExteriorSlot, SlotValues};
use engine::snapshot_store::SnapshotStore;
use engine::FacadePlugin;

/// Cap on `tick` so a typo cannot hang the session.
const MAX_TICKS_PER_COMMAND: u32 = 10_000;

/// Everything the host keeps outside the ECS world.
struct HostSession {
    housing: MemoryHousing,
    actors: MemoryActors,
    recorder: CornerRecorder,
    config_path: Option<PathBuf>,
    division_events: EventCursor<DivisionChanged>,
}

pub fn run(args: &[String]) -> ExitCode {
    let Some(dataset) = args.first() else {
        eprintln!("usage: facade host <plots.json> [config.bin]");
        return ExitCode::from(2);
    };

    // The engine cannot run without plot geometry.
    let loaded = read_dataset(dataset)
        .and_then(|records| Ok((PlotLocator::from_dataset(records.clone())?, records)));
    let (locator, records) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("failed to load plot dataset {dataset}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let plot_count = locator.plot_count();

    // Corner recording continues from the loaded dataset.
    let recorder = CornerRecorder::with_records(records);
    let (mut app, mut session) = build_app(locator, recorder, args.get(1).map(PathBuf::from));

    // -- I/O setup -----------------------------------------------------------
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    let facades = app.world().resource::<FacadeConfig>().facades.len();
    send(
        &mut stdout,
        &make_response(ResponsePayload::Ready {
            plots: plot_count,
            facades,
        }),
    );

    // Log to stderr so it does not interfere with the JSON protocol on stdout.
    eprintln!("facade host v{PROTOCOL_VERSION} ready, {plot_count} plots, {facades} facades");

    // -- Main command loop ---------------------------------------------------
    let mut said_goodbye = false;
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("stdin read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let cmd: HostCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                send(&mut stdout, &error(format!("Parse error: {e}")));
                continue;
            }
        };

        let response = process_command(cmd, &mut app, &mut session);
        said_goodbye = matches!(response.payload, ResponsePayload::Goodbye { .. });
        send(&mut stdout, &response);

        if said_goodbye {
            break;
        }
    }

    if !said_goodbye {
        let restored = shutdown(&mut app, &session);
        eprintln!("stdin closed, restored {} plots", restored.len());
    }

    eprintln!("facade host shutting down");
    ExitCode::SUCCESS
}

fn send(stdout: &mut impl Write, response: &HostResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let _ = writeln!(stdout, "{json}");
            let _ = stdout.flush();
        }
        Err(e) => eprintln!("failed to serialize response: {e}"),
    }
}

fn error(message: impl Into<String>) -> HostResponse {
    make_response(ResponsePayload::Error {
        message: message.into(),
    })
}

fn build_app(
    locator: PlotLocator,
    recorder: CornerRecorder,
    config_path: Option<PathBuf>,
) -> (App, HostSession) {
    let housing = MemoryHousing::new();
    let actors = MemoryActors::new();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);

    // Loads the configuration first so the engine sees it.
    if let Some(path) = &config_path {
        app.add_plugins(save::ConfigStorePlugin::new(path));
    }
    app.add_plugins(FacadePlugin::new(locator));
    app.insert_resource(LiveHousing::new(housing.clone()));
    app.insert_resource(LiveActors::new(actors.clone()));

    let session = HostSession {
        housing,
        actors,
        recorder,
        config_path,
        division_events: EventCursor::default(),
    };
    (app, session)
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

fn process_command(cmd: HostCommand, app: &mut App, session: &mut HostSession) -> HostResponse {
    match cmd {
        HostCommand::SetContext {
            world,
            territory,
            ward,
            division,
            current_plot,
        } => {
            let mut host = app.world_mut().resource_mut::<HostContext>();
            // Entering another ward loads a fresh layout from the server.
            if (host.world, host.territory, host.ward) != (world, territory, ward) {
                session.housing.reload();
            }
            host.world = world;
            host.territory = territory;
            host.ward = ward;
            host.division = division;
            host.current_plot = current_plot;
            make_response(ResponsePayload::Ok)
        }

        HostCommand::SetPlayer { player } => {
            app.world_mut().resource_mut::<HostContext>().local_player = player.map(Into::into);
            make_response(ResponsePayload::Ok)
        }

        HostCommand::SetActors { actors } => {
            session.actors.set_present(actors.iter().map(|a| a.id));
            app.world_mut().resource_mut::<HostContext>().actors =
                actors.into_iter().map(Into::into).collect();
            make_response(ResponsePayload::Ok)
        }

        HostCommand::SeedPlot {
            plot,
            size,
            exterior_ids,
            stain_ids,
        } => {
            if usize::from(plot) >= PLOTS_PER_WARD {
                return error(format!("plot {plot} is outside the ward"));
            }
            session.housing.set_plot(
                plot,
                PlotExterior {
                    size,
                    exterior_ids,
                    stain_ids,
                },
            );
            make_response(ResponsePayload::Ok)
        }

        HostCommand::SetFestivals { festivals } => {
            session.housing.set_festivals(festivals);
            make_response(ResponsePayload::Ok)
        }

        HostCommand::SetAvailable { available } => {
            session.housing.set_available(available);
            make_response(ResponsePayload::Ok)
        }

        HostCommand::AddFacade {
            location,
            exterior,
            stains,
            unified,
        } => {
            let checked = check_location(&location).and_then(|()| check_lanes(&exterior, &stains));
            if let Err(message) = checked {
                return error(message);
            }
            app.world_mut()
                .resource_mut::<FacadeConfig>()
                .upsert_facade(location.facade(exterior, stains, unified));
            make_response(ResponsePayload::Ok)
        }

        HostCommand::RemoveFacade { location } => {
            let removed = app.world_mut().resource_mut::<FacadeConfig>().remove_facade(
                location.world,
                location.district(),
                location.ward,
                location.plot,
            );
            match removed {
                Some(_) => make_response(ResponsePayload::Ok),
                None => error("no facade at that location"),
            }
        }

        HostCommand::AddFestivalFacade { location, id } => {
            if let Err(message) = check_location(&location) {
                return error(message);
            }
            app.world_mut()
                .resource_mut::<FacadeConfig>()
                .upsert_festival_facade(location.festival_facade(id));
            make_response(ResponsePayload::Ok)
        }

        HostCommand::RemoveFestivalFacade { location } => {
            let removed = app
                .world_mut()
                .resource_mut::<FacadeConfig>()
                .remove_festival_facade(location.world, location.district(), location.ward);
            match removed {
                Some(_) => make_response(ResponsePayload::Ok),
                None => error("no festival facade for that ward"),
            }
        }

        HostCommand::SavePreset { name, plot } => {
            let ctx = app.world().resource::<HostContext>().housing();
            if !ctx.owns_plot(plot) {
                return error(format!("plot {plot} is not in the current division"));
            }
            let Some(data) = session.housing.plot(plot).filter(PlotExterior::is_loaded) else {
                return error(format!("plot {plot} is not loaded"));
            };
            let preset = Preset::from_exterior(name, &data);
            let report = PresetReport::from(&preset);
            app.world_mut()
                .resource_mut::<FacadeConfig>()
                .add_preset(preset);
            make_response(ResponsePayload::Preset { preset: report })
        }

        HostCommand::ApplyPreset { name, location } => {
            if let Err(message) = check_location(&location) {
                return error(message);
            }
            let world = app.world();
            let ctx = world.resource::<HostContext>().housing();
            let Some(preset) = world
                .resource::<FacadeConfig>()
                .presets
                .iter()
                .find(|p| p.name == name)
                .cloned()
            else {
                return error(format!("no preset named {name:?}"));
            };

            // Plot sizes are only known for the current division.
            let here = ctx.world == location.world
                && ctx.district == location.district()
                && ctx.ward == Some(location.ward)
                && ctx.owns_plot(location.plot);
            if let Some(live) = session.housing.plot(location.plot).filter(|_| here) {
                if live.size != preset.plot_size {
                    return error(format!(
                        "preset {name:?} is for {} plots, plot {} is {}",
                        preset.plot_size.label(),
                        location.plot,
                        live.size.label()
                    ));
                }
            }

            app.world_mut()
                .resource_mut::<FacadeConfig>()
                .upsert_facade(preset.to_facade(
                    location.world,
                    location.district(),
                    location.ward,
                    location.plot,
                ));
            make_response(ResponsePayload::Ok)
        }

        HostCommand::SetHidePlayers { enabled } => {
            app.world_mut().resource_mut::<FacadeConfig>().hide_players = enabled;
            make_response(ResponsePayload::Ok)
        }

        HostCommand::Tick { ticks } => {
            let n = ticks.min(MAX_TICKS_PER_COMMAND);
            let mut division_changes = Vec::new();
            for _ in 0..n {
                app.update();
                // The client picks up pending layout writes on its next frame.
                session.housing.clear_update_pending();
                let events = app.world().resource::<Events<DivisionChanged>>();
                division_changes.extend(
                    session
                        .division_events
                        .read(events)
                        .map(|e| ContextReport::from(e.current)),
                );
            }
            make_response(ResponsePayload::Ticked {
                ticks: n,
                division_changes,
            })
        }

        HostCommand::Status => make_response(ResponsePayload::Status {
            status: status_report(app, session),
        }),

        HostCommand::InspectPlot { plot } => match session.housing.plot(plot) {
            Some(data) => {
                let overridden = app.world().resource::<SnapshotStore>().contains(plot);
                make_response(ResponsePayload::Plot {
                    plot: PlotReport::new(plot, &data, overridden),
                })
            }
            None => error(format!("plot {plot} is outside the ward")),
        },

        HostCommand::RecordCorner => {
            let host = app.world().resource::<HostContext>();
            let ctx = host.housing();
            let Some(division) = ctx.division.filter(|_| ctx.district.is_valid()) else {
                return error("not in a housing division");
            };
            let Some(player) = host.local_player else {
                return error("no local player position");
            };
            let plot = host.ground_truth_plot();
            match session
                .recorder
                .record(ctx.district, division, plot, player.position)
            {
                RecordOutcome::Recorded { plot, corner } => {
                    make_response(ResponsePayload::CornerRecorded { plot, corner })
                }
                RecordOutcome::Complete { plot } => {
                    make_response(ResponsePayload::PlotComplete { plot })
                }
                RecordOutcome::NotOnPlot => error("the client reports no plot under the player"),
            }
        }

        HostCommand::ExportCorners { path } => {
            match write_dataset(&path, &session.recorder.export()) {
                Ok(()) => make_response(ResponsePayload::Ok),
                Err(e) => error(format!("failed to export corners to {path}: {e}")),
            }
        }

        HostCommand::SaveConfig => {
            let Some(path) = session.config_path.as_deref() else {
                return error("no config file was given on the command line");
            };
            let config = app.world().resource::<FacadeConfig>();
            match save::save_config(path, config) {
                Ok(()) => make_response(ResponsePayload::Ok),
                Err(e) => error(format!("failed to save config: {e}")),
            }
        }

        HostCommand::Quit => make_response(ResponsePayload::Goodbye {
            restored: shutdown(app, session),
        }),
    }
}

fn check_location(location: &Location) -> Result<(), String> {
    if location.district() == District::Invalid {
        return Err(format!(
            "territory {} is not a housing district",
            location.territory
        ));
    }
    if usize::from(location.plot) >= PLOTS_PER_WARD {
        return Err(format!("plot {} is outside the ward", location.plot));
    }
    Ok(())
}

/// Exterior ids are stored as `i16` and stains as bytes in the layout.
fn check_lanes(exterior: &SlotValues, stains: &SlotValues) -> Result<(), String> {
    for (slot, id) in ExteriorSlot::ALL.iter().zip(exterior) {
        if let Some(id) = id.filter(|&id| i16::try_from(id).is_err()) {
            return Err(format!("exterior id {id} for {} is out of range", slot.label()));
        }
    }
    for (slot, id) in ExteriorSlot::ALL.iter().zip(stains) {
        if let Some(id) = id.filter(|&id| u8::try_from(id).is_err()) {
            return Err(format!("stain id {id} for {} is out of range", slot.label()));
        }
    }
    Ok(())
}

fn status_report(app: &App, session: &HostSession) -> StatusReport {
    let world = app.world();
    let state = world.resource::<FacadeEngineState>();
    let config = world.resource::<FacadeConfig>();
    let ctx = state.context();

    StatusReport {
        context: ContextReport::from(ctx),
        occupants: state.occupants().to_vec(),
        awaiting_load: state.awaiting_load(),
        overridden_plots: world.resource::<SnapshotStore>().plots(),
        hidden_actors: session.actors.hidden(),
        festivals: session.housing.festivals(),
        facades_here: config.current_facades(&ctx).count(),
        facades_elsewhere: config.other_division_count(&ctx),
        passes: state.passes(),
    }
}

/// Restore every overridden plot, the festival and hidden actors. Returns
/// the restored plots as they now read.
fn shutdown(app: &mut App, session: &HostSession) -> Vec<PlotReport> {
    let overridden = app.world().resource::<SnapshotStore>().plots();
    app.world_mut().send_event(ShutdownFacades);
    app.update();
    session.housing.clear_update_pending();

    overridden
        .into_iter()
        .filter_map(|plot| {
            session
                .housing
                .plot(plot)
                .map(|data| PlotReport::new(plot, &data, false))
        })
        .collect()
}
