use std::path::{Path, PathBuf};

use bevy::prelude::*;

use engine::records::FacadeConfig;

use crate::atomic_write::atomic_write;
use crate::config_codec::{decode_config, encode_config};
use crate::save_error::SaveError;

// ---------------------------------------------------------------------------
// File operations
// ---------------------------------------------------------------------------

/// Write `config` to `path` atomically.
pub fn save_config(path: &Path, config: &FacadeConfig) -> Result<(), SaveError> {
    let bytes = encode_config(config);
    atomic_write(path, &bytes)?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<FacadeConfig, SaveError> {
    let bytes = std::fs::read(path)?;
    decode_config(&bytes)
}

/// Load `path`, falling back to an empty configuration when the file is
/// missing or unreadable.
pub fn load_or_default(path: &Path) -> FacadeConfig {
    match load_config(path) {
        Ok(config) => {
            info!(
                "Loaded {} facades and {} presets from {}",
                config.facades.len(),
                config.presets.len(),
                path.display()
            );
            config
        }
        Err(SaveError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No config at {}, starting empty", path.display());
            FacadeConfig::default()
        }
        Err(e) => {
            warn!("Ignoring config at {}: {e}", path.display());
            FacadeConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Resources and events
// ---------------------------------------------------------------------------

/// Where the configuration is persisted.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath(pub PathBuf);

/// Request an immediate save.
#[derive(Event)]
pub struct SaveConfigEvent;

/// Outcome of the saves performed so far.
#[derive(Resource, Debug, Default)]
pub struct ConfigSaveStatus {
    pub saves: u32,
    pub last_error: Option<String>,
}

#[derive(Resource, Debug, Clone, Copy)]
struct AutosaveOnChange(bool);

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Loads `FacadeConfig` from disk at build time and writes it back on
/// `SaveConfigEvent` or, with autosave, whenever it changes.
///
/// Add before `FacadePlugin` so the loaded configuration is the one the
/// engine sees.
pub struct ConfigStorePlugin {
    pub path: PathBuf,
    pub autosave: bool,
}

impl ConfigStorePlugin {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            autosave: true,
        }
    }

    pub fn without_autosave(mut self) -> Self {
        self.autosave = false;
        self
    }
}

impl Plugin for ConfigStorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(load_or_default(&self.path))
            .insert_resource(ConfigPath(self.path.clone()))
            .insert_resource(AutosaveOnChange(self.autosave))
            .init_resource::<ConfigSaveStatus>()
            .add_event::<SaveConfigEvent>()
            .add_systems(Update, persist_config);
    }
}

fn persist_config(
    mut events: EventReader<SaveConfigEvent>,
    config: Res<FacadeConfig>,
    path: Res<ConfigPath>,
    autosave: Res<AutosaveOnChange>,
    mut status: ResMut<ConfigSaveStatus>,
) {
    let requested = events.read().count() > 0;
    let changed = autosave.0 && config.is_changed() && !config.is_added();
    if !requested && !changed {
        return;
    }

    match save_config(&path.0, &config) {
        Ok(()) => {
            status.saves += 1;
            status.last_error = None;
            info!(
                "Saved {} facades to {}",
                config.facades.len(),
                path.0.display()
            );
        }
        Err(e) => {
            error!("Failed to save config to {}: {e}", path.0.display());
            status.last_error = Some(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::housing::District;
    use engine::records::Facade;
    use engine::slot_codec::ALL_ABSENT;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("facade_config_store_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn roof_facade(plot: u8) -> Facade {
        let mut exterior = ALL_ABSENT;
        exterior[0] = Some(300 + u16::from(plot));
        Facade::new(73, District::Mist, 2, plot, exterior, ALL_ABSENT)
    }

    #[test]
    fn test_save_then_load() {
        let dir = test_dir("save_then_load");
        let path = dir.join("config.bin");

        let mut config = FacadeConfig::default();
        config.upsert_facade(roof_facade(5));
        config.upsert_facade(roof_facade(1));
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.facades.len(), 2);
        assert_eq!(loaded.facades[0].plot, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = test_dir("missing");
        let config = load_or_default(&dir.join("nope.bin"));
        assert_eq!(config, FacadeConfig::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_or_default_corrupt_file() {
        let dir = test_dir("corrupt");
        let path = dir.join("config.bin");
        std::fs::write(&path, b"not a config file at all").unwrap();

        assert!(matches!(load_config(&path), Err(SaveError::Header(_))));
        assert_eq!(load_or_default(&path), FacadeConfig::default());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_plugin_loads_existing_config() {
        let dir = test_dir("plugin_loads");
        let path = dir.join("config.bin");
        let mut config = FacadeConfig::default();
        config.hide_players = true;
        save_config(&path, &config).unwrap();

        let mut app = App::new();
        app.add_plugins(ConfigStorePlugin::new(&path));
        assert!(app.world().resource::<FacadeConfig>().hide_players);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_plugin_autosaves_on_change_only() {
        let dir = test_dir("autosave");
        let path = dir.join("config.bin");

        let mut app = App::new();
        app.add_plugins(ConfigStorePlugin::new(&path));
        app.update();
        assert!(!path.exists(), "loading must not trigger a save");

        app.world_mut()
            .resource_mut::<FacadeConfig>()
            .upsert_facade(roof_facade(3));
        app.update();
        assert_eq!(app.world().resource::<ConfigSaveStatus>().saves, 1);
        assert_eq!(load_config(&path).unwrap().facades.len(), 1);

        app.update();
        assert_eq!(app.world().resource::<ConfigSaveStatus>().saves, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_plugin_saves_on_request() {
        let dir = test_dir("on_request");
        let path = dir.join("config.bin");

        let mut app = App::new();
        app.add_plugins(ConfigStorePlugin::new(&path).without_autosave());
        app.update();

        app.world_mut()
            .resource_mut::<FacadeConfig>()
            .upsert_facade(roof_facade(0));
        app.update();
        assert!(!path.exists());

        app.world_mut().send_event(SaveConfigEvent);
        app.update();
        assert!(path.exists());
        let status = app.world().resource::<ConfigSaveStatus>();
        assert_eq!(status.saves, 1);
        assert!(status.last_error.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_plugin_reports_save_failure() {
        let dir = test_dir("failure");
        // A directory where the file should be makes the rename fail.
        let path = dir.join("config.bin");
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        let mut app = App::new();
        app.add_plugins(ConfigStorePlugin::new(&path).without_autosave());
        app.world_mut().send_event(SaveConfigEvent);
        app.update();

        let status = app.world().resource::<ConfigSaveStatus>();
        assert_eq!(status.saves, 0);
        assert!(status.last_error.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
