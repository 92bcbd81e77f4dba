//! Persistence for the facade configuration.
//!
//! The file is a bitcode-encoded `ConfigFile`, lz4-compressed and prefixed
//! with a checksummed header. Writes go through a temp file and a rename.

mod atomic_write;
pub mod config_codec;
mod config_store;
pub mod file_header;
mod save_error;

pub use config_codec::{decode_config, encode_config, CURRENT_CONFIG_VERSION};
pub use config_store::{
    load_config, load_or_default, save_config, ConfigPath, ConfigSaveStatus, ConfigStorePlugin,
    SaveConfigEvent,
};
pub use save_error::SaveError;
