// ---------------------------------------------------------------------------
// config_codec: FacadeConfig <-> file bytes
// ---------------------------------------------------------------------------
//
// On save: sort -> bitcode encode -> lz4 compress -> prepend header
// On load: validate header -> decompress -> bitcode decode -> version check

use bitcode::{Decode, Encode};

use engine::records::FacadeConfig;

use crate::file_header::{self, FLAG_COMPRESSED};
use crate::save_error::SaveError;

/// Version of the encoded `ConfigFile` layout.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ConfigFile {
    pub version: u32,
    pub config: FacadeConfig,
}

impl ConfigFile {
    /// Wrap `config` for saving. Facade order is normalized on the copy.
    pub fn new(config: &FacadeConfig) -> Self {
        let mut config = config.clone();
        config.sort();
        Self {
            version: CURRENT_CONFIG_VERSION,
            config,
        }
    }
}

/// Encode a configuration into the on-disk format.
pub fn encode_config(config: &FacadeConfig) -> Vec<u8> {
    let encoded = bitcode::encode(&ConfigFile::new(config));
    let compressed = lz4_flex::compress_prepend_size(&encoded);
    file_header::wrap_with_header(&compressed, FLAG_COMPRESSED, encoded.len())
}

/// Decode a configuration from the on-disk format.
pub fn decode_config(bytes: &[u8]) -> Result<FacadeConfig, SaveError> {
    let (header, payload) = file_header::unwrap_header(bytes).map_err(SaveError::Header)?;

    let decompressed;
    let encoded = if header.is_compressed() {
        decompressed = lz4_flex::decompress_size_prepended(payload)?;
        decompressed.as_slice()
    } else {
        payload
    };

    let file: ConfigFile = bitcode::decode(encoded)?;
    if file.version > CURRENT_CONFIG_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: CURRENT_CONFIG_VERSION,
            found: file.version,
        });
    }
    Ok(file.config)
}
