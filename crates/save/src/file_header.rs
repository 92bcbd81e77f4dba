// ---------------------------------------------------------------------------
// file_header – Config file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "FCDE"
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = lz4 compressed)
//   [12..20] Timestamp (Unix epoch, u64)
//   [20..24] Uncompressed data size (u32)
//   [24..28] xxHash32 checksum of the payload (everything after the header)
//
// On save: encode -> compress -> prepend header (checksum of stored payload)
// On load: check magic -> validate checksum -> strip header -> decompress

use xxhash_rust::xxh32::xxh32;

/// Magic bytes identifying a facade config file.
pub const MAGIC: [u8; 4] = *b"FCDE";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Current header layout version.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Payload is lz4 block-compressed with the size prepended.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    /// Header for `payload` as it will be stored.
    pub fn new(payload: &[u8], flags: u32, uncompressed_size: usize) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: HEADER_FORMAT_VERSION,
            flags,
            timestamp,
            uncompressed_size: uncompressed_size as u32,
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }
}

/// Returns bytes: [header (28 bytes)] ++ [payload].
pub fn wrap_with_header(payload: &[u8], flags: u32, uncompressed_size: usize) -> Vec<u8> {
    let header = FileHeader::new(payload, flags, uncompressed_size);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());

    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header.format_version.to_le_bytes());
    out.extend_from_slice(&header.flags.to_le_bytes());
    out.extend_from_slice(&header.timestamp.to_le_bytes());
    out.extend_from_slice(&header.uncompressed_size.to_le_bytes());
    out.extend_from_slice(&header.checksum.to_le_bytes());

    out.extend_from_slice(payload);
    out
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse and validate the header, returning it with the payload.
///
/// # Errors
///
/// Returns an error if:
/// - The magic bytes are missing
/// - The file is shorter than the header
/// - The header format version is from a newer build
/// - The checksum does not match
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), String> {
    if bytes.len() < MAGIC.len() || bytes[..4] != MAGIC {
        return Err("missing FCDE magic bytes".to_string());
    }
    if bytes.len() < HEADER_SIZE {
        return Err(format!(
            "file is too short ({} bytes, need at least {} for header)",
            bytes.len(),
            HEADER_SIZE
        ));
    }

    let format_version = le_u32(bytes, 4);
    let flags = le_u32(bytes, 8);
    let mut timestamp = [0u8; 8];
    timestamp.copy_from_slice(&bytes[12..20]);
    let timestamp = u64::from_le_bytes(timestamp);
    let uncompressed_size = le_u32(bytes, 20);
    let checksum = le_u32(bytes, 24);

    if format_version > HEADER_FORMAT_VERSION {
        return Err(format!(
            "header format version {}, but this build only supports up to version {}",
            format_version, HEADER_FORMAT_VERSION,
        ));
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != checksum {
        return Err(format!(
            "checksum mismatch (expected {:#010X}, got {:#010X})",
            checksum, computed,
        ));
    }

    Ok((
        FileHeader {
            format_version,
            flags,
            timestamp,
            uncompressed_size,
            checksum,
        },
        payload,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_unwrap() {
        let data = b"facade config payload";
        let wrapped = wrap_with_header(data, FLAG_COMPRESSED, 99);

        assert_eq!(&wrapped[..4], b"FCDE");
        assert_eq!(wrapped.len(), HEADER_SIZE + data.len());

        let (header, payload) = unwrap_header(&wrapped).expect("unwrap should succeed");
        assert_eq!(header.format_version, HEADER_FORMAT_VERSION);
        assert!(header.is_compressed());
        assert_eq!(header.uncompressed_size, 99);
        assert_eq!(payload, data);
    }

    #[test]
    fn test_missing_magic_rejected() {
        let err = unwrap_header(b"MEGA\x00\x01\x02\x03 other file").unwrap_err();
        assert!(err.contains("magic"), "got: {err}");
        assert!(unwrap_header(b"").is_err());
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let mut wrapped = wrap_with_header(b"test payload", 0, 12);
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;

        let err = unwrap_header(&wrapped).unwrap_err();
        assert!(err.contains("checksum mismatch"), "got: {err}");
    }

    #[test]
    fn test_future_header_version_rejected() {
        let mut wrapped = wrap_with_header(b"test payload", 0, 12);
        wrapped[4..8].copy_from_slice(&999u32.to_le_bytes());

        let err = unwrap_header(&wrapped).unwrap_err();
        assert!(err.contains("header format version 999"), "got: {err}");
    }

    #[test]
    fn test_truncated_header_detected() {
        let err = unwrap_header(b"FCDE\x01\x00").unwrap_err();
        assert!(err.contains("too short"), "got: {err}");
    }

    #[test]
    fn test_empty_payload() {
        let wrapped = wrap_with_header(b"", 0, 0);
        assert_eq!(wrapped.len(), HEADER_SIZE);
        let (header, payload) = unwrap_header(&wrapped).unwrap();
        assert!(!header.is_compressed());
        assert!(payload.is_empty());
    }
}
