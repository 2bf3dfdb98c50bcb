use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use log::{debug, error, trace, warn};
use serde_json::{Map, Value};

use super::error::HeaderError;
use super::{MAX_HEADER_LEN, METADATA_KEY, MetadataRecord};

/// Reader for the JSON header at the start of a safetensors file
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderReader;

impl HeaderReader {
    /// Create a new header reader
    pub fn new() -> Self {
        Self
    }

    /// Read the `__metadata__` object of a file, reporting why it failed
    pub fn read_header(&self, file: impl AsRef<Path>) -> Result<MetadataRecord, HeaderError> {
        let file = file.as_ref();
        debug!("Reading header: {}", file.display());

        let handle = File::open(file)?;
        parse_header(BufReader::new(handle))
    }

    /// Read the `__metadata__` object of a file, or an empty map if the header is unusable.
    ///
    /// Failures are logged with the file name and never returned.
    pub fn read_metadata(&self, file: impl AsRef<Path>) -> MetadataRecord {
        let file = file.as_ref();
        self.read_header(file).unwrap_or_else(|e| {
            error!("Error reading file {}: {}", file.display(), e);
            Map::new()
        })
    }
}

/// Parse `[u64 LE length][length bytes of JSON]` from the start of `reader`.
///
/// Only the prefix and the header bytes are consumed; the tensor payload
/// that follows is never read.
pub fn parse_header<R: Read>(mut reader: R) -> Result<MetadataRecord, HeaderError> {
    let mut prefix = [0u8; 8];
    reader.read_exact(&mut prefix).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HeaderError::ShortPrefix,
        _ => HeaderError::Io(e),
    })?;

    let declared = u64::from_le_bytes(prefix);
    trace!("Declared header size: {} bytes", declared);

    if declared == 0 {
        return Err(HeaderError::ZeroLength);
    }
    if declared > MAX_HEADER_LEN {
        return Err(HeaderError::TooLarge(declared));
    }

    // `take` bounds the read, so a lying prefix cannot force a huge allocation
    let mut buf = Vec::with_capacity(declared.min(64 * 1024) as usize);
    reader.by_ref().take(declared).read_to_end(&mut buf)?;
    if (buf.len() as u64) < declared {
        return Err(HeaderError::Truncated {
            declared,
            available: buf.len() as u64,
        });
    }

    match serde_json::from_slice::<Value>(&buf)? {
        Value::Object(mut header) => match header.remove(METADATA_KEY) {
            Some(Value::Object(metadata)) => Ok(metadata),
            Some(other) => {
                warn!("'{}' is not an object: {}", METADATA_KEY, other);
                Ok(Map::new())
            }
            None => {
                trace!("Header has no '{}' entry", METADATA_KEY);
                Ok(Map::new())
            }
        },
        _ => Err(HeaderError::NotAnObject),
    }
}
