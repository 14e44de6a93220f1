//! Cheap fingerprints of a data source, used as half of a cache key.
//!
//! A file is identified by its canonical path, modification time and size,
//! all taken from one `stat`, so rewriting the file yields a new identity
//! without its contents ever being read. Text held in memory is identified
//! by a truncated blake3 digest plus its length; two different texts that
//! share both would collide, which is accepted. A row stream is identified
//! by its ticket only and is never cached.

use std::fmt;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use crate::error::Result;
use crate::source::DataSource;

// hex characters kept from the content digest (64 bits)
const CONTENT_DIGEST_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataIdentity {
    File {
        path: PathBuf,
        modified_nanos: u128,
        len: u64,
    },
    Content {
        digest: String,
        len: usize,
    },
    Stream {
        ticket: u64,
    },
}

impl DataIdentity {
    pub fn resolve(source: &DataSource) -> Result<Self> {
        Ok(match source {
            DataSource::File(path) => {
                let path = std::fs::canonicalize(path)?;
                let metadata = std::fs::metadata(&path)?;
                // a filesystem without mtimes still gets a stable (if coarser) identity
                let modified_nanos = metadata
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map_or(0, |d| d.as_nanos());
                DataIdentity::File {
                    path,
                    modified_nanos,
                    len: metadata.len(),
                }
            }
            DataSource::Text(text) => DataIdentity::Content {
                digest: content_digest(text.as_bytes()),
                len: text.len(),
            },
            DataSource::Stream(stream) => DataIdentity::Stream {
                ticket: stream.ticket(),
            },
        })
    }
    /// Only file and content identities survive beyond the call that made them.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, DataIdentity::Stream { .. })
    }
}

fn content_digest(bytes: &[u8]) -> String {
    let mut hex = blake3::hash(bytes).to_hex().to_string();
    hex.truncate(CONTENT_DIGEST_LEN);
    hex
}

impl fmt::Display for DataIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataIdentity::File { path, modified_nanos, len } => {
                write!(f, "file:{}@{}+{}", path.display(), modified_nanos, len)
            }
            DataIdentity::Content { digest, len } => write!(f, "content:{digest}+{len}"),
            DataIdentity::Stream { ticket } => write!(f, "stream:{ticket}"),
        }
    }
}
