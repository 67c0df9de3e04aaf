//! The `Getter` capability and its result buffer.

use crate::error::GetterError;
use crate::options::GetterOption;
use std::io::{self, Read};

/// Fetches the raw bytes behind a locator.
///
/// Implementations must be usable from several threads at once; per-call
/// options are applied to a private copy of the getter's baseline options.
pub trait Getter: Send + Sync {
    fn get(&self, href: &str, options: &[GetterOption]) -> Result<Buffer, GetterError>;
}

/// In-memory body of a successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
    pos: usize,
}

impl Buffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// All bytes, regardless of how much has been read.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

impl Read for Buffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rest = &self.data[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Buffer::new(data)
    }
}
