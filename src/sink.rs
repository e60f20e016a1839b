use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use crate::error::SinkError;

/// Durable key-value sink holding the latest snapshot.
///
/// `write` fully replaces whatever was stored before; `read_all` returns the
/// stored bytes verbatim.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, bytes: &[u8]) -> Result<(), SinkError>;

    async fn read_all(&self) -> Result<Vec<u8>, SinkError>;
}

// Snapshot stored as a single file on disk
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write(&self, bytes: &[u8]) -> Result<(), SinkError> {
        // Readers only ever see a complete file: write aside, then rename over
        let staging = self.staging_path();
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<u8>, SinkError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// Sink that keeps the latest snapshot in process memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    contents: RwLock<Option<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn write(&self, bytes: &[u8]) -> Result<(), SinkError> {
        *self
            .contents
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<u8>, SinkError> {
        self.contents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                SinkError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no snapshot written yet",
                ))
            })
    }
}
