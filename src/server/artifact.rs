//! Per-request temp files.
//!
//! Every upload gets a fresh UUID so concurrent requests never share a
//! path. An artifact deletes its file when dropped, which makes cleanup
//! happen exactly once on every exit path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures::Stream;
use tracing::{debug, warn};
use uuid::Uuid;

/// Size of the chunks handed to the HTTP body.
const DELIVERY_CHUNK: usize = 64 * 1024;

/// A scratch file owned by one request.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    pub fn new(dir: &Path, id: Uuid, role: &str) -> Self {
        Self {
            path: dir.join(format!("{}_{}.pdf", id, role)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed temp artifact"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove temp artifact"),
        }
    }
}

/// Input and output artifacts sharing one request id.
#[derive(Debug)]
pub struct ArtifactPair {
    pub input: TempArtifact,
    pub output: TempArtifact,
}

impl ArtifactPair {
    pub fn allocate(dir: &Path) -> Self {
        let id = Uuid::new_v4();
        Self {
            input: TempArtifact::new(dir, id, "input"),
            output: TempArtifact::new(dir, id, "output"),
        }
    }
}

/// Response body that keeps the output artifact alive until the body has
/// been fully sent or abandoned by the client.
pub struct DeliveryStream {
    remaining: Bytes,
    _artifact: TempArtifact,
}

impl DeliveryStream {
    pub fn new(bytes: impl Into<Bytes>, artifact: TempArtifact) -> Self {
        Self {
            remaining: bytes.into(),
            _artifact: artifact,
        }
    }
}

impl Stream for DeliveryStream {
    type Item = Result<Bytes, io::Error>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.remaining.is_empty() {
            return Poll::Ready(None);
        }
        let n = DELIVERY_CHUNK.min(this.remaining.len());
        Poll::Ready(Some(Ok(this.remaining.split_to(n))))
    }
}
