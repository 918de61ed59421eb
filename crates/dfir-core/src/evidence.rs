//! Content-addressed evidence storage.
//!
//! The case core only ever holds a [`ContentHandle`]; bytes live behind the
//! [`EvidenceStore`] collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::clock::{Latency, RemoteOp};
use crate::error::FirError;

/// Largest evidence file accepted, in bytes (10 MiB).
pub const DEFAULT_MAX_EVIDENCE_BYTES: u64 = 10 * 1024 * 1024;

/// Default public gateway used to build retrieval URLs.
pub const DEFAULT_GATEWAY: &str = "https://ipfs.io/ipfs";

const HANDLE_PREFIX: &str = "Qm";
const HANDLE_DIGEST_CHARS: usize = 44;

/// Opaque locator for an uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(String);

impl ContentHandle {
    /// Derive the handle for `bytes`. Equal content always maps to the same
    /// handle.
    #[must_use]
    pub fn for_content(bytes: &[u8]) -> Self {
        let digest = blake3::hash(bytes).to_hex();
        Self(format!(
            "{HANDLE_PREFIX}{}",
            &digest.as_str()[..HANDLE_DIGEST_CHARS]
        ))
    }

    /// Wrap a handle string obtained elsewhere (e.g. a stored record).
    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reject uploads over `limit` bytes before any work is done.
///
/// # Errors
///
/// Returns [`FirError::UploadTooLarge`] when `size > limit`.
pub fn ensure_within_limit(size: u64, limit: u64) -> Result<(), FirError> {
    if size > limit {
        return Err(FirError::UploadTooLarge { size, limit });
    }
    Ok(())
}

/// External content-addressable blob store.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Store a file and return its handle.
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<ContentHandle, FirError>;

    /// Public URL the handle can be retrieved from.
    fn resolve(&self, handle: &ContentHandle) -> String;

    /// Retrieve previously stored bytes.
    async fn fetch(&self, handle: &ContentHandle) -> Result<Vec<u8>, FirError>;

    /// Size ceiling enforced by [`store`](Self::store).
    fn max_bytes(&self) -> u64;
}

#[derive(Debug, Clone)]
struct StoredBlob {
    file_name: String,
    bytes: Vec<u8>,
}

/// In-process stand-in for a content-addressed network store.
#[derive(Debug)]
pub struct MemoryEvidenceStore {
    blobs: Mutex<HashMap<ContentHandle, StoredBlob>>,
    max_bytes: u64,
    gateway: String,
    latency: Latency,
}

impl Default for MemoryEvidenceStore {
    fn default() -> Self {
        Self::new(Latency::default())
    }
}

impl MemoryEvidenceStore {
    #[must_use]
    pub fn new(latency: Latency) -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            max_bytes: DEFAULT_MAX_EVIDENCE_BYTES,
            gateway: DEFAULT_GATEWAY.to_string(),
            latency,
        }
    }

    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into().trim_end_matches('/').to_string();
        self
    }

    /// Original file name recorded for a handle.
    #[must_use]
    pub fn file_name(&self, handle: &ContentHandle) -> Option<String> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle)
            .map(|blob| blob.file_name.clone())
    }
}

#[async_trait]
impl EvidenceStore for MemoryEvidenceStore {
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<ContentHandle, FirError> {
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        ensure_within_limit(size, self.max_bytes)?;

        tracing::debug!(file_name, size, "uploading evidence");
        self.latency.wait(RemoteOp::Upload).await;

        let handle = ContentHandle::for_content(&bytes);
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(handle.clone())
            .or_insert_with(|| StoredBlob {
                file_name: file_name.to_string(),
                bytes,
            });

        tracing::info!(%handle, "evidence stored");
        Ok(handle)
    }

    fn resolve(&self, handle: &ContentHandle) -> String {
        format!("{}/{handle}", self.gateway)
    }

    async fn fetch(&self, handle: &ContentHandle) -> Result<Vec<u8>, FirError> {
        self.latency.wait(RemoteOp::Fetch).await;
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle)
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| FirError::not_found(handle.as_str()))
    }

    fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}
