//! # Error Types
//!
//! This module defines error types used throughout the qrbatch library.
//!
//! Per-entry failures ([`EntryError`]) are recovered by the batch
//! orchestrator: the entry is skipped and the batch continues. Only
//! [`BatchError`] reaches the caller of a batch run.

use thiserror::Error;

use crate::render::qr::ErrorCorrection;

/// Failure to encode a target into a QR matrix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The payload does not fit any symbol version up to the ceiling.
    #[error(
        "payload of {len} bytes exceeds QR capacity at level {level} (max version {max_version})"
    )]
    PayloadTooLarge {
        len: usize,
        level: ErrorCorrection,
        max_version: i16,
    },

    /// The encoder rejected the input for another reason.
    #[error("QR encoding failed: {0}")]
    Unencodable(String),
}

/// Why a single entry was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("label is empty")]
    EmptyLabel,

    /// Target is empty or fails the acceptance predicate.
    #[error("target '{0}' is not an accepted URI")]
    InvalidTarget(String),

    #[error(transparent)]
    PayloadTooLarge(EncodeError),

    /// Unexpected failure while measuring, compositing or encoding the PNG.
    #[error("render failure: {0}")]
    RenderFailure(String),
}

impl From<EncodeError> for EntryError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::PayloadTooLarge { .. } => EntryError::PayloadTooLarge(err),
            EncodeError::Unencodable(msg) => EntryError::RenderFailure(msg),
        }
    }
}

/// Failure while packaging images into the archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Batch-level failure surfaced to the caller.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Every entry was filtered out or failed to render.
    #[error("no valid entries in batch")]
    NoValidEntries,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

/// Failure to turn raw input into entries.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("invalid entries JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Parallel label/target lists are empty or differ in length.
    #[error("name and link mismatch or empty ({names} names, {links} links)")]
    Mismatch { names: usize, links: usize },

    #[error("expected LABEL=URL, got '{0}'")]
    MalformedPair(String),
}

/// Main error type for qrbatch operations
#[derive(Debug, Error)]
pub enum QrBatchError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// Server transport errors (bind, accept)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
