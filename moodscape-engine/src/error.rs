//! Typed errors for the asset path (file-backed playback and the rain layer).
//!
//! Nothing here is ever returned to the host from the control surface: asset
//! failures trigger the permanent synth fallback and are surfaced only
//! through `last_error`; rain failures just leave the rain layer off.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while fetching, decoding, or starting a pre-recorded asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Asset could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Asset path as resolved against the configured asset directory.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Asset bytes could not be decoded as WAV audio.
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// Asset path as resolved against the configured asset directory.
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    /// Asset decoded but cannot be played (empty, or an out-of-range rate).
    #[error("asset {path} rejected for playback: {reason}")]
    Rejected {
        /// Asset path as resolved against the configured asset directory.
        path: PathBuf,
        /// Human-readable reason, suitable for `last_error`.
        reason: &'static str,
    },
}
