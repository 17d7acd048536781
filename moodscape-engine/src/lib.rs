//! Moodscape Engine — mood palettes, the synthesis bed, and source arbitration.
//!
//! Crate layout:
//! - [`palette`] : mood keys and their synthesis parameter palettes
//! - [`nodes`]   : oscillators, LFO, white noise (realtime building blocks)
//! - [`graph`]   : the persistent synthesis bed (built once, morphed forever)
//! - [`clip`]    : decoded audio clips and looping voices
//! - [`rain`]    : lazy, memoized rain-texture loader
//! - [`tracks`]  : per-mood assets, playlists, suggestion metadata
//! - [`prefs`]   : persisted volume / play-intent preferences
//! - [`error`]   : asset-path error taxonomy
//! - [`engine`]  : [`MoodEngine`] control surface + [`Renderer`] render half
//!
//! The engine deliberately avoids heap allocations and locks on the audio
//! thread: control messages cross a channel pre-decoded, and every audible
//! parameter change is a scheduled linear ramp rather than a step.

pub mod clip;
pub mod engine;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod palette;
pub mod prefs;
pub mod rain;
pub mod tracks;

// Re-export the surface most hosts need.
pub use engine::{EngineConfig, EngineState, MoodEngine, PlaybackIntent, Renderer, SourceMode};
pub use palette::{palette_for, MoodKey, MoodPalette};
pub use tracks::Suggestion;
