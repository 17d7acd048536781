#![cfg_attr(not(feature = "std"), no_std)]
//! Moodscape Core — no_std-ready DSP primitives with an optional fast-math path.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and the `libm` math backend
//! - `fast-math`: enable approximations (polys/rationals) for tanh/trig
//!
//! Modules
//! - [`dsp`]     : math backend, utils (db/lin, filter coefficients, trig)
//! - [`filters`] : DC blocker, resonant TPT low-pass
//! - [`ramp`]    : linear parameter ramps (the crossfade primitive)
//!
//! Design
//! - No heap allocations; pure sample-by-sample primitives
//! - Clear separation between math helpers and filter/ramp building blocks
//! - Friendly to embedded / real-time targets

pub mod dsp;
pub mod filters;
pub mod ramp;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{
        db_to_lin, kill_denormals, lerp, lin_to_db, one_pole_coeff_hz, sin_phase01, soft_clip,
        tpt_g, TAU,
    };
    pub use crate::filters::{DcBlock, ResonantLp};
    pub use crate::ramp::LinearRamp;
}
