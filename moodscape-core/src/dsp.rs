//! Math backend selection and small DSP helpers.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` approximations for hot paths
//! - Side-effect free helpers that are easy to test
//!
//! Conventions:
//! - All functions are `#[inline]` where useful to help the optimizer.
//! - Argument and return domains are documented per function.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // libm (C math) in no_std
    if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] fn m_exp(x: f32) -> f32 { libm::expf(x) }
        #[inline] fn m_tanh(x: f32) -> f32 { libm::tanhf(x) }
        #[inline] fn m_tan(x: f32) -> f32 { libm::tanf(x) }
        #[inline] fn m_ln(x: f32) -> f32 { libm::logf(x) }
        #[cfg(feature = "fast-math")]
        #[inline] fn m_round(x: f32) -> f32 { libm::roundf(x) }
    // std backend
    } else {
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_tanh(x: f32) -> f32 { x.tanh() }
        #[inline] fn m_tan(x: f32) -> f32 { x.tan() }
        #[inline] fn m_ln(x: f32) -> f32 { x.ln() }
        #[cfg(feature = "fast-math")]
        #[inline] fn m_round(x: f32) -> f32 { x.round() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π (commonly useful)
pub const TAU: f32 = 2.0 * PI;

/// A very small epsilon used in denormal handling and safe divisions.
pub const EPS_SMALL: f32 = 1.0e-20;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Kill denormal/subnormal values. Returns 0.0 if |x| < EPS_SMALL.
#[inline]
pub fn kill_denormals(x: f32) -> f32 {
    if x.abs() < EPS_SMALL { 0.0 } else { x }
}

// --------------------------------- dB / linear -----------------------------------

/// Convert dB to linear gain: lin = 10^(db/20).
#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    if db <= -120.0 { 0.0 } else { m_exp(0.11512925464970229_f32 * db) } // ln(10)/20
}

/// Convert linear gain to dB: db = 20*log10(lin).
#[inline]
pub fn lin_to_db(lin: f32) -> f32 {
    if lin <= EPS_SMALL {
        -120.0
    } else {
        8.685889638065036553_f32 * m_ln(lin) // 20/ln(10)
    }
}

// --------------------------------- Oscillator trig -------------------------------

/// Sine of a normalized phase in [0,1): `sin(2π · phase01)`.
///
/// With `fast-math` this uses a 5th-order odd polynomial after range
/// reduction (max abs error ~1e-3, fine for ambient drones); otherwise the
/// exact backend `sin`.
#[inline]
pub fn sin_phase01(phase01: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            // Reduce 2π·p into [-π, π].
            let mut xr = TAU * phase01;
            let k = m_round(xr / TAU);
            xr -= k * TAU;

            // sin(x) ≈ x * (a + b x² + c x⁴)
            let x2 = xr * xr;
            xr * (0.999_979_313_3 + x2 * (-0.166_624_432_0 + x2 * 0.008_308_978_98))
        } else {
            m_sin(TAU * phase01)
        }
    }
}

// --------------------------------- Nonlinearities --------------------------------

/// Soft clip via tanh. If `fast-math` is enabled, uses a stable rational
/// approximation (`tanh(x) ≈ x(27 + x²)/(27 + 9x²)`): smooth, monotonic,
/// clamps towards ±1.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    #[cfg(feature = "fast-math")]
    {
        let x2 = x * x;
        let num = x * (27.0 + x2);
        let den = 27.0 + 9.0 * x2;
        return num / den;
    }
    #[allow(unreachable_code)]
    m_tanh(x)
}

// --------------------------------- Filter coefficients ---------------------------

/// Cutoff in Hz to a simple one-pole coefficient: `exp(-2π fc / sr)`.
/// Lightweight "RC" style discretization for the `y = x - x₁ + b·y₁` family.
#[inline]
pub fn one_pole_coeff_hz(cut_hz: f32, sr: f32) -> f32 {
    let fc = cut_hz.max(0.0).min(0.499 * sr);
    m_exp(-2.0 * PI * fc / sr)
}

/// TPT `g = tan(π fc / sr)` for state-variable filters.
#[inline]
pub fn tpt_g(cut_hz: f32, sr: f32) -> f32 {
    let fc = cut_hz.max(0.0).min(0.499 * sr);
    m_tan(PI * (fc / sr))
}

// --------------------------------- Tests -----------------------------------------
