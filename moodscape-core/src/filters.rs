//! Filters: a DC blocker and a resonant TPT low-pass.
//!
//! Goals
//! - `no_std`-friendly, allocation free
//! - Stable under per-sample cutoff modulation (the mood bed sweeps the
//!   low-pass continuously)
//! - Clear APIs and predictable parameterization
//!
//! Contents
//! - `DcBlock`    : one-pole high-pass specialized for DC removal
//! - `ResonantLp` : low-pass tap of a TPT state-variable filter
//!
//! Notes
//! - `ResonantLp` uses the "g = tan(π fc / sr)" formulation with
//!   `R = 1/(2Q)`; robust to high resonance and parameter modulation
//!   (Zavalishin-style TPT SVF, low-pass output only).

use crate::dsp::{kill_denormals, one_pole_coeff_hz, tpt_g};

/// DC blocker: leaky-integrator high-pass.
///
/// Difference equation:
/// `y[n] = x[n] - x[n-1] + b * y[n-1]`, with `b = exp(-2π fc / sr)`.
/// `cut_hz` default recommendation: 20 Hz.
#[derive(Copy, Clone, Debug)]
pub struct DcBlock {
    b: f32,
    x1: f32,
    y1: f32,
    sr: f32,
    fc: f32,
}

impl DcBlock {
    #[inline]
    pub fn new(cut_hz: f32, sr: f32) -> Self {
        let mut s = Self {
            b: 0.0,
            x1: 0.0,
            y1: 0.0,
            sr: sr.max(1.0),
            fc: cut_hz.max(0.0),
        };
        s.update_coeffs();
        s
    }

    #[inline]
    pub fn set_sample_rate(&mut self, sr: f32) {
        self.sr = sr.max(1.0);
        self.update_coeffs();
    }

    #[inline]
    fn update_coeffs(&mut self) {
        self.b = one_pole_coeff_hz(self.fc, self.sr);
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = x - self.x1 + self.b * self.y1;
        self.x1 = x;
        self.y1 = y;
        kill_denormals(y)
    }
}

/// Resonant low-pass via a Topology-Preserving-Transform SVF.
///
/// Parameters:
/// - `cut_hz` : cutoff frequency in Hz (safe to modulate every sample)
/// - `q`      : quality factor (~0.5..2 musical range; higher rings more)
#[derive(Copy, Clone, Debug)]
pub struct ResonantLp {
    sr: f32,
    cut: f32,
    q: f32,
    // derived
    g: f32,
    r: f32,
    // integrator states
    ic1eq: f32,
    ic2eq: f32,
}

impl ResonantLp {
    #[inline]
    pub fn new(cut_hz: f32, q: f32, sr: f32) -> Self {
        let mut s = Self {
            sr: sr.max(1.0),
            cut: cut_hz.max(0.0),
            q: q.max(1e-4),
            g: 0.0,
            r: 0.0,
            ic1eq: 0.0,
            ic2eq: 0.0,
        };
        s.recalc();
        s
    }

    #[inline]
    pub fn set_sample_rate(&mut self, sr: f32) {
        self.sr = sr.max(1.0);
        self.recalc();
    }

    #[inline]
    pub fn set_cutoff_hz(&mut self, cut_hz: f32) {
        self.cut = cut_hz.max(0.0);
        self.recalc();
    }

    #[inline]
    pub fn set_q(&mut self, q: f32) {
        self.q = q.max(1e-4);
        self.recalc();
    }

    /// Set cutoff and Q together with a single coefficient recalculation;
    /// this is the per-sample modulation path of the mood bed.
    #[inline]
    pub fn set_params(&mut self, cut_hz: f32, q: f32) {
        self.cut = cut_hz.max(0.0);
        self.q = q.max(1e-4);
        self.recalc();
    }

    #[inline] pub fn cutoff_hz(&self) -> f32 { self.cut }
    #[inline] pub fn q(&self) -> f32 { self.q }

    #[inline]
    fn recalc(&mut self) {
        self.g = tpt_g(self.cut, self.sr); // tan(π fc / sr)
        self.r = 1.0 / (2.0 * self.q);     // damping
    }

    /// Process one sample, returning the low-pass output.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        // TPT SVF:
        // v0 = x - r * ic1eq - ic2eq
        // v1 = g * v0 + ic1eq
        // v2 = g * v1 + ic2eq
        let v0 = x - self.r * self.ic1eq - self.ic2eq;
        let v1 = self.g * v0 + self.ic1eq;
        let v2 = self.g * v1 + self.ic2eq;

        self.ic1eq = self.g * v0 + v1;
        self.ic2eq = self.g * v1 + v2;

        kill_denormals(v2)
    }
}

// ------------------------------------ Tests --------------------------------------
