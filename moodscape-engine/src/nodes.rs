//! Building blocks (nodes) for the mood bed.
//!
//! These are zero-allocation, per-sample components designed for realtime
//! use. Everything here is `Copy` and cheap to move; no locks, no heap.
//!
//! Contents:
//! - `Wave`, `Osc`  : basic oscillators (Sine/Triangle/Saw) with stable phase wrap
//! - `Lfo`          : low-frequency oscillator (same core as `Osc`), for modulation
//! - `WhiteNoise`   : wide-spectrum noise via a xorshift core
//!
//! Notes:
//! - Frequency is **Hz**; methods expect the current **sample rate** when stepping.
//! - The noise core is deterministic given its seed; seeding happens off the
//!   audio thread (the bed seeds it via `rand` at construction).

use moodscape_core::dsp::sin_phase01;

/// Oscillator waveform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Triangle,
    Saw,
}

/// Cheap triangle and naive saw; good enough for ambient drones.
#[inline]
fn osc_sample(phase01: f32, wave: Wave) -> f32 {
    match wave {
        Wave::Sine => sin_phase01(phase01),
        Wave::Triangle => 4.0 * (phase01 - 0.5).abs() - 1.0,
        Wave::Saw => 2.0 * phase01 - 1.0,
    }
}

/// Free-running oscillator. Not anti-aliased; fine for drones and LFO duties.
#[derive(Copy, Clone, Debug)]
pub struct Osc {
    phase: f32, // [0,1)
    freq: f32,  // Hz
    wave: Wave,
}

impl Osc {
    #[inline]
    pub fn new(freq_hz: f32, wave: Wave) -> Self {
        Self { phase: 0.0, freq: freq_hz.max(0.0), wave }
    }

    #[inline]
    pub fn set_freq(&mut self, hz: f32) {
        self.freq = hz.max(0.0);
    }

    /// Advance one sample and return the oscillator sample in [-1, 1].
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        self.phase = (self.phase + self.freq / sr) % 1.0;
        osc_sample(self.phase, self.wave)
    }
}

/// Low-frequency oscillator; identical core to `Osc` with convenience mapping.
#[derive(Copy, Clone, Debug)]
pub struct Lfo(Osc);

impl Lfo {
    #[inline]
    pub fn sine(rate_hz: f32) -> Self {
        Self(Osc::new(rate_hz, Wave::Sine))
    }

    /// Next LFO value in **[-1,1]**.
    #[inline]
    pub fn next_norm(&mut self, sr: f32) -> f32 {
        self.0.next(sr)
    }

    #[inline]
    pub fn set_rate(&mut self, hz: f32) {
        self.0.set_freq(hz);
    }
}

/// Wide-spectrum white noise.
///
/// A xorshift32 core keeps `rand` off the audio thread; the state is seeded
/// once at construction (zero seeds are remapped, xorshift32 has a fixed
/// point at 0).
#[derive(Copy, Clone, Debug)]
pub struct WhiteNoise {
    state: u32,
}

impl WhiteNoise {
    #[inline]
    pub fn new(seed: u32) -> Self {
        Self { state: if seed == 0 { 0x9E37_79B9 } else { seed } }
    }

    /// Next noise sample, uniform in [-1, 1].
    #[inline]
    pub fn next(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        // Map the top 24 bits to [-1, 1].
        (x >> 8) as f32 * (2.0 / 16_777_215.0) - 1.0
    }
}

// ------------------------------------ Tests --------------------------------------
