//! The persistent synthesis graph ("the bed").
//!
//! Fixed topology, built once and never torn down while the engine lives:
//!
//! ```text
//! osc_a (sine) ─┐
//!               ├─ osc_gain ─┐
//! osc_b (tri) ──┘            ├─→ resonant LP ──┐
//! white noise ── noise_gain ─┘       ↑         ├─→ (renderer master stage)
//!                                   LFO        │
//! rain voice ──────────────── rain_gain ───────┘
//! ```
//!
//! The rain texture bypasses the filter so it keeps its full spectrum; it
//! should feel like weather outside the window, not part of the drone. The
//! LFO wobbles the filter cutoff a few hertz around its ramped base (≈12 s
//! period) so long sessions never settle into a static, fatiguing tone.
//!
//! Every audible parameter is a [`LinearRamp`]; mood changes retarget the
//! ramps and the bed glides there. Nothing in `next()` allocates.

use std::sync::Arc;

use moodscape_core::filters::ResonantLp;
use moodscape_core::ramp::LinearRamp;

use crate::clip::{AudioClip, LoopVoice};
use crate::nodes::{Lfo, Osc, Wave, WhiteNoise};
use crate::palette::MoodPalette;

/// Keep the modulated cutoff out of the degenerate bottom end.
const MIN_CUTOFF_HZ: f32 = 40.0;

/// The synthesis graph. Mono; the host duplicates to device channels.
pub struct SynthBed {
    sr: f32,
    // sources
    osc_a: Osc,
    osc_b: Osc,
    noise: WhiteNoise,
    // motion
    lfo: Lfo,
    lfo_depth_hz: f32,
    // tone
    filter: ResonantLp,
    // automatable parameters
    freq_a: LinearRamp,
    freq_b: LinearRamp,
    osc_gain: LinearRamp,
    noise_gain: LinearRamp,
    cutoff: LinearRamp,
    q: LinearRamp,
    rain_gain: LinearRamp,
    // transient rain playback instance over the shared cached clip
    rain: Option<LoopVoice>,
}

impl SynthBed {
    /// Build the graph for `palette` at sample rate `sr`.
    ///
    /// Frequencies, cutoff and Q snap to the palette; the layer gains start
    /// at zero so the first `apply_palette` fades the bed in rather than
    /// slamming it on.
    pub fn new(
        sr: f32,
        palette: &MoodPalette,
        lfo_rate_hz: f32,
        lfo_depth_hz: f32,
        noise_seed: u32,
    ) -> Self {
        let sr = sr.max(1.0);
        Self {
            sr,
            osc_a: Osc::new(palette.freq_a, Wave::Sine),
            osc_b: Osc::new(palette.freq_b, Wave::Triangle),
            noise: WhiteNoise::new(noise_seed),
            lfo: Lfo::sine(lfo_rate_hz),
            lfo_depth_hz,
            filter: ResonantLp::new(palette.filter_cutoff_hz, palette.filter_q, sr),
            freq_a: LinearRamp::new(palette.freq_a),
            freq_b: LinearRamp::new(palette.freq_b),
            osc_gain: LinearRamp::new(0.0),
            noise_gain: LinearRamp::new(0.0),
            cutoff: LinearRamp::new(palette.filter_cutoff_hz),
            q: LinearRamp::new(palette.filter_q),
            rain_gain: LinearRamp::new(0.0),
            rain: None,
        }
    }

    /// Adopt a new sample rate (host reconfiguration). Ramp values persist;
    /// only rate-derived state is recomputed.
    pub fn reset(&mut self, sr: f32) {
        self.sr = sr.max(1.0);
        self.filter.set_sample_rate(self.sr);
    }

    /// Ramp every palette parameter to its target over `secs`, each from its
    /// current instantaneous value. Callers gate rain by zeroing
    /// `palette.rain_gain` in their copy when rain must stay off.
    pub fn apply_palette(&mut self, palette: &MoodPalette, secs: f32) {
        let sr = self.sr;
        self.freq_a.set_target(palette.freq_a, secs, sr);
        self.freq_b.set_target(palette.freq_b, secs, sr);
        self.osc_gain.set_target(palette.osc_gain, secs, sr);
        self.noise_gain.set_target(palette.noise_gain, secs, sr);
        self.cutoff.set_target(palette.filter_cutoff_hz, secs, sr);
        self.q.set_target(palette.filter_q, secs, sr);
        self.rain_gain.set_target(palette.rain_gain.clamp(0.0, 1.0), secs, sr);
    }

    /// Begin (or restart) the rain layer from a fresh voice over `clip`,
    /// fading its mix to `gain` over `secs`.
    pub fn start_rain(&mut self, clip: Arc<AudioClip>, gain: f32, secs: f32) {
        self.rain = Some(LoopVoice::new(clip));
        self.rain_gain.set_target(gain.clamp(0.0, 1.0), secs, self.sr);
    }

    /// Fade the rain mix to silence over `secs`; the voice is dropped once
    /// the fade settles (a fresh voice is created on the next start).
    pub fn stop_rain(&mut self, secs: f32) {
        self.rain_gain.set_target(0.0, secs, self.sr);
    }

    #[inline]
    pub fn has_rain_voice(&self) -> bool {
        self.rain.is_some()
    }

    /// Instantaneous rain mix level (observability for hosts and tests).
    #[inline]
    pub fn rain_level(&self) -> f32 {
        self.rain_gain.value()
    }

    /// Instantaneous oscillator frequencies (observability).
    #[inline]
    pub fn osc_freqs(&self) -> (f32, f32) {
        (self.freq_a.value(), self.freq_b.value())
    }

    /// Instantaneous layer gains (osc, noise).
    #[inline]
    pub fn layer_gains(&self) -> (f32, f32) {
        (self.osc_gain.value(), self.noise_gain.value())
    }

    /// Generate the next mono sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let sr = self.sr;

        // Filter motion: ramped base cutoff plus slow LFO wobble.
        let cut = self.cutoff.next() + self.lfo_depth_hz * self.lfo.next_norm(sr);
        self.filter.set_params(cut.max(MIN_CUTOFF_HZ), self.q.next());

        self.osc_a.set_freq(self.freq_a.next());
        self.osc_b.set_freq(self.freq_b.next());

        let voiced = (self.osc_a.next(sr) + self.osc_b.next(sr)) * self.osc_gain.next();
        let hiss = self.noise.next() * self.noise_gain.next();
        let tone = self.filter.process(voiced + hiss);

        let rain_mix = self.rain_gain.next();
        let rain = match self.rain.as_mut() {
            Some(voice) => voice.next(sr) * rain_mix,
            None => 0.0,
        };
        // Retire the voice once its fade-out has fully settled.
        if self.rain.is_some() && self.rain_gain.is_settled() && self.rain_gain.target() <= 0.0 {
            self.rain = None;
        }

        tone + rain
    }
}

// ------------------------------------ Tests --------------------------------------
