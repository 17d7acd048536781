//! Mood keys and their synthesis palettes.
//!
//! A palette is the full set of bed parameters for one mood: two oscillator
//! frequencies, the two layer gains, the filter cutoff/resonance, and the
//! rain mix (nonzero only for [`MoodKey::Rainy`]). The mapping is pure and
//! total; there is no fallback palette because the domain is closed.

use core::fmt;
use core::str::FromStr;

/// The discrete ambience category driving the soundscape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MoodKey {
    Sunny,
    Rainy,
    Cloudy,
    Foggy,
    Snowy,
    Stormy,
}

impl MoodKey {
    /// All six keys, in a stable order (handy for cycling demos and tests).
    pub const ALL: [MoodKey; 6] = [
        MoodKey::Sunny,
        MoodKey::Rainy,
        MoodKey::Cloudy,
        MoodKey::Foggy,
        MoodKey::Snowy,
        MoodKey::Stormy,
    ];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            MoodKey::Sunny => "sunny",
            MoodKey::Rainy => "rainy",
            MoodKey::Cloudy => "cloudy",
            MoodKey::Foggy => "foggy",
            MoodKey::Snowy => "snowy",
            MoodKey::Stormy => "stormy",
        }
    }
}

impl fmt::Display for MoodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodKey {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sunny" => Ok(MoodKey::Sunny),
            "rainy" => Ok(MoodKey::Rainy),
            "cloudy" => Ok(MoodKey::Cloudy),
            "foggy" => Ok(MoodKey::Foggy),
            "snowy" => Ok(MoodKey::Snowy),
            "stormy" => Ok(MoodKey::Stormy),
            _ => Err(UnknownMood),
        }
    }
}

/// Parse error for [`MoodKey`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownMood;

impl fmt::Display for UnknownMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown mood key")
    }
}

impl std::error::Error for UnknownMood {}

/// The full parameter set of the bed for one mood.
///
/// Invariants: gains ∈ [0,1]; frequencies > 0. `rain_gain` is the post-filter
/// mix of the rain texture and is nonzero only for the rainy palette.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoodPalette {
    /// Smooth (sine) oscillator target frequency, Hz.
    pub freq_a: f32,
    /// Harmonically richer (triangle) oscillator target frequency, Hz.
    pub freq_b: f32,
    /// Shared gain of the oscillator layer.
    pub osc_gain: f32,
    /// Gain of the wide-spectrum noise layer.
    pub noise_gain: f32,
    /// Resonant low-pass cutoff, Hz (before LFO motion).
    pub filter_cutoff_hz: f32,
    /// Low-pass resonance (Q).
    pub filter_q: f32,
    /// Post-filter rain texture mix.
    pub rain_gain: f32,
}

/// The palette for `mood`. Pure, total, constant-time.
#[inline]
pub fn palette_for(mood: MoodKey) -> MoodPalette {
    match mood {
        MoodKey::Sunny => MoodPalette {
            freq_a: 220.0,
            freq_b: 440.0,
            osc_gain: 0.15,
            noise_gain: 0.02,
            filter_cutoff_hz: 3500.0,
            filter_q: 0.8,
            rain_gain: 0.0,
        },
        MoodKey::Rainy => MoodPalette {
            freq_a: 174.0,
            freq_b: 261.6,
            osc_gain: 0.08,
            noise_gain: 0.05,
            filter_cutoff_hz: 1800.0,
            filter_q: 0.7,
            rain_gain: 0.35,
        },
        MoodKey::Cloudy => MoodPalette {
            freq_a: 196.0,
            freq_b: 294.0,
            osc_gain: 0.11,
            noise_gain: 0.04,
            filter_cutoff_hz: 2200.0,
            filter_q: 0.9,
            rain_gain: 0.0,
        },
        MoodKey::Foggy => MoodPalette {
            freq_a: 174.0,
            freq_b: 233.0,
            osc_gain: 0.09,
            noise_gain: 0.05,
            filter_cutoff_hz: 1200.0,
            filter_q: 1.0,
            rain_gain: 0.0,
        },
        MoodKey::Snowy => MoodPalette {
            freq_a: 392.0,
            freq_b: 523.25,
            osc_gain: 0.12,
            noise_gain: 0.03,
            filter_cutoff_hz: 2800.0,
            filter_q: 0.6,
            rain_gain: 0.0,
        },
        MoodKey::Stormy => MoodPalette {
            freq_a: 98.0,
            freq_b: 147.0,
            osc_gain: 0.13,
            noise_gain: 0.07,
            filter_cutoff_hz: 1600.0,
            filter_q: 1.2,
            rain_gain: 0.0,
        },
    }
}

// ------------------------------------ Tests --------------------------------------
