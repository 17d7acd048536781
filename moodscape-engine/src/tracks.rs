//! Per-mood assets and "now playing" suggestion metadata.
//!
//! The asset names drive the file-backed player; the playlists are display
//! metadata only and never touch the signal path. Suggestion picking takes
//! an injected rng so hosts and tests control the randomness.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::palette::MoodKey;

/// File name of the looping rain texture, relative to the asset directory.
pub const RAIN_ASSET: &str = "rain.wav";

/// File name of the pre-recorded track for `mood`, relative to the asset
/// directory.
#[inline]
pub fn asset_for_mood(mood: MoodKey) -> &'static str {
    match mood {
        MoodKey::Sunny => "sunny.wav",
        MoodKey::Rainy => "rainy.wav",
        MoodKey::Cloudy => "cloudy.wav",
        MoodKey::Foggy => "foggy.wav",
        MoodKey::Snowy => "snowy.wav",
        MoodKey::Stormy => "stormy.wav",
    }
}

/// Resolve a relative asset name against the configured asset directory.
#[inline]
pub fn resolve_asset(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

/// Display metadata for whatever the UI surfaces as "now playing".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub artist: String,
    pub url: String,
}

/// A playlist entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub title: &'static str,
    pub artist: &'static str,
    pub url: &'static str,
}

impl Track {
    pub fn to_suggestion(self) -> Suggestion {
        Suggestion {
            title: self.title.to_owned(),
            artist: self.artist.to_owned(),
            url: self.url.to_owned(),
        }
    }
}

/// Curated tracks per mood.
pub fn playlist_for(mood: MoodKey) -> &'static [Track] {
    match mood {
        MoodKey::Sunny => &[
            Track { title: "Good Day", artist: "Nappy Roots", url: "https://open.spotify.com/track/3AyGbyBLU0c5fJ6kC3Bf7I" },
            Track { title: "Walking on Sunshine", artist: "Katrina & The Waves", url: "https://open.spotify.com/track/1Y373MqadDRtclJNdnUXVc" },
            Track { title: "Send Me On My Way", artist: "Rusted Root", url: "https://open.spotify.com/track/7h6xN8oQUNqvZqC3uWZ9sP" },
            Track { title: "Sunday Best", artist: "Surfaces", url: "https://open.spotify.com/track/5sO5WJr1kgh4QYVjpv8k8l" },
        ],
        MoodKey::Rainy => &[
            Track { title: "Turning Page", artist: "Sleeping At Last", url: "https://open.spotify.com/track/1xwAWUI8ZX0oiVQzG3IVnm" },
            Track { title: "Holocene", artist: "Bon Iver", url: "https://open.spotify.com/track/5j8RpmZspU2o6eQ5Gkbt1M" },
            Track { title: "Skinny Love", artist: "Bon Iver", url: "https://open.spotify.com/track/1oAOI8fEYXPLt1QvQK7rVc" },
            Track { title: "Yellow", artist: "Coldplay", url: "https://open.spotify.com/track/3AJwUDP919kvQ9QcozQPxg" },
        ],
        MoodKey::Cloudy => &[
            Track { title: "Bloom", artist: "The Paper Kites", url: "https://open.spotify.com/track/2h9gS40QBA2fN1bczS6C3B" },
            Track { title: "Holocene", artist: "Bon Iver", url: "https://open.spotify.com/track/5j8RpmZspU2o6eQ5Gkbt1M" },
            Track { title: "All I Want", artist: "Kodaline", url: "https://open.spotify.com/track/6HZILIRieu8S0iqY8kIKhj" },
            Track { title: "Pink + White", artist: "Frank Ocean", url: "https://open.spotify.com/track/1ZMiCix7XSAbfAJlEZWMCp" },
        ],
        MoodKey::Foggy => &[
            Track { title: "Sea of Love", artist: "Cat Power", url: "https://open.spotify.com/track/2ypA2zd2X8q5yQGQxGCvgG" },
            Track { title: "Night Owl", artist: "Galimatias", url: "https://open.spotify.com/track/4PxA1nvUs61iJaBItgR9Ej" },
            Track { title: "Motion Picture Soundtrack", artist: "Radiohead", url: "https://open.spotify.com/track/4BVLmqs9L9M1VlzDqgW8s3" },
            Track { title: "Holocene", artist: "Bon Iver", url: "https://open.spotify.com/track/5j8RpmZspU2o6eQ5Gkbt1M" },
        ],
        MoodKey::Snowy => &[
            Track { title: "River", artist: "Joni Mitchell", url: "https://open.spotify.com/track/7IHOIqZUUInxjVkko181PB" },
            Track { title: "First Snow", artist: "Emancipator", url: "https://open.spotify.com/track/1bKN3c7mL8E2usN9r0uNQm" },
            Track { title: "Hazy Shade of Winter", artist: "Simon & Garfunkel", url: "https://open.spotify.com/track/3oVf5a7RLnQzGhbSa7fucA" },
            Track { title: "Winter Song", artist: "Sara Bareilles, Ingrid Michaelson", url: "https://open.spotify.com/track/6yEpFPtZ0Pj7Vt0wJH7K6b" },
        ],
        MoodKey::Stormy => &[
            Track { title: "Believer", artist: "Imagine Dragons", url: "https://open.spotify.com/track/0pqnGHJpmpxLKifKRmU6WP" },
            Track { title: "Seven Nation Army", artist: "The White Stripes", url: "https://open.spotify.com/track/3d9DChrdc6BOeFsbrZ3Is0" },
            Track { title: "Smells Like Teen Spirit", artist: "Nirvana", url: "https://open.spotify.com/track/5ghIJDpPoe3CfHMGu71E6T" },
            Track { title: "Uprising", artist: "Muse", url: "https://open.spotify.com/track/3S0OXQeoh0w6AY8WQVckRW" },
        ],
    }
}

/// Pick a suggestion for `mood` using the injected rng.
pub fn suggest<R: Rng + ?Sized>(mood: MoodKey, rng: &mut R) -> Suggestion {
    let list = playlist_for(mood);
    list[rng.gen_range(0..list.len())].to_suggestion()
}

/// Convenience wrapper over [`suggest`] for hosts that don't carry an rng.
pub fn random_suggestion(mood: MoodKey) -> Suggestion {
    suggest(mood, &mut rand::thread_rng())
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_mood_has_an_asset_and_tracks() {
        for mood in MoodKey::ALL {
            assert!(asset_for_mood(mood).ends_with(".wav"));
            let list = playlist_for(mood);
            assert!(!list.is_empty());
            for t in list {
                assert!(t.url.starts_with("https://"), "{}: bad url {}", mood, t.url);
            }
        }
    }

    #[test]
    fn suggestion_pick_is_deterministic_under_a_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for mood in MoodKey::ALL {
            assert_eq!(suggest(mood, &mut a), suggest(mood, &mut b));
        }
    }

    #[test]
    fn resolve_joins_against_asset_dir() {
        let p = resolve_asset(Path::new("/srv/assets"), asset_for_mood(MoodKey::Foggy));
        assert_eq!(p, Path::new("/srv/assets/foggy.wav"));
    }
}
