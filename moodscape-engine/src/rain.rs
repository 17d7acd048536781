//! Lazy, memoized loader for the looping rain texture.
//!
//! The decoded clip is cached at most once per engine lifetime. Concurrent
//! callers during an in-flight load wait on a condvar instead of fetching
//! again; the first completion populates the cache for everyone. A failed
//! load leaves the cache empty, so the next demand retries naturally:
//! absence means "not yet loaded", never "unavailable".

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use tracing::{debug, warn};

use crate::clip::AudioClip;
use crate::error::AssetError;

enum CacheState {
    Empty,
    Loading,
    Ready(Arc<AudioClip>),
}

/// Single-flight rain clip loader.
pub struct RainLoader {
    path: PathBuf,
    state: Mutex<CacheState>,
    done: Condvar,
    attempts: AtomicUsize,
}

impl RainLoader {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(CacheState::Empty),
            done: Condvar::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking peek at the cache.
    pub fn cached(&self) -> Option<Arc<AudioClip>> {
        match &*self.state.lock().unwrap() {
            CacheState::Ready(clip) => Some(clip.clone()),
            _ => None,
        }
    }

    /// Decoded-load counter; diagnostics only.
    pub fn loads_attempted(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Return the cached clip, loading and decoding it on first demand.
    ///
    /// Blocks only while another caller already has the load in flight; the
    /// winner performs exactly one fetch and every waiter observes its clip.
    /// If the in-flight load fails, a waiter takes the load over (demand-
    /// driven retry).
    pub fn ensure_clip(&self) -> Result<Arc<AudioClip>, AssetError> {
        {
            let mut st = self.state.lock().unwrap();
            loop {
                match &*st {
                    CacheState::Ready(clip) => return Ok(clip.clone()),
                    CacheState::Loading => st = self.done.wait(st).unwrap(),
                    CacheState::Empty => {
                        *st = CacheState::Loading;
                        break;
                    }
                }
            }
        }

        // We own the load; do the I/O outside the lock.
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let result = AudioClip::load_wav(&self.path)
            .and_then(|clip| clip.check_playable(&self.path).map(|()| clip));

        let mut st = self.state.lock().unwrap();
        match &result {
            Ok(clip) => {
                debug!(
                    path = %self.path.display(),
                    secs = clip.duration_secs(),
                    "rain texture cached"
                );
                *st = CacheState::Ready(clip.clone());
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "rain texture load failed");
                *st = CacheState::Empty;
            }
        }
        self.done.notify_all();
        result
    }
}

// ------------------------------------ Tests --------------------------------------
