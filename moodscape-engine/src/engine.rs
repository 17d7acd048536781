//! The mood engine: source arbitration, crossfade control, and rendering.
//!
//! Two halves, one channel:
//!
//! - [`MoodEngine`] is the control surface, called from one control thread.
//!   It owns the source-mode state machine (file-backed primary, synthesized
//!   fallback, one-way), the playback intent, preferences, the rain loader,
//!   and the crossfade policy (which ramp runs how long, and when rain may
//!   sound). It never touches the audio device.
//! - [`Renderer`] is moved into the host's audio callback. It owns the
//!   synthesis bed and the file voice, drains commands with `try_recv`
//!   (never blocks, never locks), and produces mono samples the host fans
//!   out to device channels.
//!
//! Failure policy: the first observed file failure (read, decode, or play
//! rejection) permanently switches to synthesis. After that the bed keeps
//! running no matter what else fails: a missing rain texture just means one
//! fewer layer, never silence.

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use moodscape_core::dsp::soft_clip;
use moodscape_core::filters::DcBlock;
use moodscape_core::ramp::LinearRamp;

use crate::clip::{AudioClip, LoopVoice};
use crate::error::AssetError;
use crate::graph::SynthBed;
use crate::palette::{palette_for, MoodKey, MoodPalette};
use crate::prefs::{PrefStore, Preferences};
use crate::rain::RainLoader;
use crate::tracks::{asset_for_mood, resolve_asset, Suggestion, RAIN_ASSET};

/// The user's desired playback state, independent of the device and of the
/// active source. Persisted across sessions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackIntent {
    Stopped,
    Playing,
}

/// Which path renders audio. `FileBacked` → `Synthesized` is one-way: the
/// file player is never reconsulted after its first failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceMode {
    FileBacked,
    Synthesized,
}

/// Device lifecycle as the engine sees it. `Uninitialized` → `Running`
/// happens exactly once, gated on the activation capability;
/// `Suspended` ↔ `Running` may repeat (host notifications).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Suspended,
    Running,
}

/// Tunable engine parameters.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Directory holding the per-mood tracks and the rain texture.
    pub asset_dir: PathBuf,
    /// Skip the file-backed path entirely and start synthesized.
    pub synth_only: bool,
    /// Ramp for mood morphs during steady playback.
    pub mood_ramp_secs: f32,
    /// Ramp for user-initiated play/pause transitions (snappier).
    pub toggle_ramp_secs: f32,
    /// Ramp for volume moves.
    pub volume_ramp_secs: f32,
    /// Filter-motion LFO rate (0.08 Hz ≈ a 12 s period).
    pub lfo_rate_hz: f32,
    /// Filter-motion depth around the palette cutoff, in Hz.
    pub lfo_depth_hz: f32,
    /// Near-silent master floor; ramping up from a small positive value
    /// avoids the t=0 discontinuity some backends exhibit at exact zero.
    pub master_floor: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            synth_only: false,
            mood_ramp_secs: 1.2,
            toggle_ramp_secs: 0.3,
            volume_ramp_secs: 0.2,
            lfo_rate_hz: 0.08,
            lfo_depth_hz: 12.0,
            master_floor: 1e-4,
        }
    }
}

/// Control → render messages. All payloads arrive pre-decoded; the render
/// side never performs I/O.
enum Command {
    ApplyPalette { palette: MoodPalette, secs: f32 },
    SetMaster { level: f32, secs: f32 },
    StartRain { clip: Arc<AudioClip>, gain: f32, secs: f32 },
    StopRain { secs: f32 },
    SwapClip { clip: Arc<AudioClip> },
    PlayFile,
    PauseFile,
    /// Permanent teardown of the file path (fallback has happened).
    DropFile,
}

// ---------------------------------- Renderer --------------------------------------

/// Render-side half of the engine; lives inside the audio callback.
pub struct Renderer {
    rx: Receiver<Command>,
    sr: f32,
    lfo_rate_hz: f32,
    lfo_depth_hz: f32,
    noise_seed: u32,
    // master output stage: the only externally controlled level
    master: LinearRamp,
    dc: DcBlock,
    // synthesis path (built at most once)
    bed: Option<SynthBed>,
    beds_created: u32,
    // file path
    file: Option<LoopVoice>,
    file_playing: bool,
    file_dead: bool,
}

impl Renderer {
    fn new(rx: Receiver<Command>, cfg: &EngineConfig, noise_seed: u32) -> Self {
        // `sr` is corrected lazily by the first `next(sr)` call.
        let sr = 48_000.0;
        Self {
            rx,
            sr,
            lfo_rate_hz: cfg.lfo_rate_hz,
            lfo_depth_hz: cfg.lfo_depth_hz,
            noise_seed,
            master: LinearRamp::new(cfg.master_floor),
            dc: DcBlock::new(20.0, sr),
            bed: None,
            beds_created: 0,
            file: None,
            file_playing: false,
            file_dead: false,
        }
    }

    /// Drain pending control commands. Call once per audio block.
    pub fn pump(&mut self) {
        while let Ok(cmd) = self.rx.try_recv() {
            match cmd {
                Command::ApplyPalette { palette, secs } => {
                    let bed = self.bed_or_build(&palette);
                    bed.apply_palette(&palette, secs);
                }
                Command::SetMaster { level, secs } => {
                    let sr = self.sr;
                    self.master.set_target(level, secs, sr);
                }
                Command::StartRain { clip, gain, secs } => {
                    if let Some(bed) = self.bed.as_mut() {
                        bed.start_rain(clip, gain, secs);
                    }
                }
                Command::StopRain { secs } => {
                    if let Some(bed) = self.bed.as_mut() {
                        bed.stop_rain(secs);
                    }
                }
                Command::SwapClip { clip } => {
                    if !self.file_dead {
                        self.file = Some(LoopVoice::new(clip));
                    }
                }
                Command::PlayFile => {
                    if !self.file_dead && self.file.is_some() {
                        self.file_playing = true;
                    }
                }
                Command::PauseFile => self.file_playing = false,
                Command::DropFile => {
                    self.file = None;
                    self.file_playing = false;
                    self.file_dead = true;
                }
            }
        }
    }

    /// The bed is constructed at most once; later requests reuse it, so a
    /// repeated initialize is a topology no-op.
    fn bed_or_build(&mut self, palette: &MoodPalette) -> &mut SynthBed {
        if self.bed.is_none() {
            self.bed = Some(SynthBed::new(
                self.sr,
                palette,
                self.lfo_rate_hz,
                self.lfo_depth_hz,
                self.noise_seed,
            ));
            self.beds_created += 1;
        }
        self.bed.as_mut().unwrap()
    }

    /// Produce one mono sample at the host's sample rate.
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        if sr != self.sr && sr > 0.0 {
            self.sr = sr;
            self.dc.set_sample_rate(sr);
            if let Some(bed) = self.bed.as_mut() {
                bed.reset(sr);
            }
        }

        let src = if self.file_playing {
            self.file.as_mut().map_or(0.0, |v| v.next(sr))
        } else {
            self.bed.as_mut().map_or(0.0, SynthBed::next)
        };

        soft_clip(self.dc.process(src * self.master.next()))
    }

    /// Instantaneous master level (observability).
    #[inline]
    pub fn master_level(&self) -> f32 {
        self.master.value()
    }

    /// Whether the synthesis bed has been constructed.
    #[inline]
    pub fn bed_initialized(&self) -> bool {
        self.bed.is_some()
    }

    /// Whether the file voice exists and is audible.
    #[inline]
    pub fn file_active(&self) -> bool {
        self.file_playing && self.file.is_some()
    }
}

// --------------------------------- MoodEngine -------------------------------------

/// Control-side engine: arbitration, crossfade policy, preferences.
///
/// All methods are synchronous and non-blocking except where documented
/// (asset and rain loads decode on the calling thread).
pub struct MoodEngine {
    cfg: EngineConfig,
    tx: Sender<Command>,
    renderer: Option<Renderer>,

    state: EngineState,
    intent: PlaybackIntent,
    mode: SourceMode,
    mood: MoodKey,
    volume: f32,
    suggestion: Option<Suggestion>,
    last_error: Option<String>,

    prefs: Option<PrefStore>,
    rain: RainLoader,
    /// Currently loaded file asset (path + decoded clip).
    file_clip: Option<(PathBuf, Arc<AudioClip>)>,
}

impl MoodEngine {
    /// Build an engine for `mood`. Preferences are read once here; `None`
    /// runs on in-memory defaults for the session.
    pub fn new(mood: MoodKey, cfg: EngineConfig, prefs: Option<PrefStore>) -> Self {
        let loaded = prefs.as_ref().map(PrefStore::load).unwrap_or_default();
        let (tx, rx) = unbounded();
        let renderer = Renderer::new(rx, &cfg, rand::random::<u32>());
        let rain = RainLoader::new(resolve_asset(&cfg.asset_dir, RAIN_ASSET));

        let mode = if cfg.synth_only { SourceMode::Synthesized } else { SourceMode::FileBacked };
        let intent =
            if loaded.was_playing { PlaybackIntent::Playing } else { PlaybackIntent::Stopped };
        debug!(%mood, ?mode, volume = loaded.volume, "engine constructed");

        Self {
            cfg,
            tx,
            renderer: Some(renderer),
            state: EngineState::Uninitialized,
            intent,
            mode,
            mood,
            volume: loaded.volume,
            suggestion: None,
            last_error: None,
            prefs,
            rain,
            file_clip: None,
        }
    }

    /// Hand the render half to the host (usually straight into the audio
    /// callback). Returns `None` after the first call.
    pub fn take_renderer(&mut self) -> Option<Renderer> {
        self.renderer.take()
    }

    // ------------------------------ observers -------------------------------------

    #[inline] pub fn engine_state(&self) -> EngineState { self.state }
    #[inline] pub fn source_mode(&self) -> SourceMode { self.mode }
    #[inline] pub fn current_mood(&self) -> MoodKey { self.mood }
    #[inline] pub fn volume(&self) -> f32 { self.volume }
    #[inline] pub fn is_playing(&self) -> bool { self.intent == PlaybackIntent::Playing }
    #[inline] pub fn suggestion(&self) -> Option<&Suggestion> { self.suggestion.as_ref() }
    #[inline] pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

    // ------------------------------ control surface -------------------------------

    /// Request playback. `can_activate` is the platform's user-gesture
    /// capability: without it the intent is queued and honored by the first
    /// call that carries it.
    pub fn play(&mut self, can_activate: bool) {
        if self.state == EngineState::Uninitialized {
            if !can_activate {
                debug!("play intent queued until audio can be activated");
                self.intent = PlaybackIntent::Playing;
                self.persist();
                return;
            }
            self.state = EngineState::Running;
            info!("audio activated");
        }

        self.intent = PlaybackIntent::Playing;
        self.persist();
        self.start_current_source();
    }

    /// Stop audible output without tearing anything down. File mode pauses
    /// the voice directly; synthesis fades the master to the floor. Neither
    /// cancels an in-flight palette morph.
    pub fn pause(&mut self) {
        self.intent = PlaybackIntent::Stopped;
        self.persist();
        match self.mode {
            SourceMode::FileBacked => self.send(Command::PauseFile),
            SourceMode::Synthesized => {
                self.send(Command::SetMaster {
                    level: self.cfg.master_floor,
                    secs: self.cfg.toggle_ramp_secs,
                });
                self.send(Command::StopRain { secs: self.cfg.toggle_ramp_secs });
            }
        }
    }

    /// Set the master volume, clamped to [0,1]; persisted on every call.
    pub fn set_volume(&mut self, v: f32) {
        self.volume = if v.is_finite() { v.clamp(0.0, 1.0) } else { self.volume };
        self.persist();
        if self.intent == PlaybackIntent::Playing && self.state != EngineState::Uninitialized {
            self.send(Command::SetMaster {
                level: self.volume.max(self.cfg.master_floor),
                secs: self.cfg.volume_ramp_secs,
            });
        }
    }

    /// Push a mood change. While playing this morphs the soundscape over the
    /// mood ramp; file mode swaps the per-mood asset (first failure falls
    /// back to synthesis permanently).
    pub fn set_mood(&mut self, mood: MoodKey) {
        if mood == self.mood {
            return;
        }
        debug!(from = %self.mood, to = %mood, "mood change");
        self.mood = mood;

        if self.state == EngineState::Uninitialized {
            // Nothing audible yet; the queued intent will pick the palette up.
            return;
        }

        match self.mode {
            SourceMode::FileBacked => {
                // Eager swap, like reloading a media element's source; a bad
                // asset falls back even when paused.
                if let Err(e) = self.load_file_clip() {
                    self.fall_back(e);
                }
            }
            SourceMode::Synthesized => {
                self.send(Command::ApplyPalette {
                    palette: self.gated_palette(),
                    secs: self.cfg.mood_ramp_secs,
                });
                self.update_rain_layer(self.cfg.mood_ramp_secs);
            }
        }
    }

    /// Display metadata pass-through; never touches the signal path.
    pub fn set_suggestion(&mut self, suggestion: Suggestion) {
        self.suggestion = Some(suggestion);
    }

    /// Host notification: the output device was suspended by the platform.
    pub fn device_suspended(&mut self) {
        if self.state == EngineState::Running {
            self.state = EngineState::Suspended;
            debug!("device suspended");
        }
    }

    /// Host notification: the output device resumed. Re-issues the audible
    /// state so the soundscape comes back exactly where it should be.
    pub fn device_resumed(&mut self) {
        if self.state == EngineState::Suspended {
            self.state = EngineState::Running;
            debug!("device resumed");
            if self.intent == PlaybackIntent::Playing {
                self.start_current_source();
            }
        }
    }

    // ------------------------------ internals -------------------------------------

    fn send(&self, cmd: Command) {
        // Only fails when the renderer is gone; nothing to do then.
        let _ = self.tx.send(cmd);
    }

    fn persist(&self) {
        if let Some(store) = &self.prefs {
            store.save(&Preferences {
                volume: self.volume,
                was_playing: self.intent == PlaybackIntent::Playing,
            });
        }
    }

    /// Palette for the current mood with the rain mix gated on
    /// {mood == rainy AND playing}.
    fn gated_palette(&self) -> MoodPalette {
        let mut palette = palette_for(self.mood);
        if !(self.mood == MoodKey::Rainy && self.intent == PlaybackIntent::Playing) {
            palette.rain_gain = 0.0;
        }
        palette
    }

    fn start_current_source(&mut self) {
        match self.mode {
            SourceMode::FileBacked => match self.load_file_clip() {
                Ok(()) => {
                    self.send(Command::PlayFile);
                    self.send(Command::SetMaster {
                        level: self.volume.max(self.cfg.master_floor),
                        secs: self.cfg.toggle_ramp_secs,
                    });
                }
                Err(e) => self.fall_back(e),
            },
            SourceMode::Synthesized => self.start_synth(),
        }
    }

    /// Bring the synthesis path up (lazily building the bed) and ramp the
    /// master to the persisted volume. Play/pause uses the fast ramp.
    fn start_synth(&mut self) {
        self.send(Command::ApplyPalette {
            palette: self.gated_palette(),
            secs: self.cfg.toggle_ramp_secs,
        });
        self.send(Command::SetMaster {
            level: self.volume.max(self.cfg.master_floor),
            secs: self.cfg.toggle_ramp_secs,
        });
        self.update_rain_layer(self.cfg.toggle_ramp_secs);
    }

    /// Start or fade out the rain layer per the gating rule. Loading the
    /// texture may fail; that is non-fatal and retried on the next demand.
    fn update_rain_layer(&mut self, secs: f32) {
        if self.mood == MoodKey::Rainy && self.intent == PlaybackIntent::Playing {
            match self.rain.ensure_clip() {
                Ok(clip) => {
                    let gain = palette_for(MoodKey::Rainy).rain_gain;
                    self.send(Command::StartRain { clip, gain, secs });
                }
                Err(_) => {
                    // Already logged by the loader; the bed plays on without rain.
                }
            }
        } else {
            self.send(Command::StopRain { secs });
        }
    }

    /// Ensure the decoded clip for the current mood is loaded and swapped in.
    fn load_file_clip(&mut self) -> Result<(), AssetError> {
        let path = resolve_asset(&self.cfg.asset_dir, asset_for_mood(self.mood));
        let loaded = self.file_clip.as_ref().is_some_and(|(p, _)| *p == path);
        if !loaded {
            let clip = AudioClip::load_wav(&path)
                .and_then(|clip| clip.check_playable(&path).map(|()| clip))?;
            debug!(path = %path.display(), secs = clip.duration_secs(), "track loaded");
            self.send(Command::SwapClip { clip: clip.clone() });
            self.file_clip = Some((path, clip));
        }
        Ok(())
    }

    /// Permanent transition to the synthesized path. The file voice is torn
    /// down immediately (hard-failure path, no ramp) and, if the user wants
    /// audio, synthesis takes over as an implicit play.
    fn fall_back(&mut self, err: AssetError) {
        warn!(error = %err, "file path failed; switching to synthesis permanently");
        self.last_error = Some("Audio failed to load, switching to ambient mode".to_owned());
        self.mode = SourceMode::Synthesized;
        self.file_clip = None;
        self.send(Command::DropFile);
        if self.intent == PlaybackIntent::Playing && self.state != EngineState::Uninitialized {
            self.start_synth();
        }
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::path::Path;

    const SR: f32 = 48_000.0;

    fn write_wav(path: &Path, frames: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            w.write_sample(((i % 64) as i16 - 32) * 200).unwrap();
        }
        w.finalize().unwrap();
    }

    fn run(r: &mut Renderer, secs: f32) {
        r.pump();
        for _ in 0..(secs * SR) as usize {
            r.next(SR);
        }
    }

    fn synth_cfg(dir: &Path) -> EngineConfig {
        EngineConfig { asset_dir: dir.to_path_buf(), synth_only: true, ..Default::default() }
    }

    fn file_cfg(dir: &Path) -> EngineConfig {
        EngineConfig { asset_dir: dir.to_path_buf(), ..Default::default() }
    }

    #[test]
    fn fresh_play_ramps_master_to_persisted_volume() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = MoodEngine::new(MoodKey::Sunny, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        assert_eq!(engine.engine_state(), EngineState::Uninitialized);
        engine.play(true);
        assert_eq!(engine.engine_state(), EngineState::Running);

        run(&mut renderer, 0.35);
        assert_relative_eq!(renderer.master_level(), 0.65, epsilon = 1e-4);
        assert_eq!(renderer.bed.as_ref().unwrap().rain_level(), 0.0);
    }

    #[test]
    fn play_without_activation_queues_intent() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = MoodEngine::new(MoodKey::Sunny, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(false);
        assert_eq!(engine.engine_state(), EngineState::Uninitialized);
        assert!(engine.is_playing(), "intent is queued, not dropped");
        run(&mut renderer, 0.1);
        assert!(!renderer.bed_initialized(), "no graph before activation");

        engine.play(true);
        run(&mut renderer, 0.35);
        assert!(renderer.bed_initialized());
        assert_relative_eq!(renderer.master_level(), 0.65, epsilon = 1e-4);
    }

    #[test]
    fn sunny_to_rainy_morph_hits_targets_and_starts_rain() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join(RAIN_ASSET), 4_800);
        let mut engine = MoodEngine::new(MoodKey::Sunny, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        run(&mut renderer, 0.4);

        engine.set_mood(MoodKey::Rainy);
        run(&mut renderer, 1.3);

        let bed = renderer.bed.as_ref().unwrap();
        let (fa, fb) = bed.osc_freqs();
        assert_relative_eq!(fa, 174.0, epsilon = 1e-3);
        assert_relative_eq!(fb, 261.6, epsilon = 1e-3);
        assert_relative_eq!(bed.rain_level(), 0.35, epsilon = 1e-3);
        assert!(bed.has_rain_voice());
    }

    #[test]
    fn rain_is_gated_on_rainy_and_playing() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join(RAIN_ASSET), 4_800);
        let mut engine = MoodEngine::new(MoodKey::Rainy, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        run(&mut renderer, 0.4);
        assert!(renderer.bed.as_ref().unwrap().has_rain_voice());

        // Pausing fades rain out and retires the voice.
        engine.pause();
        run(&mut renderer, 0.5);
        assert!(!renderer.bed.as_ref().unwrap().has_rain_voice());
        assert_eq!(renderer.bed.as_ref().unwrap().rain_level(), 0.0);

        // Playing a non-rainy mood never brings it back.
        engine.play(true);
        engine.set_mood(MoodKey::Cloudy);
        run(&mut renderer, 1.5);
        assert!(!renderer.bed.as_ref().unwrap().has_rain_voice());
    }

    #[test]
    fn missing_rain_texture_keeps_the_bed_alive() {
        let dir = tempfile::tempdir().unwrap(); // no rain.wav
        let mut engine = MoodEngine::new(MoodKey::Rainy, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        run(&mut renderer, 0.4);

        let bed = renderer.bed.as_ref().unwrap();
        assert!(!bed.has_rain_voice());
        let (osc, noise) = bed.layer_gains();
        assert!(osc > 0.0 && noise > 0.0, "other layers unaffected");
        assert_relative_eq!(renderer.master_level(), 0.65, epsilon = 1e-4);
    }

    #[test]
    fn file_path_plays_pauses_and_swaps() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join("sunny.wav"), 9_600);
        write_wav(&dir.path().join("snowy.wav"), 9_600);
        let mut engine = MoodEngine::new(MoodKey::Sunny, file_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        run(&mut renderer, 0.35);
        assert_eq!(engine.source_mode(), SourceMode::FileBacked);
        assert!(renderer.file_active());
        assert!(!renderer.bed_initialized(), "file mode must not build the bed");

        engine.set_mood(MoodKey::Snowy);
        run(&mut renderer, 0.1);
        assert!(renderer.file_active(), "swap keeps playback going");

        engine.pause();
        run(&mut renderer, 0.1);
        assert!(!renderer.file_active());
        assert!(!engine.is_playing());
    }

    #[test]
    fn decode_failure_falls_back_to_synthesis_without_a_new_play() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join("sunny.wav"), 9_600);
        std::fs::write(dir.path().join("foggy.wav"), b"not really audio").unwrap();
        let mut engine = MoodEngine::new(MoodKey::Sunny, file_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        run(&mut renderer, 0.35);
        assert!(renderer.file_active());

        engine.set_mood(MoodKey::Foggy);
        run(&mut renderer, 0.35);

        assert_eq!(engine.source_mode(), SourceMode::Synthesized);
        assert!(engine.last_error().is_some(), "a diagnostic must be surfaced");
        assert!(!renderer.file_active(), "file voice torn down");
        assert!(renderer.bed_initialized(), "synthesis took over");
        assert_relative_eq!(renderer.master_level(), 0.65, epsilon = 1e-4);
        let (fa, _) = renderer.bed.as_ref().unwrap().osc_freqs();
        assert_relative_eq!(fa, 174.0, epsilon = 60.0); // gliding toward foggy
    }

    #[test]
    fn source_mode_never_returns_to_file() {
        let dir = tempfile::tempdir().unwrap(); // nothing to load: first play falls back
        write_wav(&dir.path().join(RAIN_ASSET), 4_800);
        let mut engine = MoodEngine::new(MoodKey::Sunny, file_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        assert_eq!(engine.source_mode(), SourceMode::Synthesized);

        // Even with a valid asset appearing later, the file path stays dead.
        write_wav(&dir.path().join("snowy.wav"), 9_600);
        engine.set_mood(MoodKey::Snowy);
        engine.pause();
        engine.play(true);
        run(&mut renderer, 0.5);
        assert_eq!(engine.source_mode(), SourceMode::Synthesized);
        assert!(!renderer.file_active());
        assert!(renderer.bed_initialized());
    }

    #[test]
    fn volume_calls_are_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = MoodEngine::new(MoodKey::Sunny, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        engine.set_volume(0.0);
        engine.set_volume(1.0);
        assert_eq!(engine.volume(), 1.0);

        run(&mut renderer, 0.5);
        assert_relative_eq!(renderer.master_level(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn repeated_play_never_duplicates_the_bed() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = MoodEngine::new(MoodKey::Stormy, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        run(&mut renderer, 0.1);
        engine.pause();
        run(&mut renderer, 0.1);
        engine.play(true);
        engine.set_mood(MoodKey::Foggy);
        run(&mut renderer, 0.5);

        assert_eq!(renderer.beds_created, 1, "graph topology must be built exactly once");
    }

    #[test]
    fn pause_does_not_cancel_palette_morphs() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = MoodEngine::new(MoodKey::Sunny, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        run(&mut renderer, 0.4);
        engine.set_mood(MoodKey::Stormy);
        engine.pause();
        run(&mut renderer, 1.3);

        // Master faded to the floor, yet the morph completed underneath.
        assert_relative_eq!(renderer.master_level(), 1e-4, epsilon = 1e-5);
        let (fa, fb) = renderer.bed.as_ref().unwrap().osc_freqs();
        assert_relative_eq!(fa, 98.0, epsilon = 1e-3);
        assert_relative_eq!(fb, 147.0, epsilon = 1e-3);
    }

    #[test]
    fn suspension_round_trip_restores_playback() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = MoodEngine::new(MoodKey::Cloudy, synth_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();

        engine.play(true);
        run(&mut renderer, 0.4);
        engine.device_suspended();
        assert_eq!(engine.engine_state(), EngineState::Suspended);

        engine.device_resumed();
        assert_eq!(engine.engine_state(), EngineState::Running);
        assert!(engine.is_playing());
        run(&mut renderer, 0.4);
        assert_relative_eq!(renderer.master_level(), 0.65, epsilon = 1e-4);
    }

    #[test]
    fn preferences_follow_volume_and_intent_changes() {
        let dir = tempfile::tempdir().unwrap();
        let prefs_path = dir.path().join("prefs.json");
        let mut engine = MoodEngine::new(
            MoodKey::Sunny,
            synth_cfg(dir.path()),
            Some(PrefStore::open(&prefs_path)),
        );

        engine.play(true);
        engine.set_volume(0.25);
        let saved = PrefStore::open(&prefs_path).load();
        assert!((saved.volume - 0.25).abs() < 1e-6);
        assert!(saved.was_playing);

        engine.pause();
        let saved = PrefStore::open(&prefs_path).load();
        assert!(!saved.was_playing);

        // A fresh engine restores the persisted values.
        let engine2 = MoodEngine::new(
            MoodKey::Sunny,
            synth_cfg(dir.path()),
            Some(PrefStore::open(&prefs_path)),
        );
        assert!((engine2.volume() - 0.25).abs() < 1e-6);
        assert!(!engine2.is_playing());
    }

    #[test]
    fn empty_asset_is_rejected_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        // Structurally valid WAV with zero frames: decodes, then is rejected.
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        hound::WavWriter::create(dir.path().join("sunny.wav"), spec).unwrap().finalize().unwrap();

        let mut engine = MoodEngine::new(MoodKey::Sunny, file_cfg(dir.path()), None);
        let mut renderer = engine.take_renderer().unwrap();
        engine.play(true);
        run(&mut renderer, 0.2);

        assert_eq!(engine.source_mode(), SourceMode::Synthesized);
        assert!(engine.last_error().is_some());
        assert!(renderer.bed_initialized());
    }

    #[test]
    fn suggestion_is_passthrough_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = MoodEngine::new(MoodKey::Sunny, synth_cfg(dir.path()), None);
        assert!(engine.suggestion().is_none());
        engine.set_suggestion(Suggestion {
            title: "Bloom".into(),
            artist: "The Paper Kites".into(),
            url: "https://example.com".into(),
        });
        assert_eq!(engine.suggestion().unwrap().title, "Bloom");
    }
}
