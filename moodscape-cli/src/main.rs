//! Moodscape CLI — realtime host for the mood soundscape engine.

use std::error::Error;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use moodscape_core::dsp::lin_to_db;
use moodscape_engine::prefs::PrefStore;
use moodscape_engine::tracks;
use moodscape_engine::{EngineConfig, MoodEngine, MoodKey, Renderer};
use tracing::info;

#[derive(Debug, Default)]
struct Args {
    list_devices: bool,
    device_name: Option<String>,
    sample_rate: Option<u32>,
    channels: Option<u16>,
    duration_sec: Option<u64>,
    mood: Option<String>,
    cycle_sec: Option<u64>,
    volume: Option<f32>,
    assets: Option<String>,
    prefs: Option<String>,
    synth_only: bool,
}

fn parse_args() -> Args {
    let mut a = Args::default();
    for s in std::env::args().skip(1) {
        if s == "--list-devices" { a.list_devices = true; continue; }
        if s == "--synth-only"   { a.synth_only = true; continue; }
        if let Some(rest) = s.strip_prefix("--device=")      { a.device_name = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--sample-rate=") { a.sample_rate = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--channels=")    { a.channels    = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--duration=")    { a.duration_sec= rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--mood=")        { a.mood        = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--cycle=")       { a.cycle_sec   = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--volume=")      { a.volume      = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--assets=")      { a.assets      = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--prefs=")       { a.prefs       = Some(rest.to_string()); continue; }
        eprintln!("[warn] unknown arg: {s}");
    }
    a
}

fn list_output_devices() -> Result<(), Box<dyn Error>> {
    let host = cpal::default_host();
    println!("Available output devices:");
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

fn pick_device(args: &Args) -> Result<cpal::Device, Box<dyn Error>> {
    let host = cpal::default_host();
    if let Some(name) = &args.device_name {
        for d in host.output_devices()? {
            if d.name()? == *name { return Ok(d); }
        }
        return Err(format!("requested device not found: {name}").into());
    }
    host.default_output_device()
        .ok_or_else(|| "no default output device".into())
}

fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> Result<cpal::SupportedStreamConfig, Box<dyn Error>> {
    // If nothing requested, the default is already concrete.
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    // Pick a SupportedStreamConfigRange first.
    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let ch     = range.channels();
        let sr_min = range.min_sample_rate().0;
        let sr_max = range.max_sample_rate().0;

        let ch_pen = match req_ch { Some(c) => (i64::from(ch) - i64::from(c)).unsigned_abs(), None => 0 };
        let sr_pen = match req_sr {
            Some(sr) => if (sr_min..=sr_max).contains(&sr) { 0 } else { u64::from(sr_min.abs_diff(sr).min(sr_max.abs_diff(sr))) },
            None => 0,
        };

        let score = sr_pen.saturating_mul(1000) + ch_pen;
        if best.as_ref().map(|(s, _)| *s).map_or(true, |s| score < s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or_else(|| "no supported output configs".to_string())?;

    // Choose a concrete sample rate and convert the range into a concrete config.
    let pick_sr = match req_sr {
        Some(sr) => {
            let lo = range.min_sample_rate().0;
            let hi = range.max_sample_rate().0;
            cpal::SampleRate(sr.clamp(lo, hi))
        }
        None => range.max_sample_rate(),
    };

    Ok(range.with_sample_rate(pick_sr))
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut renderer: Renderer,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, Box<dyn Error>>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let sr = cfg.sample_rate.0 as f32;
    let channels = cfg.channels as usize;

    // ~1 second meter at the requested rate
    let meter_interval = (cfg.sample_rate.0).max(1) as usize;
    let mut meter_count: usize = 0;
    let mut meter_peak: f32 = 0.0;

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            renderer.pump();
            for frame in output.chunks_mut(channels) {
                let s = renderer.next(sr);

                let v: T = T::from_sample(s);
                for ch in frame.iter_mut() { *ch = v; }

                // naive peak meter
                let a = s.abs();
                if a > meter_peak { meter_peak = a; }
                meter_count += 1;
                if meter_count >= meter_interval {
                    eprintln!("[meter] peak ~ {:.1} dBFS", lin_to_db(meter_peak));
                    meter_peak = 0.0;
                    meter_count = 0;
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = parse_args();

    if args.list_devices {
        list_output_devices()?;
        return Ok(());
    }

    println!("moodscape-cli — realtime mood soundscape player\n");

    let mood = match &args.mood {
        Some(s) => s.parse::<MoodKey>().map_err(|_| format!("unknown mood: {s}"))?,
        None => MoodKey::Sunny,
    };

    let engine_cfg = EngineConfig {
        asset_dir: args.assets.clone().unwrap_or_else(|| "assets".to_string()).into(),
        synth_only: args.synth_only,
        ..Default::default()
    };
    let prefs = args.prefs.as_ref().map(PrefStore::open);

    let mut engine = MoodEngine::new(mood, engine_cfg, prefs);
    if let Some(v) = args.volume {
        engine.set_volume(v);
    }
    engine.set_suggestion(tracks::random_suggestion(mood));

    let device  = pick_device(&args)?;
    let sup_cfg = choose_config(&device, args.sample_rate, args.channels)?;
    let sample_format = sup_cfg.sample_format();
    let mut cfg = sup_cfg.config();

    if let Some(sr) = args.sample_rate { cfg.sample_rate = cpal::SampleRate(sr); }
    if let Some(ch) = args.channels    { cfg.channels    = ch; }

    println!("Using device: {}", device.name()?);
    println!("Stream config: {:?} (sample_format: {:?})", cfg, sample_format);
    println!("Mood: {mood}  | Volume: {:.2}", engine.volume());
    if let Some(s) = engine.suggestion() {
        println!("Now vibing: {} — {}", s.title, s.artist);
    }
    if let Some(c) = args.cycle_sec { println!("Cycling moods every {c} seconds"); }
    if let Some(d) = args.duration_sec { println!("Auto-stop after {d} seconds"); }
    println!("Press Ctrl+C to stop…\n");

    let renderer = engine.take_renderer().expect("renderer available before stream start");
    let err_fn = |e: cpal::StreamError| eprintln!("[cpal] stream error: {e}");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, renderer, err_fn)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, renderer, err_fn)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, renderer, err_fn)?,
        other => return Err(format!("unsupported device sample format: {other:?}").into()),
    };

    // Running from a terminal is the user gesture; activation is granted.
    engine.play(true);
    stream.play()?;

    let started = Instant::now();
    let deadline = args.duration_sec.map(Duration::from_secs);
    let mut cycle_idx = MoodKey::ALL.iter().position(|&m| m == mood).unwrap_or(0);

    loop {
        let tick = match args.cycle_sec {
            Some(c) => Duration::from_secs(c.max(1)),
            None => Duration::from_millis(500),
        };
        std::thread::sleep(tick);

        if let Some(limit) = deadline {
            if started.elapsed() >= limit {
                return Ok(());
            }
        }

        if args.cycle_sec.is_some() {
            cycle_idx = (cycle_idx + 1) % MoodKey::ALL.len();
            let next = MoodKey::ALL[cycle_idx];
            engine.set_mood(next);
            engine.set_suggestion(tracks::random_suggestion(next));
            info!(mood = %next, source = ?engine.source_mode(), "mood cycled");
            if let Some(err) = engine.last_error() {
                eprintln!("[engine] {err}");
            }
        }
    }
}
