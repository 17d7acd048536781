//! Benchmarks for the synthesis bed.
//!
//! Run:
//! - cargo bench
//! - cargo bench --features fast-math

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use moodscape_engine::graph::SynthBed;
use moodscape_engine::palette::{palette_for, MoodKey};

const FS: f32 = 48_000.0;
const LFO_RATE: f32 = 0.08;
const LFO_DEPTH: f32 = 12.0;

fn steady_bed(mood: MoodKey) -> SynthBed {
    let palette = palette_for(mood);
    let mut bed = SynthBed::new(FS, &palette, LFO_RATE, LFO_DEPTH, 0xC0FF_EE00);
    bed.apply_palette(&palette, 0.0);
    bed
}

fn bench_steady_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("bed_steady");
    group.sample_size(50);
    for mood in [MoodKey::Sunny, MoodKey::Stormy] {
        group.bench_function(mood.as_str(), |b| {
            let mut bed = steady_bed(mood);
            b.iter(|| {
                let mut acc = 0.0f32;
                for _ in 0..(FS as usize) {
                    acc += bed.next();
                }
                black_box(acc)
            });
        });
    }
    group.finish();
}

fn bench_morph_render(c: &mut Criterion) {
    // Worst case for the automation path: every parameter mid-ramp.
    c.bench_function("bed_morph_sunny_to_rainy", |b| {
        let mut bed = steady_bed(MoodKey::Sunny);
        let mut target = MoodKey::Rainy;
        b.iter(|| {
            bed.apply_palette(&palette_for(target), 1.2);
            let mut acc = 0.0f32;
            for _ in 0..(FS as usize) {
                acc += bed.next();
            }
            target = if target == MoodKey::Rainy { MoodKey::Sunny } else { MoodKey::Rainy };
            black_box(acc)
        });
    });
}

criterion_group!(benches, bench_steady_render, bench_morph_render);
criterion_main!(benches);
