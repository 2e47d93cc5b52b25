// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for swatchscan-catalog: color matching against a
// catalog-sized palette and reference label interpretation.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use swatchscan_catalog::{ColorMatcher, TextInterpreter};
use swatchscan_core::{
    BoundingBox, ColorSample, ParseConfidence, ReferenceEntry, RgbColor, ScanConfig,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn sample(rgb: RgbColor, x: u32) -> ColorSample {
    ColorSample::new(rgb, BoundingBox::new(x, 0, 30, 30).unwrap(), rgb)
}

/// Eleven evenly spread reference colors, the size of a typical palette row.
fn palette() -> Vec<ReferenceEntry> {
    (0..11u32)
        .map(|i| {
            let rgb = RgbColor::new((i * 23) as u8, (255 - i * 20) as u8, (i * 11 + 40) as u8);
            ReferenceEntry::new(
                format!("A{:02}", i + 1),
                "Reference",
                None,
                &sample(rgb, i * 150),
                ParseConfidence::Structured,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_match_colors(c: &mut Criterion) {
    let matcher = ColorMatcher::new(palette(), 150.0);
    let samples: Vec<ColorSample> = (0..256u32)
        .map(|i| sample(RgbColor::new(i as u8, (i * 7 % 256) as u8, (255 - i) as u8), 0))
        .collect();

    c.bench_function("match_colors (256 x 11)", |b| {
        b.iter(|| black_box(matcher.match_colors(black_box(&samples))));
    });
}

fn bench_interpret_reference(c: &mut Criterion) {
    let interpreter = TextInterpreter::new(ScanConfig::default().text);
    let target = sample(RgbColor::new(180, 40, 60), 600);
    // Worst case: every variant is noise and the synthetic fallback runs.
    let noisy = ["", "~ ~", "|||", "??", "l1l"];
    let clean = ["A07\nRaspberry Sorbet\n18-1754 TCX"];

    c.bench_function("interpret_reference (noisy, 5 variants)", |b| {
        b.iter(|| black_box(interpreter.interpret_reference(black_box(&noisy), &target)));
    });
    c.bench_function("interpret_reference (clean, 1 variant)", |b| {
        b.iter(|| black_box(interpreter.interpret_reference(black_box(&clean), &target)));
    });
}

criterion_group!(benches, bench_match_colors, bench_interpret_reference);
criterion_main!(benches);
