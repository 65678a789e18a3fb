//! Benchmarks for the adaptive median filter.
//! Run with: cargo bench -p despeckle --features bench --bench adaptive_median

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};

use super::AdaptiveMedianFilter;
use crate::buffer::PixelBuffer;
use crate::config::FilterConfig;

pub fn bench_adaptive_median(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_median");

    for (width, height) in [(256, 256), (1024, 1024)] {
        let input = PixelBuffer::from_fn(width, height, |x, y| ((x * 31 + y * 17) % 256) as u8);
        group.throughput(Throughput::Elements((width * height) as u64));

        for radius in [1, 3, 5] {
            for threshold in [0.0f32, 2.0] {
                let filter = AdaptiveMedianFilter::new(FilterConfig::new(radius, threshold))
                    .expect("benchmark config is valid");
                let id = format!("{}x{}/r{}/t{}", width, height, radius, threshold);

                group.bench_with_input(BenchmarkId::new("parallel", &id), &input, |b, input| {
                    b.iter(|| black_box(filter.apply(black_box(input))));
                });
                group.bench_with_input(BenchmarkId::new("sequential", &id), &input, |b, input| {
                    b.iter(|| black_box(filter.apply_sequential(black_box(input))));
                });
            }
        }
    }

    group.finish();
}
