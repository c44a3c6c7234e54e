use std::env;
use std::time::Duration;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, Criterion};

use pagecut_core::api::PageGeometry;
use pagecut_core::layout::Word;
use pagecut_core::utils::Rectangle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("PAGECUT_BENCH_TIER").as_deref() {
            Ok("full") => Self::Full,
            _ => Self::Quick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupWeight {
    Light,
    Heavy,
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub tier: BenchTier,
    pub seed: u64,
    pub sample_size_light: usize,
    pub sample_size_heavy: usize,
    pub measurement_light: Duration,
    pub measurement_heavy: Duration,
}

pub fn bench_config() -> BenchConfig {
    let tier = BenchTier::from_env();
    let seed = env::var("PAGECUT_BENCH_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE);
    let (sample_size_light, sample_size_heavy, measurement_light, measurement_heavy) = match tier {
        BenchTier::Quick => (20, 10, Duration::from_secs(3), Duration::from_secs(5)),
        BenchTier::Full => (30, 20, Duration::from_secs(5), Duration::from_secs(10)),
    };

    BenchConfig {
        tier,
        seed,
        sample_size_light,
        sample_size_heavy,
        measurement_light,
        measurement_heavy,
    }
}

pub fn bench_criterion() -> Criterion {
    Criterion::default().configure_from_args()
}

pub fn configure_group<M: Measurement>(
    group: &mut BenchmarkGroup<'_, M>,
    cfg: &BenchConfig,
    weight: GroupWeight,
) {
    match weight {
        GroupWeight::Light => {
            group.sample_size(cfg.sample_size_light);
            group.measurement_time(cfg.measurement_light);
        }
        GroupWeight::Heavy => {
            group.sample_size(cfg.sample_size_heavy);
            group.measurement_time(cfg.measurement_heavy);
        }
    }
}

#[derive(Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn gen_f64(&mut self, min: f64, max: f64) -> f64 {
        let n = self.next_u64() as f64 / u64::MAX as f64;
        min + (max - min) * n
    }
}

/// A page of `columns` ragged columns of `lines` lines each, with a
/// paragraph break every eight lines.
pub fn generate_page(seed: u64, page_number: usize, columns: usize, lines: usize) -> PageGeometry {
    let mut rng = XorShift64::new(seed);
    let column_width = 520.0 / columns as f64;
    let mut words = Vec::with_capacity(columns * lines * 6);

    for col in 0..columns {
        let left = 40.0 + col as f64 * column_width;
        let right = left + column_width - 24.0;
        for line in 0..lines {
            let gap = (line / 8) as f64 * 6.0;
            let bottom = 750.0 - line as f64 * 12.0 - gap;
            let mut x = left;
            loop {
                let w = rng.gen_f64(12.0, 48.0).round();
                if x + w > right {
                    break;
                }
                let chars = (w / 6.0).round().max(1.0) as usize;
                words.push(Word::new(
                    "x".repeat(chars),
                    Rectangle::new(x, bottom, x + w, bottom + 9.0),
                ));
                x += w + 4.0;
            }
        }
    }

    PageGeometry {
        page_number,
        words,
        ..Default::default()
    }
}
