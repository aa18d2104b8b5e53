//! Synthetic price history for charting.
//!
//! Upstream sources only give a spot price, so each series is drawn as a
//! noisy walk along the straight line from `current * start_factor` up to
//! `current`. The noise is real randomness in production, so two calls
//! never produce the same values; tests inject [`ZeroNoise`] or
//! [`SeededNoise`] when they need exact numbers.

use crate::core::period::Window;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Share of the gap to the trend line closed on each step.
const PULL_TO_TREND: f64 = 0.3;
/// Peak-to-peak amplitude of the per-step perturbation, relative to the
/// previous value.
const VOLATILITY: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub value: f64,
}

/// What the dashboard gets for a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub current: f64,
    /// Signed percentage.
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub history: Vec<PricePoint>,
}

impl HistoricalRecord {
    /// The record served when a source is down and its policy is to absorb
    /// the failure.
    pub fn zeroed() -> Self {
        Self {
            current: 0.0,
            change_24h: 0.0,
            history: Vec::new(),
        }
    }
}

/// Source of per-step perturbation. Samples are expected in `[-0.5, 0.5)`.
pub trait Noise: Send + Sync {
    fn sample(&self) -> f64;
}

/// Thread-local RNG; the production source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadNoise;

impl Noise for ThreadNoise {
    fn sample(&self) -> f64 {
        rand::rng().random::<f64>() - 0.5
    }
}

/// Reproducible noise from a fixed seed.
#[derive(Debug)]
pub struct SeededNoise {
    rng: Mutex<StdRng>,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Noise for SeededNoise {
    fn sample(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random::<f64>() - 0.5
    }
}

/// No perturbation at all: the series follows the smoothed trend exactly.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroNoise;

impl Noise for ZeroNoise {
    fn sample(&self) -> f64 {
        0.0
    }
}

#[derive(Clone)]
pub struct SeriesGenerator {
    noise: Arc<dyn Noise>,
}

impl Default for SeriesGenerator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadNoise))
    }
}

impl SeriesGenerator {
    pub fn new(noise: Arc<dyn Noise>) -> Self {
        Self { noise }
    }

    /// Generates a series for the given period token ending now.
    pub fn generate(&self, current_price: f64, period: &str) -> Vec<PricePoint> {
        self.generate_at(current_price, Window::for_token(period), Utc::now())
    }

    /// Generates `window.points` points spaced `window.interval` apart, the
    /// last one stamped `now` and valued exactly `current_price`.
    pub fn generate_at(
        &self,
        current_price: f64,
        window: Window,
        now: DateTime<Utc>,
    ) -> Vec<PricePoint> {
        let points = window.points;
        let now_ms = now.timestamp_millis();
        let interval_ms = window.interval.num_milliseconds();
        let start_price = current_price * window.start_factor;

        let mut history = Vec::with_capacity(points);
        let mut previous = start_price;

        for i in (0..points).rev() {
            let timestamp = now_ms - i as i64 * interval_ms;
            let progress = if points > 1 {
                (points - 1 - i) as f64 / (points - 1) as f64
            } else {
                0.0
            };
            let base = start_price + (current_price - start_price) * progress;

            let perturbation = previous * self.noise.sample() * VOLATILITY;
            previous += (base - previous) * PULL_TO_TREND + perturbation;

            history.push(PricePoint {
                timestamp,
                value: round_cents(previous),
            });
        }

        if let Some(last) = history.last_mut() {
            last.value = current_price;
        }
        history.sort_by_key(|point| point.timestamp);

        history
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
