//! Support/resistance detection: pivot extraction and level clustering.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};

/// Pivot window and clustering threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDetector {
    /// Bars on each side a pivot must strictly dominate.
    pub window: usize,
    /// Relative distance under which neighbouring levels merge (0.02 = 2%).
    pub threshold: f64,
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self {
            window: 5,
            threshold: 0.02,
        }
    }
}

/// Closest levels on either side of a price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NearestLevels {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// Levels of a series together with the nearest pair around the last close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub levels: Vec<f64>,
    pub price: Option<f64>,
    pub nearest: NearestLevels,
}

impl LevelDetector {
    pub fn new(window: usize, threshold: f64) -> Self {
        Self { window, threshold }
    }

    /// Raw pivot prices: local highs then local lows, unsorted.
    ///
    /// Bar `i` with `w <= i < n - w` is a local high iff its high strictly
    /// exceeds the highs of the `w` bars on each side; lows are symmetric.
    pub fn pivots(&self, candles: &[Candle]) -> Vec<f64> {
        let w = self.window;
        let n = candles.len();
        if w == 0 || n < 2 * w + 1 {
            return Vec::new();
        }

        let mut highs = Vec::new();
        let mut lows = Vec::new();
        for i in w..(n - w) {
            let neighbours = candles[(i - w)..i]
                .iter()
                .chain(&candles[(i + 1)..=(i + w)]);
            let (mut is_high, mut is_low) = (true, true);
            for other in neighbours {
                if candles[i].high <= other.high {
                    is_high = false;
                }
                if candles[i].low >= other.low {
                    is_low = false;
                }
            }
            if is_high {
                highs.push(candles[i].high);
            }
            if is_low {
                lows.push(candles[i].low);
            }
        }
        highs.extend(lows);
        highs
    }

    /// Consolidated levels, sorted ascending.
    pub fn detect(&self, candles: &[Candle]) -> Vec<f64> {
        consolidate_levels(self.pivots(candles), self.threshold)
    }

    /// Levels plus the nearest support/resistance relative to the last close.
    pub fn report(&self, candles: &[Candle]) -> LevelReport {
        let levels = self.detect(candles);
        let price = candles.last().map(|c| c.close);
        let nearest = price
            .map(|p| nearest_levels(p, &levels))
            .unwrap_or_default();
        LevelReport {
            levels,
            price,
            nearest,
        }
    }
}

/// Sort and greedily cluster raw levels.
///
/// A level joins the open group if `level <= last_added * (1 + threshold)`;
/// a closed group collapses to its arithmetic mean. Non-finite inputs are
/// dropped. Consolidating an already consolidated list returns it unchanged.
pub fn consolidate_levels(mut levels: Vec<f64>, threshold: f64) -> Vec<f64> {
    levels.retain(|l| l.is_finite());
    if levels.is_empty() {
        return levels;
    }
    levels.sort_by(|a, b| a.total_cmp(b));

    let mut consolidated = Vec::new();
    let mut group = vec![levels[0]];
    for &level in &levels[1..] {
        let last = group[group.len() - 1];
        if level <= last * (1.0 + threshold) {
            group.push(level);
        } else {
            consolidated.push(mean(&group));
            group.clear();
            group.push(level);
        }
    }
    consolidated.push(mean(&group));
    consolidated
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Max level strictly below `price` and min level strictly above it.
pub fn nearest_levels(price: f64, levels: &[f64]) -> NearestLevels {
    let support = levels
        .iter()
        .copied()
        .filter(|&l| l < price)
        .max_by(|a, b| a.total_cmp(b));
    let resistance = levels
        .iter()
        .copied()
        .filter(|&l| l > price)
        .min_by(|a, b| a.total_cmp(b));
    NearestLevels {
        support,
        resistance,
    }
}
