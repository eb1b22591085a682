//! ADX: Average Directional Index (Wilder), seeded the way TA-Lib seeds it.
//!
//! +DM/-DM come from consecutive highs and lows, true range from the previous
//! close. The running +DM, -DM and TR start as raw sums over bars 1..p, then
//! each later bar applies `x = x - x/p + current`. Every such bar yields
//! DX = 100 * |+DI - -DI| / (+DI + -DI). The first ADX is the mean of the
//! first p DX values; after that ADX = (ADX * (p - 1) + DX) / p.
//!
//! A bar with zero TR or zero +DI + -DI adds 0 to the seed mean and leaves
//! a running ADX unchanged.
//!
//! Lookback: 2 * period - 1 (first directional move needs a previous bar).

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::atr::true_range;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

/// (+DM, -DM) from `prev` to `cur`. At most one side is non-zero.
fn directional_move(prev: &Bar, cur: &Bar) -> (f64, f64) {
    let up = cur.high - prev.high;
    let down = prev.low - cur.low;
    if down > 0.0 && up < down {
        (0.0, down)
    } else if up > 0.0 && up > down {
        (up, 0.0)
    } else {
        (0.0, 0.0)
    }
}

/// DX from smoothed +DM, -DM and TR. `None` when TR or the DI sum is zero.
fn directional_index(plus_dm: f64, minus_dm: f64, tr: f64) -> Option<f64> {
    if tr == 0.0 {
        return None;
    }
    let plus_di = 100.0 * plus_dm / tr;
    let minus_di = 100.0 * minus_dm / tr;
    let sum = plus_di + minus_di;
    (sum != 0.0).then(|| 100.0 * (plus_di - minus_di).abs() / sum)
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n <= self.lookback() {
            return result;
        }

        let p = self.period;
        let pf = p as f64;
        let tr = true_range(bars);

        let (mut plus_dm, mut minus_dm, mut smoothed_tr) = (0.0, 0.0, 0.0);
        for i in 1..p {
            let (up, down) = directional_move(&bars[i - 1], &bars[i]);
            plus_dm += up;
            minus_dm += down;
            smoothed_tr += tr[i];
        }

        let first = self.lookback();
        let mut dx_sum = 0.0;
        let mut adx = f64::NAN;
        for i in p..n {
            let (up, down) = directional_move(&bars[i - 1], &bars[i]);
            plus_dm = plus_dm - plus_dm / pf + up;
            minus_dm = minus_dm - minus_dm / pf + down;
            smoothed_tr = smoothed_tr - smoothed_tr / pf + tr[i];
            let dx = directional_index(plus_dm, minus_dm, smoothed_tr);

            if i < first {
                dx_sum += dx.unwrap_or(0.0);
                continue;
            }
            if i == first {
                adx = (dx_sum + dx.unwrap_or(0.0)) / pf;
            } else if let Some(dx) = dx {
                adx = (adx * (pf - 1.0) + dx) / pf;
            }
            result[i] = adx;
        }

        result
    }
}
