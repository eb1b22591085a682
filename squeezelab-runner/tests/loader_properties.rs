//! Property tests for bar loading.
//!
//! 1. Synthetic bars are deterministic, weekday-only and OHLC-sane for any code
//! 2. Splitting interleaved bars and hashing is independent of input order
//! 3. CSV written from bars reads back to the same bars

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use squeezelab_core::domain::{split_by_instrument, Bar};
use squeezelab_runner::data_loader::{compute_dataset_hash, generate_synthetic_bars, read_csv_bars};

fn range(offset: i64, days: i64) -> (NaiveDate, NaiveDate) {
    let base = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let start = base + chrono::Duration::days(offset);
    (start, start + chrono::Duration::days(days))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn synthetic_bars_are_sane(code in "[A-Z0-9]{1,8}", offset in 0i64..1000, days in 0i64..400) {
        let (start, end) = range(offset, days);
        let bars = generate_synthetic_bars(&code, start, end);
        prop_assert_eq!(&bars, &generate_synthetic_bars(&code, start, end));
        for bar in &bars {
            prop_assert!(bar.is_sane());
            prop_assert!(bar.date.weekday().number_from_monday() <= 5);
            prop_assert!(bar.date >= start && bar.date <= end);
        }
        prop_assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn hash_ignores_interleaving(seed in any::<u64>(), days in 5i64..120) {
        let (start, end) = range(0, days);
        let mut bars: Vec<Bar> = ["AAA", "BBB", "CCC"]
            .iter()
            .flat_map(|c| generate_synthetic_bars(c, start, end))
            .collect();
        let ordered = compute_dataset_hash(&split_by_instrument(bars.clone()).unwrap());

        // Deterministic shuffle driven by the seed.
        let n = bars.len();
        let mut state = seed | 1;
        for i in (1..n).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            bars.swap(i, (state % (i as u64 + 1)) as usize);
        }
        let shuffled = compute_dataset_hash(&split_by_instrument(bars).unwrap());
        prop_assert_eq!(ordered, shuffled);
    }

    #[test]
    fn csv_reads_back_written_bars(code in "[0-9]{6}", days in 1i64..200) {
        let (start, end) = range(10, days);
        let bars = generate_synthetic_bars(&code, start, end);

        let mut wtr = csv::Writer::from_writer(vec![]);
        for bar in &bars {
            wtr.serialize(bar).unwrap();
        }
        let data = wtr.into_inner().unwrap();
        // An empty bar list writes no header, which the reader rejects.
        prop_assume!(!bars.is_empty());
        let parsed = read_csv_bars(data.as_slice()).unwrap();
        prop_assert!(parsed.rejected.is_empty());
        prop_assert_eq!(parsed.series.len(), 1);
        prop_assert_eq!(parsed.series[0].bars(), bars.as_slice());
    }
}
