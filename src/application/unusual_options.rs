//! Unusual options volume scan.
//!
//! For each snapshot and each side independently, a contract is unusual when
//! its traded volume exceeds the side's mean volume times a multiplier.
//! Output keeps input order (snapshot, then calls before puts, then row
//! order); nothing is sorted by magnitude.

use crate::domain::entities::options::{OptionChainSnapshot, OptionRow, UnusualOption};
use crate::domain::values::option_side::OptionSide;

pub const DEFAULT_MULTIPLIER: f64 = 1.5;

pub fn scan_unusual(chains: &[OptionChainSnapshot], multiplier: f64) -> Vec<UnusualOption> {
    let mut unusual = Vec::new();
    for chain in chains {
        for (rows, side) in [(&chain.calls, OptionSide::Call), (&chain.puts, OptionSide::Put)] {
            let cutoff = side_mean(rows) * multiplier;
            for row in rows {
                let Some(volume) = row.volume else { continue };
                if volume as f64 > cutoff {
                    unusual.push(UnusualOption {
                        side,
                        strike: row.strike,
                        volume,
                        expiration: chain.expiration,
                        last_price: row.last_price,
                    });
                }
            }
        }
    }
    unusual
}

/// Mean volume over rows that report one; a zero or undefined mean is 1.
fn side_mean(rows: &[OptionRow]) -> f64 {
    let volumes: Vec<u64> = rows.iter().filter_map(|r| r.volume).collect();
    if volumes.is_empty() {
        return 1.0;
    }
    let mean = volumes.iter().map(|v| *v as f64).sum::<f64>() / volumes.len() as f64;
    if mean > 0.0 {
        mean
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(strike: f64, volume: Option<u64>) -> OptionRow {
        OptionRow {
            strike,
            volume,
            last_price: 1.0,
        }
    }

    fn chain(day: u32, calls: Vec<OptionRow>, puts: Vec<OptionRow>) -> OptionChainSnapshot {
        OptionChainSnapshot {
            expiration: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            calls,
            puts,
        }
    }

    #[test]
    fn test_flags_rows_above_mean_times_multiplier() {
        // mean = (10 + 10 + 10 + 90) / 4 = 30, cutoff = 45
        let chains = vec![chain(
            17,
            vec![row(100.0, Some(10)), row(105.0, Some(10)), row(110.0, Some(10)), row(115.0, Some(90))],
            vec![],
        )];
        let flagged = scan_unusual(&chains, 1.5);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].strike, 115.0);
        assert_eq!(flagged[0].side, OptionSide::Call);
        assert_eq!(flagged[0].volume, 90);
    }

    #[test]
    fn test_cutoff_is_strict() {
        // mean = 20, cutoff = 30; a row at exactly 30 stays unflagged
        let chains = vec![chain(17, vec![row(1.0, Some(30)), row(2.0, Some(10)), row(3.0, Some(20))], vec![])];
        assert!(scan_unusual(&chains, 1.5).is_empty());
    }

    #[test]
    fn test_sides_use_their_own_mean() {
        let chains = vec![chain(
            17,
            vec![row(100.0, Some(1000)), row(105.0, Some(1000))],
            vec![row(95.0, Some(1)), row(90.0, Some(10))],
        )];
        let flagged = scan_unusual(&chains, 1.5);
        // calls: mean 1000, nothing above 1500; puts: mean 5.5, cutoff 8.25
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].side, OptionSide::Put);
        assert_eq!(flagged[0].strike, 90.0);
    }

    #[test]
    fn test_zero_mean_falls_back_to_one() {
        let chains = vec![chain(17, vec![row(1.0, Some(0)), row(2.0, Some(0))], vec![])];
        assert!(scan_unusual(&chains, 1.5).is_empty());

        // All-missing volumes: mean undefined, rows never flagged
        let chains = vec![chain(17, vec![], vec![row(1.0, None), row(2.0, None)])];
        assert!(scan_unusual(&chains, 1.5).is_empty());
    }

    #[test]
    fn test_missing_volume_excluded_from_mean() {
        // mean over {2, 20} = 11, cutoff 16.5
        let chains = vec![chain(17, vec![row(1.0, None), row(2.0, Some(2)), row(3.0, Some(20))], vec![])];
        let flagged = scan_unusual(&chains, 1.5);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].strike, 3.0);
    }

    #[test]
    fn test_order_preserved_and_idempotent() {
        let chains = vec![
            chain(17, vec![row(1.0, Some(50)), row(2.0, Some(1)), row(3.0, Some(40))], vec![row(4.0, Some(60)), row(5.0, Some(1))]),
            chain(24, vec![row(6.0, Some(1)), row(7.0, Some(70))], vec![]),
        ];
        let first = scan_unusual(&chains, 1.0);
        let strikes: Vec<f64> = first.iter().map(|u| u.strike).collect();
        assert_eq!(strikes, vec![1.0, 3.0, 4.0, 7.0]);
        assert_eq!(first[3].expiration, NaiveDate::from_ymd_opt(2025, 1, 24).unwrap());
        assert_eq!(scan_unusual(&chains, 1.0), first);
    }
}
