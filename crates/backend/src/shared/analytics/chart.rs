//! Gap-filling walk that turns sparse bucketed series into a fixed-cadence
//! chart.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use contracts::shared::analytics::{ChartPoint, Resolution, SeriesPoint};
use std::collections::HashMap;

use super::resolution::{next_bucket, truncate};

/// What a bucket without data shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillMode {
    Zero,
    /// Repeat the last known value, starting from the given seeds. Used for
    /// running totals so gaps never regress.
    CarryForward { current_seed: f64, previous_seed: f64 },
}

/// Bounds of the walk. `from`/`to` are both inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub compare_to: Option<DateTime<Utc>>,
    pub resolution: Resolution,
    pub tz: Tz,
}

impl ChartWindow {
    /// Shift from a current bucket to its comparison bucket: `to - compare_to`
    /// when the comparison end is known, the window length otherwise.
    fn offset(&self) -> Duration {
        match self.compare_to {
            Some(compare_to) => self.to - compare_to,
            None => self.to - self.from,
        }
    }
}

struct Lookup {
    values: HashMap<DateTime<Utc>, f64>,
    last: f64,
}

impl Lookup {
    fn new(series: &[SeriesPoint], window: &ChartWindow, seed: f64) -> Self {
        let values = series
            .iter()
            .map(|p| (truncate(p.bucket_start, window.resolution, window.tz), p.value))
            .collect();
        Self { values, last: seed }
    }

    fn value_at(&mut self, bucket: DateTime<Utc>, fill: FillMode) -> f64 {
        match self.values.get(&bucket) {
            Some(value) => {
                self.last = *value;
                *value
            }
            None => self.gap(fill),
        }
    }

    fn gap(&self, fill: FillMode) -> f64 {
        match fill {
            FillMode::Zero => 0.0,
            FillMode::CarryForward { .. } => self.last,
        }
    }
}

/// Walk `window` one bucket at a time and emit one point per bucket.
///
/// Each point carries the current value of its bucket and, when `previous`
/// is given, the value of the offset comparison bucket. The output has one
/// point per resolution step between `from` and `to` inclusive and no
/// duplicate buckets.
pub fn materialize_series(
    current: &[SeriesPoint],
    previous: Option<&[SeriesPoint]>,
    window: &ChartWindow,
    fill: FillMode,
) -> Vec<ChartPoint> {
    let (current_seed, previous_seed) = match fill {
        FillMode::Zero => (0.0, 0.0),
        FillMode::CarryForward {
            current_seed,
            previous_seed,
        } => (current_seed, previous_seed),
    };
    let mut current = Lookup::new(current, window, current_seed);
    let mut previous = previous.map(|series| Lookup::new(series, window, previous_seed));
    let offset = window.offset();

    let last = truncate(window.to, window.resolution, window.tz);
    let mut bucket = truncate(window.from, window.resolution, window.tz);
    let mut points = Vec::new();

    while bucket <= last {
        let current_value = current.value_at(bucket, fill);
        let (previous_bucket, previous_value) = match previous.as_mut() {
            Some(lookup) => match bucket.checked_sub_signed(offset) {
                Some(shifted) => {
                    let previous_bucket = truncate(shifted, window.resolution, window.tz);
                    let value = lookup.value_at(previous_bucket, fill);
                    (Some(previous_bucket), Some(value))
                }
                // comparison bucket falls before the first representable instant
                None => (None, Some(lookup.gap(fill))),
            },
            None => (None, None),
        };

        points.push(ChartPoint {
            bucket,
            current_value,
            previous_bucket,
            previous_value,
        });
        match next_bucket(bucket, window.resolution, window.tz) {
            Some(next) => bucket = next,
            None => break,
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn window(from: DateTime<Utc>, to: DateTime<Utc>, resolution: Resolution) -> ChartWindow {
        ChartWindow {
            from,
            to,
            compare_to: None,
            resolution,
            tz: chrono_tz::UTC,
        }
    }

    #[test]
    fn test_zero_fill_covers_every_day() {
        let current = vec![
            SeriesPoint::new(utc(2024, 1, 9), 3.0),
            SeriesPoint::new(utc(2024, 1, 12), 1.0),
        ];
        let w = window(utc(2024, 1, 8), utc(2024, 1, 14), Resolution::Day);

        let points = materialize_series(&current, None, &w, FillMode::Zero);

        assert_eq!(points.len(), 7);
        let values: Vec<f64> = points.iter().map(|p| p.current_value).collect();
        assert_eq!(values, vec![0.0, 3.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(points.iter().all(|p| p.previous_value.is_none()));

        let mut buckets: Vec<_> = points.iter().map(|p| p.bucket).collect();
        buckets.dedup();
        assert_eq!(buckets.len(), 7);
    }

    #[test]
    fn test_previous_bucket_offset() {
        let current = vec![SeriesPoint::new(utc(2024, 1, 8), 2.0)];
        let previous = vec![
            SeriesPoint::new(utc(2024, 1, 1), 5.0),
            SeriesPoint::new(utc(2024, 1, 7), 4.0),
        ];
        let mut w = window(utc(2024, 1, 8), utc(2024, 1, 14), Resolution::Day);
        w.compare_to = Some(utc(2024, 1, 7));

        let points = materialize_series(&current, Some(&previous), &w, FillMode::Zero);

        assert_eq!(points.len(), 7);
        assert_eq!(points[0].previous_bucket, Some(utc(2024, 1, 1)));
        assert_eq!(points[0].previous_value, Some(5.0));
        assert_eq!(points[6].previous_bucket, Some(utc(2024, 1, 7)));
        assert_eq!(points[6].previous_value, Some(4.0));
        assert_eq!(points[3].previous_value, Some(0.0));
    }

    #[test]
    fn test_carry_forward_never_regresses() {
        let current = vec![
            SeriesPoint::new(utc(2024, 2, 1), 12.0),
            SeriesPoint::new(utc(2024, 4, 1), 15.0),
        ];
        let w = window(utc(2024, 1, 15), utc(2024, 5, 20), Resolution::Month);

        let points = materialize_series(
            &current,
            None,
            &w,
            FillMode::CarryForward {
                current_seed: 10.0,
                previous_seed: 0.0,
            },
        );

        let values: Vec<f64> = points.iter().map(|p| p.current_value).collect();
        assert_eq!(values, vec![10.0, 12.0, 12.0, 15.0, 15.0]);
        assert_eq!(points[0].bucket, utc(2024, 1, 1));
        assert_eq!(points[4].bucket, utc(2024, 5, 1));
    }

    #[test]
    fn test_single_bucket_window() {
        let w = window(utc(2024, 1, 8), utc(2024, 1, 8), Resolution::Day);
        let points = materialize_series(&[], None, &w, FillMode::Zero);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].current_value, 0.0);
    }

    #[test]
    fn test_walk_stops_at_calendar_end() {
        let last_day = truncate(DateTime::<Utc>::MAX_UTC, Resolution::Day, chrono_tz::UTC);
        let w = window(last_day, DateTime::<Utc>::MAX_UTC, Resolution::Day);

        let points = materialize_series(&[], None, &w, FillMode::Zero);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].bucket, last_day);
    }

    #[test]
    fn test_comparison_before_calendar_start_is_gap() {
        let mut w = window(utc(2024, 1, 8), utc(2024, 1, 9), Resolution::Day);
        w.compare_to = Some(DateTime::<Utc>::MIN_UTC);

        let points = materialize_series(&[], Some(&[]), &w, FillMode::Zero);

        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.previous_bucket.is_none()));
        assert!(points.iter().all(|p| p.previous_value == Some(0.0)));
    }
}
