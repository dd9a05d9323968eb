pub mod customers;
pub mod orders;
pub mod sales;

use contracts::shared::analytics::{MetricResponse, PeriodResult};
use contracts::shared::indicators::{IndicatorId, IndicatorStatus, IndicatorValue};

use crate::shared::analytics::compare::percentage_delta;

/// Change (in percent) beyond which a card turns good or bad.
const STATUS_THRESHOLD: f64 = 5.0;

fn status_by_change(change: Option<f64>, higher_is_good: bool) -> IndicatorStatus {
    match change {
        Some(c) if c > STATUS_THRESHOLD => {
            if higher_is_good {
                IndicatorStatus::Good
            } else {
                IndicatorStatus::Bad
            }
        }
        Some(c) if c < -STATUS_THRESHOLD => {
            if higher_is_good {
                IndicatorStatus::Bad
            } else {
                IndicatorStatus::Good
            }
        }
        _ => IndicatorStatus::Neutral,
    }
}

/// Build a card from one metric. `value` extracts the number shown for a
/// period; the comparison half only counts when a comparison was requested.
pub(crate) fn card<T>(
    id: IndicatorId,
    metric: &MetricResponse<T>,
    value: impl Fn(&T) -> Option<f64>,
    higher_is_good: bool,
) -> IndicatorValue {
    let (current, previous) = match &metric.result {
        PeriodResult::Empty { .. } => {
            return IndicatorValue::unavailable(id, Some("No data".to_string()));
        }
        PeriodResult::Single { current } => (value(current), None),
        PeriodResult::Comparison { current, previous } => (value(current), value(previous)),
    };

    let change = match (current, previous) {
        (Some(c), Some(p)) => percentage_delta(c, p),
        _ => None,
    };
    // A drop to zero is reported as +100, so the direction comes from the
    // values themselves.
    let direction = match (current, previous) {
        (Some(c), Some(p)) if c < p => -1.0,
        _ => 1.0,
    };

    IndicatorValue {
        id,
        value: current,
        previous_value: previous,
        change_percent: change,
        status: status_by_change(change.map(|c| c.abs() * direction), higher_is_good),
        subtitle: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use contracts::shared::analytics::TimeSeriesPayload;

    fn metric(current: Option<f64>, previous: Option<f64>) -> MetricResponse<TimeSeriesPayload> {
        MetricResponse {
            date_range_from: Some(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()),
            date_range_to: None,
            date_range_from_compare_to: None,
            date_range_to_compare_to: None,
            result: PeriodResult::Comparison {
                current: TimeSeriesPayload {
                    total: current,
                    history: Vec::new(),
                },
                previous: TimeSeriesPayload {
                    total: previous,
                    history: Vec::new(),
                },
            },
        }
    }

    fn total(p: &TimeSeriesPayload) -> Option<f64> {
        Some(p.total.unwrap_or(0.0))
    }

    #[test]
    fn test_card_growth_is_good() {
        let value = card(IndicatorId::new("x"), &metric(Some(150.0), Some(100.0)), total, true);
        assert_eq!(value.change_percent, Some(50.0));
        assert_eq!(value.status, IndicatorStatus::Good);
    }

    #[test]
    fn test_card_drop_to_zero_is_bad() {
        let value = card(IndicatorId::new("x"), &metric(None, Some(100.0)), total, true);
        assert_eq!(value.value, Some(0.0));
        assert_eq!(value.change_percent, Some(100.0));
        assert_eq!(value.status, IndicatorStatus::Bad);
    }

    #[test]
    fn test_card_small_change_is_neutral() {
        let value = card(IndicatorId::new("x"), &metric(Some(102.0), Some(100.0)), total, true);
        assert_eq!(value.status, IndicatorStatus::Neutral);

        let value = card(IndicatorId::new("x"), &metric(Some(10.0), None), total, true);
        assert_eq!(value.previous_value, Some(0.0));
        assert_eq!(value.change_percent, None);
    }

    #[test]
    fn test_card_for_empty_metric() {
        let value = card(IndicatorId::new("x"), &MetricResponse::<TimeSeriesPayload>::empty(), total, true);
        assert_eq!(value.value, None);
        assert_eq!(value.status, IndicatorStatus::Neutral);
        assert!(value.subtitle.is_some());
    }
}
