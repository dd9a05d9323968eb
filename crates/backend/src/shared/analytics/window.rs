//! Window resolution and the shared two-mode (comparison / single) driver.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use contracts::shared::analytics::{
    AnalyticsQueryParams, ChartSeries, MetricResponse, PeriodResult, Resolution,
    TimeSeriesPayload,
};
use std::future::Future;

use super::chart::{materialize_series, ChartWindow, FillMode};
use super::error::AnalyticsError;
use super::partition::{partition, Timestamped};
use super::resolution::{chart_span, local_midnight, next_bucket, select_resolution, truncate};
use super::source::RecordFilter;
use super::AnalyticsContext;

/// Accepted calendar years for query dates. The upper year leaves room for
/// the inclusive-day bound so every fetch bound formats as a four-digit
/// RFC 3339 year.
const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 9998;

/// How an explicit upper bound is turned into an exclusive query bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndBound {
    /// Use the instant as given.
    Exact,
    /// Treat it as a picked calendar day: the bound becomes the next local
    /// midnight so the whole day is included.
    InclusiveDay,
}

/// Validated current window plus optional comparison window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub compare_from: Option<DateTime<Utc>>,
    pub compare_to: Option<DateTime<Utc>>,
}

impl AnalyticsQuery {
    /// "All time" up to now.
    pub fn all_time() -> Self {
        Self::default()
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn compared_to(mut self, compare_from: DateTime<Utc>, compare_to: DateTime<Utc>) -> Self {
        self.compare_from = Some(compare_from);
        self.compare_to = Some(compare_to);
        self
    }

    pub fn is_comparison(&self) -> bool {
        self.from.is_some() && self.compare_from.is_some()
    }

    pub fn parse(params: &AnalyticsQueryParams, tz: Tz) -> Result<Self, AnalyticsError> {
        let query = Self {
            from: parse_date("dateRangeFrom", params.date_range_from.as_deref(), tz)?,
            to: parse_date("dateRangeTo", params.date_range_to.as_deref(), tz)?,
            compare_from: parse_date(
                "dateRangeFromCompareTo",
                params.date_range_from_compare_to.as_deref(),
                tz,
            )?,
            compare_to: parse_date(
                "dateRangeToCompareTo",
                params.date_range_to_compare_to.as_deref(),
                tz,
            )?,
        };
        query.validate()?;
        Ok(query)
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let fields = [
            ("dateRangeFrom", self.from),
            ("dateRangeTo", self.to),
            ("dateRangeFromCompareTo", self.compare_from),
            ("dateRangeToCompareTo", self.compare_to),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if !(MIN_YEAR..=MAX_YEAR).contains(&value.year()) {
                    return Err(AnalyticsError::InvalidRange(format!(
                        "{field} {value} is outside years {MIN_YEAR}..={MAX_YEAR}"
                    )));
                }
            }
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AnalyticsError::InvalidRange(format!(
                    "dateRangeFrom {from} is after dateRangeTo {to}"
                )));
            }
        }
        if let (Some(from), Some(to)) = (self.compare_from, self.compare_to) {
            if from > to {
                return Err(AnalyticsError::InvalidRange(format!(
                    "dateRangeFromCompareTo {from} is after dateRangeToCompareTo {to}"
                )));
            }
        }
        match (self.from, self.compare_from) {
            (None, Some(_)) => Err(AnalyticsError::InvalidRange(
                "a comparison window needs dateRangeFrom".to_string(),
            )),
            (Some(from), Some(compare_from)) if compare_from > from => {
                Err(AnalyticsError::InvalidRange(
                    "the comparison window must start before the current window".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD` (local midnight in `tz`) or epoch millis.
fn parse_date(
    field: &'static str,
    value: Option<&str>,
    tz: Tz,
) -> Result<Option<DateTime<Utc>>, AnalyticsError> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(local_midnight(day, tz)));
    }
    if let Some(dt) = value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
    {
        return Ok(Some(dt));
    }
    Err(AnalyticsError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Effective fetch start.
///
/// The comparison lower bound wins when present (it is the earliest instant
/// of the combined fetch), then the explicit `from`, then the oldest record.
/// `None` means there is no data at all.
pub async fn resolve_start<F, Fut>(
    explicit_from: Option<DateTime<Utc>>,
    compare_from: Option<DateTime<Utc>>,
    earliest: F,
) -> Result<Option<DateTime<Utc>>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<DateTime<Utc>>>>,
{
    if let Some(compare_from) = compare_from {
        return Ok(Some(compare_from));
    }
    if let Some(from) = explicit_from {
        return Ok(Some(from));
    }
    earliest().await
}

/// Exclusive fetch upper bound: the explicit end (adjusted by `bound`) or now.
pub fn resolve_end(
    explicit_to: Option<DateTime<Utc>>,
    bound: EndBound,
    ctx: &AnalyticsContext,
) -> DateTime<Utc> {
    match (explicit_to, bound) {
        (Some(to), EndBound::Exact) => to,
        (Some(to), EndBound::InclusiveDay) => {
            next_bucket(truncate(to, Resolution::Day, ctx.tz), Resolution::Day, ctx.tz)
                .unwrap_or(to)
        }
        (None, _) => ctx.now,
    }
}

/// A resolved query: what to fetch, where to split, how to bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodPlan {
    /// Inclusive fetch lower bound.
    pub fetch_from: DateTime<Utc>,
    /// Exclusive fetch upper bound.
    pub fetch_to: DateTime<Utc>,
    /// Lower bound of the current window (the partition boundary).
    pub window_from: DateTime<Utc>,
    /// Upper bound of the current window as echoed to callers.
    pub window_to: DateTime<Utc>,
    pub compare_from: Option<DateTime<Utc>>,
    pub compare_to: Option<DateTime<Utc>>,
    pub resolution: Resolution,
}

impl PeriodPlan {
    /// Resolve `query`; `earliest` is only awaited for "all time" queries.
    pub async fn resolve<F, Fut>(
        query: &AnalyticsQuery,
        ctx: &AnalyticsContext,
        earliest: F,
    ) -> Result<Option<Self>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<DateTime<Utc>>>>,
    {
        let comparing = query.is_comparison();
        let compare_from = if comparing { query.compare_from } else { None };

        let Some(fetch_from) = resolve_start(query.from, compare_from, earliest).await? else {
            return Ok(None);
        };
        let fetch_to = resolve_end(query.to, ctx.end_bound, ctx);
        let window_from = query.from.unwrap_or(fetch_from);
        let resolution = select_resolution(window_from, query.to, ctx);

        Ok(Some(Self {
            fetch_from,
            fetch_to,
            window_from,
            window_to: query.to.unwrap_or(ctx.now),
            compare_from,
            compare_to: if comparing { query.compare_to } else { None },
            resolution,
        }))
    }

    pub fn is_comparison(&self) -> bool {
        self.compare_from.is_some()
    }

    /// `base` restricted to the fetch bounds.
    pub fn filter(&self, base: RecordFilter) -> RecordFilter {
        base.between(self.fetch_from, self.fetch_to)
    }

    /// Split fetched rows into the result shape of this plan.
    pub fn split<R: Timestamped>(&self, rows: Vec<R>) -> PeriodResult<Vec<R>> {
        if self.is_comparison() {
            let parts = partition(rows, self.window_from);
            PeriodResult::Comparison {
                current: parts.current,
                previous: parts.previous,
            }
        } else {
            PeriodResult::Single { current: rows }
        }
    }

    /// Split `rows` and aggregate each half with `f`.
    pub fn aggregate<R, T>(&self, rows: Vec<R>, f: impl Fn(&[R]) -> T) -> MetricResponse<T>
    where
        R: Timestamped,
    {
        self.respond(self.split(rows).map(|half| f(&half)))
    }

    /// Wrap a computed result with the date echo of this plan.
    pub fn respond<T>(&self, result: PeriodResult<T>) -> MetricResponse<T> {
        MetricResponse {
            date_range_from: Some(self.window_from),
            date_range_to: Some(self.window_to),
            date_range_from_compare_to: self.compare_from,
            date_range_to_compare_to: self.compare_to,
            result,
        }
    }

    pub fn chart_window(&self, tz: Tz) -> ChartWindow {
        ChartWindow {
            from: self.window_from,
            to: self.window_to,
            compare_to: self.compare_to,
            resolution: self.resolution,
            tz,
        }
    }

    /// Gap-free chart of a history metric produced by this plan.
    pub fn chart(
        &self,
        metric: &MetricResponse<TimeSeriesPayload>,
        fill: FillMode,
        ctx: &AnalyticsContext,
    ) -> ChartSeries {
        let window = self.chart_window(ctx.tz);
        let previous = if self.is_comparison() {
            metric.previous().map(|p| p.history.as_slice())
        } else {
            None
        };
        ChartSeries {
            resolution: self.resolution,
            span: chart_span(self.window_from, Some(self.window_to), ctx),
            points: materialize_series(&metric.current().history, previous, &window, fill),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn ctx() -> AnalyticsContext {
        AnalyticsContext::new(
            Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
            chrono_tz::UTC,
        )
    }

    #[tokio::test]
    async fn test_resolve_start_precedence() {
        let earliest = || async { Ok::<_, anyhow::Error>(Some(utc(2020, 1, 1))) };

        let start = resolve_start(Some(utc(2024, 1, 8)), Some(utc(2024, 1, 1)), earliest)
            .await
            .unwrap();
        assert_eq!(start, Some(utc(2024, 1, 1)));

        let start = resolve_start(Some(utc(2024, 1, 8)), None, earliest).await.unwrap();
        assert_eq!(start, Some(utc(2024, 1, 8)));

        let start = resolve_start(None, None, earliest).await.unwrap();
        assert_eq!(start, Some(utc(2020, 1, 1)));

        let start = resolve_start(None, None, || async { Ok::<_, anyhow::Error>(None) }).await.unwrap();
        assert_eq!(start, None);
    }

    #[test]
    fn test_resolve_end() {
        let ctx = ctx();
        let picked = utc(2024, 1, 14);

        assert_eq!(resolve_end(Some(picked), EndBound::Exact, &ctx), picked);
        assert_eq!(resolve_end(Some(picked), EndBound::InclusiveDay, &ctx), utc(2024, 1, 15));
        assert_eq!(resolve_end(None, EndBound::InclusiveDay, &ctx), ctx.now);
    }

    #[tokio::test]
    async fn test_plan_for_week_comparison() {
        let query = AnalyticsQuery::between(utc(2024, 1, 8), utc(2024, 1, 14))
            .compared_to(utc(2024, 1, 1), utc(2024, 1, 7));

        let plan = PeriodPlan::resolve(&query, &ctx(), || async { Ok::<_, anyhow::Error>(None) })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(plan.fetch_from, utc(2024, 1, 1));
        assert_eq!(plan.fetch_to, utc(2024, 1, 15));
        assert_eq!(plan.window_from, utc(2024, 1, 8));
        assert_eq!(plan.resolution, Resolution::Day);
        assert!(plan.is_comparison());
    }

    #[tokio::test]
    async fn test_plan_without_data_is_none() {
        let plan = PeriodPlan::resolve(&AnalyticsQuery::all_time(), &ctx(), || async { Ok::<_, anyhow::Error>(None) })
            .await
            .unwrap();
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn test_all_time_plan_uses_earliest_record() {
        let plan = PeriodPlan::resolve(&AnalyticsQuery::all_time(), &ctx(), || async {
            Ok::<_, anyhow::Error>(Some(utc(2021, 5, 3)))
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(plan.fetch_from, utc(2021, 5, 3));
        assert_eq!(plan.window_to, ctx().now);
        assert_eq!(plan.resolution, Resolution::Month);
        assert!(!plan.is_comparison());
    }

    #[test]
    fn test_parse_params() {
        let params = AnalyticsQueryParams {
            date_range_from: Some("2024-01-08".into()),
            date_range_to: Some("2024-01-14T00:00:00Z".into()),
            date_range_from_compare_to: Some(utc(2024, 1, 1).timestamp_millis().to_string()),
            date_range_to_compare_to: Some("2024-01-07".into()),
            ..Default::default()
        };

        let query = AnalyticsQuery::parse(&params, chrono_tz::UTC).unwrap();
        assert_eq!(query.from, Some(utc(2024, 1, 8)));
        assert_eq!(query.to, Some(utc(2024, 1, 14)));
        assert_eq!(query.compare_from, Some(utc(2024, 1, 1)));
        assert!(query.is_comparison());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let params = AnalyticsQueryParams {
            date_range_from: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(
            AnalyticsQuery::parse(&params, chrono_tz::UTC),
            Err(AnalyticsError::InvalidDate { field: "dateRangeFrom", .. })
        ));

        let params = AnalyticsQueryParams {
            date_range_from: Some("2024-02-01".into()),
            date_range_to: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            AnalyticsQuery::parse(&params, chrono_tz::UTC),
            Err(AnalyticsError::InvalidRange(_))
        ));

        let params = AnalyticsQueryParams {
            date_range_from_compare_to: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert!(AnalyticsQuery::parse(&params, chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_years() {
        let far = DateTime::<Utc>::MAX_UTC.timestamp_millis().to_string();
        let params = AnalyticsQueryParams {
            date_range_from: Some(far.clone()),
            date_range_to: Some(far),
            ..Default::default()
        };
        assert!(matches!(
            AnalyticsQuery::parse(&params, chrono_tz::UTC),
            Err(AnalyticsError::InvalidRange(_))
        ));

        let params = AnalyticsQueryParams {
            date_range_from: Some("2024-01-01".into()),
            date_range_from_compare_to: Some("1969-12-31".into()),
            ..Default::default()
        };
        assert!(matches!(
            AnalyticsQuery::parse(&params, chrono_tz::UTC),
            Err(AnalyticsError::InvalidRange(_))
        ));

        let params = AnalyticsQueryParams {
            date_range_from: Some("9998-12-01".into()),
            date_range_to: Some("9998-12-31".into()),
            ..Default::default()
        };
        assert!(AnalyticsQuery::parse(&params, chrono_tz::UTC).is_ok());
    }

    #[test]
    fn test_inclusive_end_at_calendar_end_keeps_bound() {
        let last = DateTime::<Utc>::MAX_UTC;
        assert_eq!(resolve_end(Some(last), EndBound::InclusiveDay, &ctx()), last);
    }
}
