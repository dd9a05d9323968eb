//! Bucket resolution selection and truncation.
//!
//! Buckets are computed in the context time zone and returned as UTC
//! instants. A day bucket starts at local midnight, a month bucket at local
//! midnight of the 1st.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use contracts::shared::analytics::{ChartSpan, Resolution};

use super::AnalyticsContext;

const WEEK_DAYS: i64 = 7;
/// Windows up to two four-week months are bucketed by day.
const DAY_BUCKET_MAX_SPAN_DAYS: i64 = 2 * 4 * WEEK_DAYS;
const FOUR_WEEK_MONTH_DAYS: i64 = 4 * WEEK_DAYS;

/// Pick the bucket resolution for a window.
///
/// With an end the choice depends on the span only. Without one, `start` is
/// compared with "one month ago" (local midnight). Month is the coarsest
/// bucket: multi-year windows still group by month.
pub fn select_resolution(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    ctx: &AnalyticsContext,
) -> Resolution {
    match end {
        Some(end) => {
            if end - start <= Duration::days(DAY_BUCKET_MAX_SPAN_DAYS) {
                Resolution::Day
            } else {
                Resolution::Month
            }
        }
        None => {
            if start >= months_ago(ctx, 1) {
                Resolution::Day
            } else {
                Resolution::Month
            }
        }
    }
}

/// Axis granularity for chart labels: last week, last month or longer.
pub fn chart_span(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    ctx: &AnalyticsContext,
) -> ChartSpan {
    match end {
        Some(end) => {
            let span = end - start;
            if span <= Duration::days(WEEK_DAYS) {
                ChartSpan::Week
            } else if span <= Duration::days(FOUR_WEEK_MONTH_DAYS) {
                ChartSpan::Month
            } else {
                ChartSpan::Year
            }
        }
        None => {
            let today = truncate(ctx.now, Resolution::Day, ctx.tz);
            if start >= today - Duration::days(WEEK_DAYS) {
                ChartSpan::Week
            } else if start >= months_ago(ctx, 1) {
                ChartSpan::Month
            } else {
                ChartSpan::Year
            }
        }
    }
}

/// Floor `date` to the start of its bucket.
pub fn truncate(date: DateTime<Utc>, resolution: Resolution, tz: Tz) -> DateTime<Utc> {
    let day = date.with_timezone(&tz).date_naive();
    let day = match resolution {
        Resolution::Day => day,
        Resolution::Month => first_of_month(day),
    };
    local_midnight(day, tz)
}

/// Start of the bucket following `bucket`, `None` past the last
/// representable calendar day.
pub fn next_bucket(
    bucket: DateTime<Utc>,
    resolution: Resolution,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    let day = bucket.with_timezone(&tz).date_naive();
    let next = match resolution {
        Resolution::Day => day.succ_opt()?,
        Resolution::Month => first_of_month(day).checked_add_months(Months::new(1))?,
    };
    Some(local_midnight(next, tz))
}

/// Local midnight `months` calendar months before today.
pub fn months_ago(ctx: &AnalyticsContext, months: u32) -> DateTime<Utc> {
    let today = ctx.now.with_timezone(&ctx.tz).date_naive();
    let day = today
        .checked_sub_months(Months::new(months))
        .unwrap_or(today);
    local_midnight(day, ctx.tz)
}

/// First instant of `day` in `tz`.
pub fn local_midnight(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // midnight skipped by a DST jump: the day starts one hour later
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}
