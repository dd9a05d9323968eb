use chrono::{DateTime, Utc};

/// Anything carrying a creation timestamp.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

impl<T: Timestamped> Timestamped for &T {
    fn created_at(&self) -> DateTime<Utc> {
        (**self).created_at()
    }
}

/// Rows split at the current-window lower bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitioned<R> {
    pub current: Vec<R>,
    pub previous: Vec<R>,
}

/// Split rows into the comparison period (`created_at < boundary`) and the
/// current period (everything else). Input order is kept inside each half.
///
/// Rows are expected to be fetched from the comparison lower bound onward,
/// so `previous` is exactly `[comparison_from, boundary)`.
pub fn partition<R: Timestamped>(rows: Vec<R>, boundary: DateTime<Utc>) -> Partitioned<R> {
    let (previous, current): (Vec<R>, Vec<R>) = rows
        .into_iter()
        .partition(|row| row.created_at() < boundary);
    Partitioned { current, previous }
}
