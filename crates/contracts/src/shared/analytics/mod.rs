//! Wire types shared by the analytics backend and its presentation/report
//! consumers.

pub mod period;
pub mod query;
pub mod series;

pub use period::*;
pub use query::*;
pub use series::*;
