#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod api;
pub mod dashboards;
pub mod routes;
pub mod shared;
