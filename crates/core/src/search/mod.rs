//! Route search over a point field

pub mod route;

pub use route::{Route, RouteSearch, SearchOutcome, SearchReport, SearchStats};
