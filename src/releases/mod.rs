//! Release aggregation: month buckets, upstream query planning, and the
//! normalize / filter / dedupe / sort pass over everything fetched.

pub mod buckets;
pub mod normalize;
pub mod plan;

pub use buckets::{month_buckets, years_in, BoundaryMonths};
pub use normalize::{assemble, AssemblyStats};
pub use plan::{plan_queries, PlanSettings, Strategy};
