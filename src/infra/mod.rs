pub mod rate_limiter;
pub mod tmdb_client;

pub use rate_limiter::{Limits, UpstreamLimiter};
pub use tmdb_client::TmdbClient;
