/// Upstream defaults and endpoint paths used across the codebase

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "ru-RU";
pub const DEFAULT_ORIGINAL_LANGUAGE: &str = "en";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

// Release window used when the caller omits either bound
pub const DEFAULT_START_DATE: &str = "2023-01-01";
pub const DEFAULT_END_DATE: &str = "2030-12-31";

/// Pages fetched per upstream query, whatever the upstream reports
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Widest window one request may ask for, in calendar years
pub const DEFAULT_MAX_RANGE_YEARS: u32 = 20;

/// Theatrical limited, theatrical and digital
pub const DEFAULT_RELEASE_TYPES: &str = "2|3|4";

/// TMDB refuses pages above this
pub const MAX_UPSTREAM_PAGE: u32 = 500;

pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 100;

// Upstream paths
pub const DISCOVER_MOVIE_PATH: &str = "/discover/movie";
pub const UPCOMING_MOVIE_PATH: &str = "/movie/upcoming";
pub const SEARCH_MOVIE_PATH: &str = "/search/movie";
pub const POPULAR_PERSON_PATH: &str = "/person/popular";
pub const SEARCH_PERSON_PATH: &str = "/search/person";
pub const PERSON_PATH: &str = "/person";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
