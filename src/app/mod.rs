pub mod browse_use_case;
pub mod ports;
pub mod releases_use_case;

pub use browse_use_case::BrowseUseCase;
pub use ports::{CatalogPort, CatalogRequest};
pub use releases_use_case::ReleasesUseCase;
