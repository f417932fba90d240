pub mod integrity;
pub mod traits;
pub mod types;

pub use integrity::{IntegrityClient, MapObjectRecord, MapPopupData};
pub use traits::MapClient;
pub use types::{FetchResult, HttpClient, MapFilters};
