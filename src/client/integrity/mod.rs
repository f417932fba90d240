mod client;
mod record;

pub use client::IntegrityClient;
pub use record::{MapObjectRecord, MapPopupData};
