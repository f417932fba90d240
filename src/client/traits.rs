use std::future::Future;

use super::integrity::MapObjectRecord;
use super::types::{FetchResult, MapFilters};
use crate::error::RouteError;

/// Trait for clients of the inspection platform's map API.
pub trait MapClient {
    /// Fetches every map object matching `filters`.
    fn fetch_map_objects(
        &self,
        filters: &MapFilters,
    ) -> impl Future<Output = Result<Vec<MapObjectRecord>, RouteError>> + Send;

    /// Fetches the objects of several pipelines concurrently.
    ///
    /// A failed pipeline is reported in [`FetchResult::errors`] and does not
    /// discard the others.
    fn fetch_for_pipelines(
        &self,
        pipeline_ids: &[String],
    ) -> impl Future<Output = FetchResult<MapObjectRecord>> + Send;
}
