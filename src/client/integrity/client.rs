use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::client::traits::MapClient;
use crate::client::types::{FetchResult, HttpClient, MapFilters};
use crate::error::RouteError;

use super::record::MapObjectRecord;

/// Client for the Integrity OS REST API.
pub struct IntegrityClient {
    http: HttpClient,
    base_url: String,
}

impl IntegrityClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api/v1";
    pub const BASE_URL_ENV: &'static str = "INTEGRITY_API_URL";

    /// Creates a client for the default local API.
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a client from `INTEGRITY_API_URL`, falling back to the default
    /// when the variable is unset.
    pub fn from_env() -> Result<Self, RouteError> {
        match std::env::var(Self::BASE_URL_ENV) {
            Ok(url) => Self::new().with_base_url(url),
            Err(std::env::VarError::NotPresent) => Ok(Self::new()),
            Err(e) => Err(RouteError::Config(format!(
                "{} is not valid: {}",
                Self::BASE_URL_ENV,
                e
            ))),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self, RouteError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');

        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(RouteError::Config(format!(
                "API base URL must start with http:// or https://, got {:?}",
                url
            )));
        }

        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_objects_url(&self, filters: &MapFilters) -> String {
        let query = filters.to_query();
        if query.is_empty() {
            format!("{}/map-objects", self.base_url)
        } else {
            format!("{}/map-objects?{}", self.base_url, query)
        }
    }
}

/// One filter per distinct pipeline id in first-seen order, or a single
/// unfiltered request when no ids are given.
fn pipeline_filters(pipeline_ids: &[String]) -> Vec<MapFilters> {
    if pipeline_ids.is_empty() {
        return vec![MapFilters::default()];
    }

    let mut seen = HashSet::new();
    pipeline_ids
        .iter()
        .filter(|id| seen.insert(*id))
        .map(MapFilters::for_pipeline)
        .collect()
}

impl Default for IntegrityClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MapClient for IntegrityClient {
    async fn fetch_map_objects(
        &self,
        filters: &MapFilters,
    ) -> Result<Vec<MapObjectRecord>, RouteError> {
        let url = self.map_objects_url(filters);
        debug!(%url, "Fetching map objects");

        let records: Vec<MapObjectRecord> = self.http.fetch_json(&url).await?;
        Ok(records)
    }

    async fn fetch_for_pipelines(&self, pipeline_ids: &[String]) -> FetchResult<MapObjectRecord> {
        let filters = pipeline_filters(pipeline_ids);

        let futures: Vec<_> = filters
            .iter()
            .map(|filter| self.fetch_map_objects(filter))
            .collect();

        let mut result = FetchResult::new();
        for (filter, outcome) in filters.iter().zip(join_all(futures).await) {
            match outcome {
                Ok(records) => result.records.extend(records),
                Err(e) => {
                    warn!(
                        pipeline_id = filter.pipeline_id.as_deref().unwrap_or("*"),
                        error = %e,
                        "Failed to fetch map objects"
                    );
                    result.errors.push(e);
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_objects_url() {
        let client = IntegrityClient::new();
        assert_eq!(
            client.map_objects_url(&MapFilters::default()),
            "http://localhost:8000/api/v1/map-objects"
        );
        assert_eq!(
            client.map_objects_url(&MapFilters::for_pipeline("MT-02")),
            "http://localhost:8000/api/v1/map-objects?pipeline_id=MT-02"
        );
    }

    #[test]
    fn test_base_url_is_normalised() {
        let client = IntegrityClient::new()
            .with_base_url("https://integrity.example.com/api/v1/")
            .unwrap();
        assert_eq!(client.base_url(), "https://integrity.example.com/api/v1");
    }

    #[test]
    fn test_rejects_base_url_without_scheme() {
        let err = IntegrityClient::new()
            .with_base_url("integrity.example.com")
            .err()
            .unwrap();
        assert!(matches!(err, RouteError::Config(_)));
    }

    #[test]
    fn test_pipeline_filters_drop_repeated_ids() {
        let ids = vec![
            "MT-02".to_string(),
            "MT-01".to_string(),
            "MT-02".to_string(),
            "MT-01".to_string(),
        ];

        let filters = pipeline_filters(&ids);

        assert_eq!(
            filters,
            vec![
                MapFilters::for_pipeline("MT-02"),
                MapFilters::for_pipeline("MT-01"),
            ]
        );
        assert_eq!(pipeline_filters(&[]), vec![MapFilters::default()]);
    }

    #[tokio::test]
    async fn test_repeated_pipeline_is_fetched_once() {
        let client = IntegrityClient::new()
            .with_base_url("http://127.0.0.1:9")
            .unwrap();
        let ids = vec!["MT-01".to_string(), "MT-01".to_string()];

        let result = client.fetch_for_pipelines(&ids).await;

        assert_eq!(result.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_pipeline_is_reported() {
        let client = IntegrityClient::new()
            .with_base_url("http://127.0.0.1:9")
            .unwrap();
        let ids = vec!["MT-01".to_string(), "MT-02".to_string()];

        let result = client.fetch_for_pipelines(&ids).await;

        assert!(result.records.is_empty());
        assert_eq!(result.errors.len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires a running Integrity OS API"]
    async fn test_fetch_map_objects() -> Result<(), RouteError> {
        let client = IntegrityClient::from_env()?;

        let records = client.fetch_map_objects(&MapFilters::default()).await?;
        println!("Got {} map objects", records.len());

        for record in records.iter().take(5) {
            println!(
                "Object {}: {:?} ({})",
                record.id, record.pipeline_id, record.popup_data.object_type
            );
        }
        Ok(())
    }
}
