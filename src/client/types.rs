use serde::de::DeserializeOwned;

use crate::error::RouteError;

/// Records gathered from several requests, with the errors of the ones that failed.
#[derive(Debug)]
pub struct FetchResult<T> {
    pub records: Vec<T>,
    pub errors: Vec<RouteError>,
}

impl<T> FetchResult<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<T> Default for FetchResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RouteError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(RouteError::Api(format!(
                "API returned status {} for {}",
                response.status(),
                url
            )));
        }

        let data: T = response.json().await?;
        Ok(data)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Query filters accepted by the map-objects endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFilters {
    pub pipeline_id: Option<String>,
    pub method: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub param_min: Option<f64>,
    pub param_max: Option<f64>,
}

impl MapFilters {
    pub fn for_pipeline(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: Some(pipeline_id.into()),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_date_range(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_param_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.param_min = min;
        self.param_max = max;
        self
    }

    /// Url-encoded query string with only the filters that are set.
    pub fn to_query(&self) -> String {
        let param_min = self.param_min.map(|v| v.to_string());
        let param_max = self.param_max.map(|v| v.to_string());

        let pairs = [
            ("pipeline_id", self.pipeline_id.as_deref()),
            ("method", self.method.as_deref()),
            ("date_from", self.date_from.as_deref()),
            ("date_to", self.date_to.as_deref()),
            ("param_min", param_min.as_deref()),
            ("param_max", param_max.as_deref()),
        ];

        pairs
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, urlencoding::encode(v))))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_produce_empty_query() {
        assert_eq!(MapFilters::default().to_query(), "");
    }

    #[test]
    fn test_filters_are_encoded_in_order() {
        let filters = MapFilters::for_pipeline("MT 01")
            .with_method("VIK")
            .with_date_range(Some("2023-01-01".to_string()), None)
            .with_param_range(Some(1.0), Some(2.5));

        assert_eq!(
            filters.to_query(),
            "pipeline_id=MT%2001&method=VIK&date_from=2023-01-01&param_min=1&param_max=2.5"
        );
    }

    #[test]
    fn test_fetch_result_flags() {
        let mut result: FetchResult<i32> = FetchResult::new();
        assert!(result.is_complete());

        result.errors.push(RouteError::Api("boom".to_string()));
        assert!(result.has_errors());
        assert!(!result.is_complete());
    }
}
