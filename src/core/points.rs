use serde::{Deserialize, Serialize};

use super::geometry::Coordinate;

/// Object type label carried by the inspection platform.
///
/// Only [`ObjectType::PipelineSection`] takes part in route inference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Crane,
    Compressor,
    PipelineSection,
    Other(String),
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Crane => "crane",
            ObjectType::Compressor => "compressor",
            ObjectType::PipelineSection => "pipeline section",
            ObjectType::Other(label) => label,
        }
    }

    pub fn is_pipeline_section(&self) -> bool {
        matches!(self, ObjectType::PipelineSection)
    }
}

impl From<&str> for ObjectType {
    fn from(label: &str) -> Self {
        match label {
            "crane" => ObjectType::Crane,
            "compressor" => ObjectType::Compressor,
            "pipeline section" => ObjectType::PipelineSection,
            other => ObjectType::Other(other.to_string()),
        }
    }
}

/// Result of the latest inspection of an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionStatus {
    #[default]
    Unknown,
    Clean,
    Defect,
}

/// Severity classification assigned by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    #[default]
    Normal,
    Medium,
    High,
}

/// Display-only attributes. None of these influence route inference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointDetails {
    pub name: Option<String>,
    pub material: Option<String>,
    pub year: Option<i32>,
    pub status: InspectionStatus,
    pub criticality: Criticality,
    pub last_check_date: Option<String>,
    pub method: Option<String>,
    pub quality_grade: Option<String>,
    pub ml_label: Option<String>,
    pub max_depth: Option<f64>,
    pub defect_count: u32,
}

/// A geo-tagged inspection point as shown on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionPoint {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub pipeline_id: Option<String>,
    pub object_type: Option<ObjectType>,
    pub details: PointDetails,
}

impl InspectionPoint {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            pipeline_id: None,
            object_type: None,
            details: PointDetails::default(),
        }
    }

    /// Shorthand for a point marked as a pipeline section of `pipeline_id`.
    pub fn pipeline_section(
        id: impl Into<String>,
        pipeline_id: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self::new(id, lat, lng)
            .with_pipeline_id(pipeline_id)
            .with_object_type(ObjectType::PipelineSection)
    }

    pub fn with_pipeline_id(mut self, pipeline_id: impl Into<String>) -> Self {
        self.pipeline_id = Some(pipeline_id.into());
        self
    }

    pub fn with_object_type(mut self, object_type: ObjectType) -> Self {
        self.object_type = Some(object_type);
        self
    }

    pub fn with_details(mut self, details: PointDetails) -> Self {
        self.details = details;
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn has_finite_coordinates(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Pipeline id, if this point takes part in route inference.
    pub fn route_key(&self) -> Option<&str> {
        match &self.object_type {
            Some(object_type) if object_type.is_pipeline_section() => self.pipeline_id.as_deref(),
            _ => None,
        }
    }
}

/// A line drawn between two pipeline sections of the same pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    pub id: String,
    pub pipeline_id: String,
    pub from_id: String,
    pub to_id: String,
    pub from: Coordinate,
    pub to: Coordinate,
}

impl LineSegment {
    pub fn between(pipeline_id: &str, from: &InspectionPoint, to: &InspectionPoint) -> Self {
        Self {
            id: segment_id(pipeline_id, &from.id, &to.id),
            pipeline_id: pipeline_id.to_string(),
            from_id: from.id.clone(),
            to_id: to.id.clone(),
            from: from.coordinate(),
            to: to.coordinate(),
        }
    }

    pub fn length_km(&self) -> f64 {
        self.from.haversine_km(&self.to)
    }

    /// True if this segment joins `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }
}

fn segment_id(pipeline_id: &str, from_id: &str, to_id: &str) -> String {
    format!("{}:{}->{}", pipeline_id, from_id, to_id)
}
