use serde::Deserialize;

use crate::core::{Criticality, InspectionPoint, InspectionStatus, ObjectType, PointDetails};

/// Popup attributes attached to each map object.
#[derive(Debug, Clone, Deserialize)]
pub struct MapPopupData {
    pub object_name: String,
    pub object_type: String,
    pub year: Option<i32>,
    pub material: Option<String>,
    pub last_check_date: Option<String>,
    pub method: Option<String>,
    pub quality_grade: Option<String>,
    pub ml_label: Option<String>,
    pub max_depth: Option<f64>,
    #[serde(default)]
    pub defect_count: u32,
}

/// One entry of the `GET /map-objects` response.
#[derive(Debug, Clone, Deserialize)]
pub struct MapObjectRecord {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub pipeline_id: Option<String>,
    #[serde(default)]
    pub status: InspectionStatus,
    #[serde(default)]
    pub criticality: Criticality,
    pub popup_data: MapPopupData,
}

impl From<MapObjectRecord> for InspectionPoint {
    fn from(record: MapObjectRecord) -> Self {
        let popup = record.popup_data;
        let details = PointDetails {
            name: Some(popup.object_name),
            material: popup.material,
            year: popup.year,
            status: record.status,
            criticality: record.criticality,
            last_check_date: popup.last_check_date,
            method: popup.method,
            quality_grade: popup.quality_grade,
            ml_label: popup.ml_label,
            max_depth: popup.max_depth,
            defect_count: popup.defect_count,
        };

        InspectionPoint {
            id: record.id.to_string(),
            lat: record.lat,
            lng: record.lon,
            pipeline_id: record.pipeline_id,
            object_type: Some(ObjectType::from(popup.object_type.as_str())),
            details,
        }
    }
}
