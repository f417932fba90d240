use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde_json::json;

use crate::client::MapObjectRecord;
use crate::error::RouteError;

use super::geometry::{Coordinate, FromGeoJson, ToGeoJson};
use super::points::{InspectionPoint, LineSegment, ObjectType, PointDetails};

fn feature(geometry: geojson::Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Converts a segment into a `LineString` feature.
pub fn segment_to_feature(segment: &LineSegment) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), json!(segment.id));
    properties.insert("pipeline_id".to_string(), json!(segment.pipeline_id));
    properties.insert("from_id".to_string(), json!(segment.from_id));
    properties.insert("to_id".to_string(), json!(segment.to_id));
    properties.insert("length_km".to_string(), json!(segment.length_km()));

    feature(segment.to_geojson(), properties)
}

/// Converts an inspection point into a `Point` feature.
///
/// Display attributes are written only when present, so the output stays
/// compact for sparse records.
pub fn point_to_feature(point: &InspectionPoint) -> Feature {
    let details = &point.details;
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), json!(point.id));
    if let Some(ref pipeline_id) = point.pipeline_id {
        properties.insert("pipeline_id".to_string(), json!(pipeline_id));
    }
    if let Some(ref object_type) = point.object_type {
        properties.insert("object_type".to_string(), json!(object_type.as_str()));
    }
    properties.insert("status".to_string(), json!(details.status));
    properties.insert("criticality".to_string(), json!(details.criticality));
    properties.insert("defect_count".to_string(), json!(details.defect_count));

    let optional = [
        ("name", details.name.as_ref().map(|v| json!(v))),
        ("material", details.material.as_ref().map(|v| json!(v))),
        ("year", details.year.map(|v| json!(v))),
        ("last_check_date", details.last_check_date.as_ref().map(|v| json!(v))),
        ("method", details.method.as_ref().map(|v| json!(v))),
        ("quality_grade", details.quality_grade.as_ref().map(|v| json!(v))),
        ("ml_label", details.ml_label.as_ref().map(|v| json!(v))),
        ("max_depth", details.max_depth.map(|v| json!(v))),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            properties.insert(key.to_string(), value);
        }
    }

    feature(point.coordinate().to_geojson(), properties)
}

pub fn segments_to_feature_collection(segments: &[LineSegment]) -> FeatureCollection {
    collection(segments.iter().map(segment_to_feature).collect())
}

pub fn points_to_feature_collection(points: &[InspectionPoint]) -> FeatureCollection {
    collection(points.iter().map(point_to_feature).collect())
}

/// Builds the full map layer: point markers first, then route lines.
pub fn route_map_feature_collection(
    points: &[InspectionPoint],
    segments: &[LineSegment],
) -> FeatureCollection {
    let features = points
        .iter()
        .map(point_to_feature)
        .chain(segments.iter().map(segment_to_feature))
        .collect();
    collection(features)
}

fn string_property(properties: Option<&JsonObject>, key: &str) -> Option<String> {
    let value = properties?.get(key)?;
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads `Point` features back into inspection points.
///
/// The `id` property (or the feature id) names the point; `pipeline_id` and
/// `object_type` are read when present. Features without an id get their
/// position in the collection as id.
pub fn points_from_feature_collection(
    collection: &FeatureCollection,
) -> Result<Vec<InspectionPoint>, RouteError> {
    let mut points = Vec::with_capacity(collection.features.len());

    for (idx, feature) in collection.features.iter().enumerate() {
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| RouteError::Geometry(format!("Feature {} has no geometry", idx)))?;
        let coordinate = Coordinate::from_geojson(geometry)?;
        let properties = feature.properties.as_ref();

        let id = string_property(properties, "id")
            .or_else(|| match &feature.id {
                Some(geojson::feature::Id::String(s)) => Some(s.clone()),
                Some(geojson::feature::Id::Number(n)) => Some(n.to_string()),
                None => None,
            })
            .unwrap_or_else(|| idx.to_string());

        let mut point = InspectionPoint::new(id, coordinate.lat, coordinate.lng)
            .with_details(PointDetails {
                name: string_property(properties, "name"),
                material: string_property(properties, "material"),
                ..Default::default()
            });
        point.pipeline_id = string_property(properties, "pipeline_id");
        point.object_type = string_property(properties, "object_type")
            .map(|label| ObjectType::from(label.as_str()));

        points.push(point);
    }

    Ok(points)
}

/// Writes a feature collection as GeoJSON text.
pub fn write_geojson(collection: FeatureCollection, path: impl AsRef<Path>) -> Result<(), RouteError> {
    let text = GeoJson::from(collection).to_string();
    fs::write(path, text)?;
    Ok(())
}

/// Reads inspection points from a file.
///
/// Accepts either a GeoJSON `FeatureCollection` of points or the JSON array
/// returned by the map-objects endpoint.
pub fn read_points(path: impl AsRef<Path>) -> Result<Vec<InspectionPoint>, RouteError> {
    let text = fs::read_to_string(path)?;
    parse_points(&text)
}

fn parse_points(text: &str) -> Result<Vec<InspectionPoint>, RouteError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    if value.is_array() {
        let records: Vec<MapObjectRecord> = serde_json::from_value(value)?;
        return Ok(records.into_iter().map(InspectionPoint::from).collect());
    }

    match GeoJson::from_json_value(value) {
        Ok(GeoJson::FeatureCollection(fc)) => points_from_feature_collection(&fc),
        Ok(_) => Err(RouteError::Geometry(
            "Expected a FeatureCollection of points".to_string(),
        )),
        Err(e) => Err(RouteError::Geometry(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::route::infer_segments;
    use geojson::{GeoJson, Value as GeoJsonValue};

    fn sample_points() -> Vec<InspectionPoint> {
        vec![
            InspectionPoint::pipeline_section("1", "MT-01", 55.7558, 37.6173),
            InspectionPoint::pipeline_section("2", "MT-01", 55.7520, 37.6156),
            InspectionPoint::new("3", 55.7517, 37.6188).with_object_type(ObjectType::Crane),
        ]
    }

    #[test]
    fn test_segment_feature_properties() {
        let segments = infer_segments(&sample_points());
        let fc = segments_to_feature_collection(&segments);

        assert_eq!(fc.features.len(), 1);
        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["id"], json!("MT-01:1->2"));
        assert_eq!(props["pipeline_id"], json!("MT-01"));
        assert!(props["length_km"].as_f64().unwrap() > 0.4);
        assert!(matches!(
            fc.features[0].geometry.as_ref().unwrap().value,
            GeoJsonValue::LineString(_)
        ));
    }

    #[test]
    fn test_point_feature_skips_missing_attributes() {
        let point = InspectionPoint::pipeline_section("7", "MT-02", 55.0, 37.0).with_details(
            PointDetails {
                name: Some("Section 7".to_string()),
                year: Some(1998),
                ..Default::default()
            },
        );

        let feature = point_to_feature(&point);
        let props = feature.properties.unwrap();

        assert_eq!(props["name"], json!("Section 7"));
        assert_eq!(props["year"], json!(1998));
        assert_eq!(props["object_type"], json!("pipeline section"));
        assert_eq!(props["status"], json!("unknown"));
        assert_eq!(props["criticality"], json!("normal"));
        assert!(!props.contains_key("material"));
        assert!(!props.contains_key("max_depth"));
    }

    #[test]
    fn test_route_map_orders_points_before_lines() {
        let points = sample_points();
        let segments = infer_segments(&points);
        let fc = route_map_feature_collection(&points, &segments);

        assert_eq!(fc.features.len(), 4);
        assert!(matches!(
            fc.features[2].geometry.as_ref().unwrap().value,
            GeoJsonValue::Point(_)
        ));
        assert!(matches!(
            fc.features[3].geometry.as_ref().unwrap().value,
            GeoJsonValue::LineString(_)
        ));
    }

    #[test]
    fn test_points_survive_geojson_text() {
        let points = sample_points();
        let text = GeoJson::from(points_to_feature_collection(&points)).to_string();

        let parsed = match text.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc,
            _ => panic!("Expected FeatureCollection"),
        };
        let restored = points_from_feature_collection(&parsed).unwrap();

        assert_eq!(restored.len(), 3);
        assert_eq!(restored[0].id, "1");
        assert_eq!(restored[0].route_key(), Some("MT-01"));
        assert_eq!(restored[2].object_type, Some(ObjectType::Crane));
        assert_eq!(infer_segments(&restored), infer_segments(&points));
    }

    #[test]
    fn test_points_from_collection_rejects_lines() {
        let segments = infer_segments(&sample_points());
        let fc = segments_to_feature_collection(&segments);

        assert!(points_from_feature_collection(&fc).is_err());
    }

    #[test]
    fn test_parse_points_from_map_objects_array() {
        let text = r#"[{"id": 1, "lat": 55.0, "lon": 37.0, "pipeline_id": "MT-01",
            "status": "clean", "popup_data": {"object_name": "S1",
            "object_type": "pipeline section", "year": null, "material": null,
            "last_check_date": null}}]"#;

        let points = parse_points(text).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].route_key(), Some("MT-01"));
    }

    #[test]
    fn test_parse_points_rejects_single_feature() {
        let text = r#"{"type": "Feature", "geometry": {"type": "Point",
            "coordinates": [37.0, 55.0]}, "properties": null}"#;

        assert!(matches!(parse_points(text), Err(RouteError::Geometry(_))));
        assert!(matches!(parse_points("not json"), Err(RouteError::Json(_))));
    }

    #[test]
    fn test_points_from_collection_falls_back_to_index_id() {
        let fc = collection(vec![Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(GeoJsonValue::Point(vec![37.0, 55.0]))),
            id: None,
            properties: None,
            foreign_members: None,
        }]);

        let points = points_from_feature_collection(&fc).unwrap();
        assert_eq!(points[0].id, "0");
        assert_eq!(points[0].lat, 55.0);
        assert!(points[0].route_key().is_none());
    }
}
