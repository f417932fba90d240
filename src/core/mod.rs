mod export;
mod geometry;
mod points;
mod route;

pub use export::{
    point_to_feature, points_from_feature_collection, points_to_feature_collection, read_points,
    route_map_feature_collection, segment_to_feature, segments_to_feature_collection,
    write_geojson,
};
pub use geometry::{Coordinate, EARTH_RADIUS_KM, FromGeoJson, ToGeoJson, haversine_km};
pub use points::{
    Criticality, InspectionPoint, InspectionStatus, LineSegment, ObjectType, PointDetails,
};
pub use route::{
    ReusePolicy, RouteConfig, RouteGroup, RouteSet, infer_routes, infer_segments,
};
