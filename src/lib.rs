pub mod client;
pub mod core;
pub mod error;

pub use client::{FetchResult, IntegrityClient, MapClient, MapFilters, MapObjectRecord};
pub use core::{
    Coordinate, Criticality, FromGeoJson, InspectionPoint, InspectionStatus, LineSegment,
    ObjectType, PointDetails, ReusePolicy, RouteConfig, RouteGroup, RouteSet, ToGeoJson,
    haversine_km, infer_routes, infer_segments, points_to_feature_collection, read_points,
    route_map_feature_collection, segments_to_feature_collection, write_geojson,
};
pub use error::RouteError;
