use std::path::PathBuf;

use clap::Parser;
use pipeline_route_rs::{
    InspectionPoint, IntegrityClient, MapClient, ReusePolicy, RouteConfig, RouteError,
    infer_routes, read_points, route_map_feature_collection, write_geojson,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Infer pipeline routes from inspection points and write them as GeoJSON.
#[derive(Parser)]
#[command(name = "pipeline-route")]
#[command(version)]
struct Cli {
    /// Base URL of the Integrity OS API
    #[arg(long, env = "INTEGRITY_API_URL", default_value = IntegrityClient::DEFAULT_BASE_URL)]
    api_url: String,

    /// Only fetch these pipelines (repeatable)
    #[arg(short, long = "pipeline", value_name = "ID")]
    pipelines: Vec<String>,

    /// Read points from a GeoJSON or map-objects JSON file instead of the API
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Where to write the route map
    #[arg(short, long, default_value = "routes.geojson")]
    output: PathBuf,

    /// Let already-connected points be picked again as nearest neighbours
    #[arg(long)]
    allow_reuse: bool,

    /// Link pipelines on all cores
    #[arg(long)]
    parallel: bool,
}

async fn load_points(cli: &Cli) -> Result<Vec<InspectionPoint>, RouteError> {
    if let Some(path) = &cli.input {
        info!(path = %path.display(), "Reading points from file");
        return read_points(path);
    }

    let client = IntegrityClient::new().with_base_url(&cli.api_url)?;
    info!(api = client.base_url(), "Fetching map objects");

    let result = client.fetch_for_pipelines(&cli.pipelines).await;
    if result.has_errors() {
        warn!("{} fetch errors occurred", result.errors.len());
        if result.records.is_empty() {
            if let Some(e) = result.errors.into_iter().next() {
                return Err(e);
            }
        }
    }

    Ok(result.records.into_iter().map(InspectionPoint::from).collect())
}

#[tokio::main]
async fn main() -> Result<(), RouteError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cli = Cli::parse();

    let points = load_points(&cli).await?;
    info!("Got {} points", points.len());

    let reuse = if cli.allow_reuse {
        ReusePolicy::AllowReuse
    } else {
        ReusePolicy::Exclusive
    };
    let config = RouteConfig::default()
        .with_reuse(reuse)
        .with_parallel(cli.parallel);

    let routes = infer_routes(&points, &config);
    for group in &routes.groups {
        info!(
            pipeline_id = %group.pipeline_id,
            points = group.point_count,
            segments = group.segment_count,
            length_km = group.total_length_km,
            "Pipeline route"
        );
    }
    if !routes.rejected.is_empty() {
        warn!(
            "{} points skipped for invalid coordinates",
            routes.rejected.len()
        );
    }

    write_geojson(
        route_map_feature_collection(&points, &routes.segments),
        &cli.output,
    )?;
    info!(
        "Wrote {} segments to {}",
        routes.segments.len(),
        cli.output.display()
    );

    Ok(())
}
