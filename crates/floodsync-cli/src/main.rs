//! `floodsync`: query a FloodSync backend from the command line.
//!
//! Results are printed to stdout as JSON; logs go to stderr and are
//! controlled with `RUST_LOG`.

mod args;

use args::{Cli, Command, FloodMapArgs};
use clap::Parser;
use floodsync_client::{
    ClientConfig, ClientError, FloodMapRequest, FloodMapResult, FloodServiceClient, RequestError,
};
use std::error::Error as _;
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Errors that end a CLI run.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("Failed to format output: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            if let CliError::Client(ClientError::Service(service)) = &e {
                if let Some(detail) = service.detail() {
                    eprintln!("  backend said: {}", detail);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::new(&cli.base_url);
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let client = FloodServiceClient::from_config(config)?;
    info!(base_url = client.base_url(), "Using backend");

    match cli.command {
        Command::Countries => {
            let countries = client.list_countries()?;
            info!(count = countries.len(), "Fetched countries");
            println!("{}", serde_json::to_string_pretty(&countries)?);
        }
        Command::FloodMap(args) => {
            let request = build_request(&args)?;
            let map = client.generate_flood_map(&request)?;
            info!(
                country = %request.country,
                layer = %request.layer_type,
                area_sqkm = map.area_sqkm,
                "Generated flood map"
            );
            let output = if args.summary {
                summary(&request, &map)
            } else {
                serde_json::to_value(&map)?
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Build and check the request before anything is sent.
fn build_request(args: &FloodMapArgs) -> Result<FloodMapRequest, RequestError> {
    let request = FloodMapRequest::new(args.country.as_str())?
        .with_dates(args.start, args.end)
        .with_layer(args.layer);
    request.validate()?;
    Ok(request)
}

fn summary(request: &FloodMapRequest, map: &FloodMapResult) -> serde_json::Value {
    serde_json::json!({
        "country": request.country,
        "layer": map.layer.unwrap_or(request.layer_type),
        "area_sqkm": map.area_sqkm,
        "features": map.feature_count(),
        "tile_url": map.tile_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use floodsync_client::LayerType;

    fn args(country: &str, start: Option<&str>, end: Option<&str>) -> FloodMapArgs {
        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        FloodMapArgs {
            country: country.to_string(),
            start: start.map(date),
            end: end.map(date),
            layer: LayerType::Historical,
            summary: false,
        }
    }

    #[test]
    fn test_build_request() {
        let request = build_request(&args("Kenya", Some("2024-01-01"), Some("2024-01-31"))).unwrap();
        assert_eq!(request.country, "Kenya");
        assert_eq!(request.layer_type, LayerType::Historical);
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_build_request_rejects_inverted_window() {
        let err = build_request(&args("Kenya", Some("2024-03-01"), Some("2024-01-31"))).unwrap_err();
        assert!(matches!(err, RequestError::DateOrder { .. }));
    }

    #[test]
    fn test_build_request_rejects_empty_country() {
        let err = build_request(&args(" ", None, None)).unwrap_err();
        assert_eq!(err, RequestError::EmptyCountry);
    }

    #[test]
    fn test_summary() {
        let request = build_request(&args("Kenya", None, None)).unwrap();
        let map = FloodMapResult {
            geojson: serde_json::json!({"type": "FeatureCollection", "features": []}),
            tile_url: "https://x/{z}/{x}/{y}.png".to_string(),
            area_sqkm: 12.5,
            layer: None,
        };
        let value = summary(&request, &map);
        assert_eq!(value["layer"], "historical");
        assert_eq!(value["area_sqkm"], 12.5);
        assert_eq!(value["features"], 0);
        assert_eq!(value["tile_url"], "https://x/{z}/{x}/{y}.png");
    }
}
