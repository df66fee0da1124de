//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use floodsync_client::{parse_date, LayerType, DEFAULT_BASE_URL};

#[derive(Parser, Debug, Clone)]
#[command(name = "floodsync", version, about = "Query a FloodSync flood-mapping backend")]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "FLOODSYNC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds before a request is abandoned (no limit if unset)
    #[arg(long, env = "FLOODSYNC_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the countries the backend can map
    Countries,

    /// Generate a flood map for one country
    FloodMap(FloodMapArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FloodMapArgs {
    /// Country name, as listed by `countries`
    #[arg(short, long)]
    pub country: String,

    /// First day of the imagery window (YYYY-MM-DD)
    #[arg(long, value_parser = parse_start)]
    pub start: Option<NaiveDate>,

    /// Last day of the imagery window (YYYY-MM-DD)
    #[arg(long, value_parser = parse_end)]
    pub end: Option<NaiveDate>,

    /// Layer to compute: current, historical or risk
    #[arg(short, long, default_value_t = LayerType::Current)]
    pub layer: LayerType,

    /// Print layer, area and tile URL instead of the full result
    #[arg(long)]
    pub summary: bool,
}

fn parse_start(s: &str) -> Result<NaiveDate, String> {
    parse_date("start_date", s).map_err(|e| e.to_string())
}

fn parse_end(s: &str) -> Result<NaiveDate, String> {
    parse_date("end_date", s).map_err(|e| e.to_string())
}
