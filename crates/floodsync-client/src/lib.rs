//! # floodsync-client
//!
//! Client for the FloodSync flood-mapping backend.
//!
//! The backend does all of the imagery processing. This crate only knows
//! its HTTP contract:
//!
//! - `GET {base_url}/countries` returns the country names the backend can map
//! - `POST {base_url}/flood_map` computes a flood layer for one country and
//!   returns its extent as GeoJSON, a map tile URL template and the flooded
//!   area
//!
//! ## Errors
//!
//! Every failed call is one of three kinds:
//!
//! - [`ClientError::Transport`]: connection, DNS or timeout failure
//! - [`ClientError::Service`]: the backend answered with a failure; the
//!   status code and raw body are kept in a [`ServiceError`]
//! - [`ClientError::Decode`]: the backend answered with success but the
//!   body does not have the expected shape
//!
//! Nothing is retried.
//!
//! ## Example
//!
//! ```no_run
//! use floodsync_client::{FloodMapRequest, FloodServiceClient, LayerType};
//! use std::time::Duration;
//!
//! let client = FloodServiceClient::new("http://localhost:8000")?;
//!
//! let countries = client.list_countries()?;
//! println!("{} countries available", countries.len());
//!
//! let request = FloodMapRequest::new("Kenya")?
//!     .with_date_strings(Some("2024-01-01"), Some("2024-01-31"))?
//!     .with_layer(LayerType::Current);
//! request.validate()?;
//!
//! let map = client.generate_flood_map_with_timeout(&request, Duration::from_secs(120))?;
//! println!("Flooded area: {:.2} km²", map.area_sqkm);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod error;
mod telemetry;
mod types;

pub use client::{
    generate_flood_map, list_countries, ClientConfig, FloodServiceClient, DEFAULT_BASE_URL,
};
pub use error::{ClientError, RequestError, ServiceError};
pub use telemetry::{describe_metrics, metric_defs, Metric, MetricKind};
pub use types::{
    parse_date, CountryList, FloodMapRequest, FloodMapResult, LayerType, DATE_FORMAT,
};

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
