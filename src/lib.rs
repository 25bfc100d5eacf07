//! # Chargeprice API Client
//!
//! Asynchronous Rust client for the [Chargeprice](https://www.chargeprice.app)
//! JSON:API REST service: electric vehicles, charging stations and
//! charging tariffs.
//!
//! Calls are callback-based and cancellable: each `get_*` method
//! enqueues one request operation on a bounded-concurrency run queue and
//! returns a [`RequestHandle`] synchronously; the completion callback
//! fires at most once with either the decoded, relationship-resolved
//! domain objects or a typed [`ClientError`]. A cancelled operation
//! never invokes its callback.
//!
//! ## Example
//!
//! ```no_run
//! use chargeprice::{ChargepriceClient, Coordinate, StationFilter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ChargepriceClient::new("my-api-key");
//!
//!     let handle = client.get_charging_stations(
//!         Coordinate { latitude: 47.5, longitude: 8.4 },
//!         Coordinate { latitude: 47.0, longitude: 8.7 },
//!         StationFilter::default(),
//!         |result| match result {
//!             Ok(response) => println!("{} stations", response.stations.len()),
//!             Err(error) => eprintln!("request failed: {error}"),
//!         },
//!     );
//!
//!     // The handle can cancel the request at any point.
//!     drop(handle);
//! }
//! ```
//!
//! ## Features
//!
//! - Generic JSON:API envelope decoding with strict invariants
//! - Relationship resolution against side-loaded resources
//! - Bounded concurrency (at most 10 transfers in flight by default)
//! - Cooperative, race-free cancellation
//! - Single request attempt per call; retry policy is a caller concern

pub mod client;
pub mod codec;
pub mod document;
pub mod error;
pub mod operation;
pub mod resources;

mod endpoint;
mod resolve;

// Re-export the main types for convenience
pub use client::{ChargepriceClient, ChargepriceClientBuilder};
pub use document::ErrorObject;
pub use error::ClientError;
pub use operation::{OperationState, RequestHandle};
pub use resources::{
    ChargePoint, ChargingStation, ChargingStationResponse, Coordinate, Operator, Plug,
    StationFilter, Tariff, TariffFilter, Vehicle,
};
