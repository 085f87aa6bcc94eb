//! Asynchronous client core for the Hakuna time-tracking API.
//!
//! # Overview
//! Every remote operation passes through one pipeline: the endpoint method
//! describes the call, the composer adds authentication headers and the
//! tenant URL (plus `user_id` for personal resources while personal user
//! mode is active), a pluggable `Transport` performs the I/O and the
//! dispatcher interprets the response.
//!
//! # Design
//! - `HakunaClient` is an explicit instance; there is no global state.
//! - Endpoint methods return a `Call`, which can be awaited or given a
//!   completion callback. Both channels share one interpretation routine.
//! - DELETE calls are status-only; all other calls decode JSON and treat an
//!   embedded `error` field as a failure.
//! - Response bodies are returned as `serde_json::Value` without schema
//!   checks.
//!
//! ```no_run
//! use hakuna_core::{ClientConfig, HakunaClient, StartTimer};
//!
//! # async fn run() -> Result<(), hakuna_core::ApiError> {
//! let config = ClientConfig::builder()
//!     .auth_token("0123456789abcdef")
//!     .tenant("acme")
//!     .build()?;
//! let client = HakunaClient::with_reqwest(config)?;
//!
//! client.start_timer(&StartTimer::task(4)).await?;
//! client.get_timer().on_complete(|result| match result {
//!     Ok(timer) => println!("{timer}"),
//!     Err(err) => eprintln!("{err}"),
//! });
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod compose;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::HakunaClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use dispatch::{interpret, Call};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestDescriptor};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use types::{NewTimeEntry, StartTimer, StopTimer, TimeEntryUpdate};
