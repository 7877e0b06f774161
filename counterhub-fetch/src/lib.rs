// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Counterhub` Fetch
//!
//! Network side of the harvester: talking to vendor endpoints and running
//! batches of report calls.
//!
//! ## Transport
//!
//! - [`transport::Transport`] - Trait for issuing one GET request
//! - [`http::HttpClient`] - `reqwest`-backed transport
//!
//! ## Report Calls
//!
//! - [`query`] - Discovery and retrieval URL building
//! - [`attempt::AttemptPolicy`] - Attempt count, timeout race and 429 backoff
//! - [`validator::ResponseValidator`] - Classifies one attempt result
//! - [`client::ReportClient`] - Discovery and retrieval
//!
//! ## Batches
//!
//! - [`orchestrator::FetchOrchestrator`] - Runs a batch across vendors
//!
//! ## Example
//!
//! ```ignore
//! use counterhub_fetch::{
//!     CancellationToken, FetchOrchestrator, HarvestRequest, HttpClient, ReportClient,
//! };
//! use std::sync::Arc;
//!
//! let client = ReportClient::new(HttpClient::new()?);
//! let orchestrator = FetchOrchestrator::builder(client, Arc::new(file_writer))
//!     .settings(Arc::new(settings_store))
//!     .output_root(output_dir)
//!     .build();
//!
//! let outcome = orchestrator.run(&request, &CancellationToken::new()).await;
//! println!("{} failed", outcome.summary.failed());
//! ```

pub mod attempt;
pub mod client;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod query;
pub mod transport;
pub mod validator;

// Errors
pub use error::FetchError;

// Transport
pub use http::HttpClient;
pub use transport::{AttemptOutcome, RawResponse, Transport};

// Report calls
pub use attempt::AttemptPolicy;
pub use client::ReportClient;
pub use validator::{Classification, ResponseValidator};

// Batches
pub use orchestrator::{FetchOrchestrator, FetchOrchestratorBuilder, HarvestOutcome, HarvestRequest};

// Cancellation signal accepted by the orchestrator
pub use tokio_util::sync::CancellationToken;
