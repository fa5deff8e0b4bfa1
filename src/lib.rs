//! GitHub OAuth 2.0 authorization-code relay—exchange codes arriving over the untrusted
//! redirect channel on a trusted backend and resolve the outcome into one client-side
//! auth state.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod exchange;
pub mod http;
pub mod obs;
pub mod provider;
pub mod relay;
pub mod server;
pub mod wire;

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
use {tokio as _, tracing_subscriber as _};
#[cfg(test)] use {axum_test as _, httpmock as _};
