//! Relay-level error types shared across the exchange client, endpoints, and client state.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Callback or direct-exchange request arrived without an authorization code.
	#[error("Request carried no authorization code.")]
	MissingCode,
	/// Token endpoint rejected the code or returned no usable access token.
	#[error("Token exchange failed: {reason}.")]
	TokenExchange {
		/// Provider- or relay-supplied reason string.
		reason: String,
	},
	/// User-info endpoint failed; no profile can be produced without it.
	#[error("Profile fetch failed: {reason}.")]
	ProfileFetch {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Provider- or relay-supplied reason string.
		reason: String,
	},
	/// Emails endpoint failed; callers swallow this and leave the email unset.
	#[error("Email lookup failed: {reason}.")]
	EmailFetch {
		/// Provider- or relay-supplied reason string.
		reason: String,
	},
	/// A profile payload failed to decode against the wire schema.
	#[error("Profile payload is malformed.")]
	MalformedPayload {
		/// Structured decode failure with the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and validation failures raised by the relay.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// A descriptor endpoint could not be converted for the OAuth client.
	#[error("Descriptor contains an invalid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL (frontend origin, redirect URI) cannot be parsed.
	#[error("The {what} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed validation.
		what: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider credentials are absent.
	#[error("GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET must be set.")]
	MissingCredentials,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
