//! Callback relay orchestration: one explicit state machine per incoming request.
//!
//! Each request walks the typed stage sequence exchange-code → fetch-profile →
//! resolve-email and converges on exactly one outcome. The relay never lets a provider
//! failure escape as a raw error; callers receive either a profile or a redirect URL
//! carrying an encoded failure.

// self
use crate::{
	_prelude::*,
	auth::{IdentityProfile, ProviderToken},
	exchange::GithubExchangeClient,
	http::RelayHttpClient,
	obs::{FlowKind, FlowOutcome, FlowSpan, record_flow_outcome},
	provider::ProviderDescriptor,
	wire,
};

const STAGE_EXCHANGE: &str = "exchange_code";
const STAGE_PROFILE: &str = "fetch_profile";
const STAGE_EMAIL: &str = "resolve_email";

/// Explicitly constructed relay configuration.
///
/// Core logic receives this value at construction time; nothing reads environment state
/// past the binary edge.
#[derive(Clone)]
pub struct RelayConfig {
	/// Provider endpoint descriptor.
	pub descriptor: ProviderDescriptor,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Confidential client secret.
	pub client_secret: String,
	/// Frontend origin that receives outcome redirects.
	pub frontend: Url,
}
impl Debug for RelayConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RelayConfig")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("frontend", &self.frontend)
			.finish()
	}
}

/// Bridges the provider's redirect back to the client via a second redirect.
pub struct CallbackRelay {
	exchange: GithubExchangeClient,
	frontend: Url,
}
impl CallbackRelay {
	/// Creates a relay with its own default HTTP transport.
	pub fn new(config: RelayConfig) -> Result<Self> {
		let http_client = RelayHttpClient::new()?;

		Self::with_http_client(config, http_client)
	}

	/// Creates a relay that reuses the caller-provided transport.
	pub fn with_http_client(config: RelayConfig, http_client: RelayHttpClient) -> Result<Self> {
		let exchange = GithubExchangeClient::new(
			config.descriptor,
			&config.client_id,
			&config.client_secret,
			http_client,
		)?;

		Ok(Self { exchange, frontend: config.frontend })
	}

	/// Frontend origin that outcome redirects target.
	pub fn frontend(&self) -> &Url {
		&self.frontend
	}

	/// Handles a provider callback and always produces a redirect URL.
	///
	/// The `state` parameter is logged but not verified against an issued nonce; the gap
	/// is documented rather than silently fixed.
	pub async fn handle_callback(&self, code: Option<&str>, state: Option<&str>) -> Url {
		tracing::info!(
			state = state.unwrap_or("-"),
			code_present = code.is_some_and(|value| !value.is_empty()),
			"Received provider callback.",
		);

		let Some(code) = code.filter(|value| !value.is_empty()) else {
			tracing::error!("Callback arrived without an authorization code.");

			return wire::error_redirect(&self.frontend, wire::ERROR_MISSING_CODE, None);
		};

		match self.resolve_profile(FlowKind::CallbackRelay, code).await {
			Ok(profile) => {
				tracing::info!(login = %profile.login, "Redirecting to the frontend with a profile.");

				wire::success_redirect(&self.frontend, &profile).unwrap_or_else(|e| {
					wire::error_redirect(
						&self.frontend,
						wire::ERROR_OAUTH_FAILED,
						Some(&e.to_string()),
					)
				})
			},
			Err(Error::TokenExchange { reason }) => {
				tracing::error!(%reason, "Token exchange produced no usable access token.");

				wire::error_redirect(&self.frontend, wire::ERROR_TOKEN_EXCHANGE_FAILED, None)
			},
			Err(err) => {
				tracing::error!(error = %err, "Relay flow failed.");

				wire::error_redirect(&self.frontend, wire::ERROR_OAUTH_FAILED, Some(&err.to_string()))
			},
		}
	}

	/// Runs the full exchange flow for a bare authorization code.
	///
	/// Shared by the callback relay and the direct exchange endpoint; the caller decides
	/// how failures are rendered (redirect vs structured JSON).
	pub async fn resolve_profile(&self, kind: FlowKind, code: &str) -> Result<IdentityProfile> {
		record_flow_outcome(kind, FlowOutcome::Attempt);

		let flow = ExchangeFlow { exchange: &self.exchange, kind };
		let result = flow.run(code).await;

		match &result {
			Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
			Err(_) => record_flow_outcome(kind, FlowOutcome::Failure),
		}

		result
	}
}
impl Debug for CallbackRelay {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallbackRelay")
			.field("exchange", &self.exchange)
			.field("frontend", &self.frontend)
			.finish()
	}
}

/// Per-request state machine walking the typed stage sequence.
struct ExchangeFlow<'a> {
	exchange: &'a GithubExchangeClient,
	kind: FlowKind,
}
impl ExchangeFlow<'_> {
	async fn run(self, code: &str) -> Result<IdentityProfile> {
		let acquired = self.exchange_stage(code).await?;
		let fetched = self.profile_stage(acquired).await?;

		Ok(self.email_stage(fetched).await)
	}

	async fn exchange_stage(&self, code: &str) -> Result<TokenAcquired> {
		let span = FlowSpan::new(self.kind, STAGE_EXCHANGE);
		let token = span.instrument(self.exchange.exchange_code(code)).await?;

		tracing::debug!(scope = token.scope.as_deref().unwrap_or("-"), "Acquired an access token.");

		Ok(TokenAcquired { token })
	}

	async fn profile_stage(&self, acquired: TokenAcquired) -> Result<ProfileFetched> {
		let TokenAcquired { token } = acquired;
		let span = FlowSpan::new(self.kind, STAGE_PROFILE);
		let profile = span.instrument(self.exchange.fetch_profile(&token)).await?;

		tracing::debug!(login = %profile.login, "Fetched the user profile.");

		Ok(ProfileFetched { token, profile })
	}

	// The only non-fatal stage: lookup failures are logged and the email stays unset.
	async fn email_stage(&self, fetched: ProfileFetched) -> IdentityProfile {
		let ProfileFetched { token, profile } = fetched;

		if profile.email.is_some() {
			return profile;
		}

		let span = FlowSpan::new(self.kind, STAGE_EMAIL);

		match span.instrument(self.exchange.fetch_primary_email(&token)).await {
			Ok(email) => profile.with_email(email),
			Err(err) => {
				tracing::warn!(error = %err, "Email lookup failed; leaving the email unset.");

				profile
			},
		}
	}
}

/// Outcome of the exchange stage: a live provider token.
struct TokenAcquired {
	token: ProviderToken,
}

/// Outcome of the profile stage: the token plus the profile it authorized.
struct ProfileFetched {
	token: ProviderToken,
	profile: IdentityProfile,
}
