//! The auth state controller: one observable state machine reconciling the persisted
//! session, the URL-derived outcome, and the fallback code exchange.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	auth::IdentityProfile,
	client::{
		login::{LoginRequest, LoginSettings},
		outcome::{self, AuthOutcome},
		session::SessionStore,
	},
	error::TransportError,
};

/// Boxed future returned by [`DirectExchange`] implementations.
pub type DirectExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<IdentityProfile>> + 'a + Send>>;

/// Fallback path for bare authorization codes: exchanges them through the backend's
/// direct exchange endpoint.
pub trait DirectExchange
where
	Self: Send + Sync,
{
	/// Exchanges the code for a profile.
	fn exchange<'a>(&'a self, code: &'a str) -> DirectExchangeFuture<'a>;
}

/// Current authentication state.
///
/// `Errored` is a sub-state of unauthenticated that carries a message to display.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthPhase {
	/// No authenticated user.
	Unauthenticated,
	/// Login initiated or a code exchange is in flight.
	Authenticating,
	/// A user is authenticated.
	Authenticated(IdentityProfile),
	/// The last attempt failed; the message is shown until dismissed.
	Errored(String),
}

/// Flat snapshot view of the controller state for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthSnapshot {
	/// Whether a user is currently authenticated.
	pub is_authenticated: bool,
	/// The authenticated profile, when present.
	pub profile: Option<IdentityProfile>,
	/// Whether an exchange or login hand-off is in flight.
	pub is_loading: bool,
	/// Dismissable error message, when present.
	pub error: Option<String>,
}

/// Owns the client's visible identity state and exposes the login/logout actions.
///
/// Cooperative: initialization effects run once at construction, and only the fallback
/// exchange suspends. [`detach`](Self::detach) marks the controller torn down so a late
/// exchange resolution is never applied.
pub struct AuthController {
	store: Arc<dyn SessionStore>,
	exchange: Arc<dyn DirectExchange>,
	login: LoginSettings,
	phase: Mutex<AuthPhase>,
	detached: AtomicBool,
}
impl AuthController {
	/// Creates a controller, deriving the initial state from the persisted session.
	///
	/// Corrupted persisted data is discarded by the store and reads as absence, so the
	/// controller starts unauthenticated.
	pub fn new(
		store: Arc<dyn SessionStore>,
		exchange: Arc<dyn DirectExchange>,
		login: LoginSettings,
	) -> Self {
		let phase = match store.load() {
			Some(profile) => AuthPhase::Authenticated(profile),
			None => AuthPhase::Unauthenticated,
		};

		Self { store, exchange, login, phase: Mutex::new(phase), detached: AtomicBool::new(false) }
	}

	/// Current phase of the state machine.
	pub fn phase(&self) -> AuthPhase {
		self.phase.lock().clone()
	}

	/// Flat snapshot of the current state.
	pub fn snapshot(&self) -> AuthSnapshot {
		match self.phase() {
			AuthPhase::Unauthenticated => AuthSnapshot {
				is_authenticated: false,
				profile: None,
				is_loading: false,
				error: None,
			},
			AuthPhase::Authenticating => AuthSnapshot {
				is_authenticated: false,
				profile: None,
				is_loading: true,
				error: None,
			},
			AuthPhase::Authenticated(profile) => AuthSnapshot {
				is_authenticated: true,
				profile: Some(profile),
				is_loading: false,
				error: None,
			},
			AuthPhase::Errored(message) => AuthSnapshot {
				is_authenticated: false,
				profile: None,
				is_loading: false,
				error: Some(message),
			},
		}
	}

	/// Initiates a login attempt and returns the authorization hand-off.
	///
	/// Only available while unauthenticated (including the errored sub-state); returns
	/// `None` otherwise so an in-flight exchange cannot be doubled up.
	pub fn login(&self) -> Option<LoginRequest> {
		let mut phase = self.phase.lock();

		match *phase {
			AuthPhase::Unauthenticated | AuthPhase::Errored(_) => {
				*phase = AuthPhase::Authenticating;

				Some(self.login.begin())
			},
			_ => None,
		}
	}

	/// Processes the outcome embedded in the URL of a fresh load.
	///
	/// Always returns the scrubbed URL, computed exactly once regardless of branch, so
	/// the outcome cannot be re-processed on a later reload. A bare code triggers the
	/// fallback exchange unless a user is already authenticated.
	pub async fn handle_redirect(&self, url: &Url) -> Url {
		let resolved = outcome::resolve_outcome(url);
		let scrubbed = outcome::scrub_auth_params(url);

		match resolved {
			AuthOutcome::Success(profile) => self.complete_success(profile),
			AuthOutcome::Failure(reason) => self.apply(AuthPhase::Errored(reason)),
			AuthOutcome::PendingCode(code) => {
				if matches!(self.phase(), AuthPhase::Authenticated(_)) {
					return scrubbed;
				}

				self.apply(AuthPhase::Authenticating);

				match self.exchange.exchange(&code).await {
					Ok(profile) => self.complete_success(profile),
					Err(err) => self.apply(AuthPhase::Errored(err.to_string())),
				}
			},
			AuthOutcome::None => {},
		}

		scrubbed
	}

	/// Clears the persisted session and forces the unauthenticated state.
	pub fn logout(&self) {
		self.store.clear();
		self.apply(AuthPhase::Unauthenticated);
	}

	/// Dismisses a displayed error; no-op in every other state.
	pub fn clear_error(&self) {
		let mut phase = self.phase.lock();

		if matches!(*phase, AuthPhase::Errored(_)) {
			*phase = AuthPhase::Unauthenticated;
		}
	}

	/// Marks the controller torn down; subsequent transitions are dropped.
	pub fn detach(&self) {
		self.detached.store(true, Ordering::SeqCst);
	}

	fn complete_success(&self, profile: IdentityProfile) {
		if self.detached.load(Ordering::SeqCst) {
			return;
		}
		if let Err(err) = self.store.save(&profile) {
			tracing::warn!(error = %err, "Failed to persist the session; state updated anyway.");
		}

		*self.phase.lock() = AuthPhase::Authenticated(profile);
	}

	fn apply(&self, phase: AuthPhase) {
		if self.detached.load(Ordering::SeqCst) {
			return;
		}

		*self.phase.lock() = phase;
	}
}
impl Debug for AuthController {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthController")
			.field("phase", &self.phase.lock())
			.field("detached", &self.detached.load(Ordering::SeqCst))
			.finish()
	}
}

/// Reqwest-backed [`DirectExchange`] hitting the relay's direct exchange endpoint.
#[derive(Clone, Debug)]
pub struct HttpDirectExchange {
	endpoint: Url,
	http_client: ReqwestClient,
}
impl HttpDirectExchange {
	/// Points the fallback exchange at the given backend origin.
	pub fn new(backend: &Url) -> Result<Self> {
		let endpoint = backend.join("/api/auth/github/user").map_err(|source| {
			crate::error::ConfigError::InvalidUrl { what: "direct exchange endpoint", source }
		})?;

		Ok(Self { endpoint, http_client: ReqwestClient::new() })
	}
}

#[derive(Deserialize)]
struct ExchangeReply {
	user: IdentityProfile,
}

#[derive(Deserialize)]
struct ExchangeErrorReply {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

impl DirectExchange for HttpDirectExchange {
	fn exchange<'a>(&'a self, code: &'a str) -> DirectExchangeFuture<'a> {
		Box::pin(async move {
			let response = self
				.http_client
				.post(self.endpoint.clone())
				.json(&serde_json::json!({ "code": code }))
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status();
			let bytes = response.bytes().await.map_err(TransportError::from)?;

			if !status.is_success() {
				let reason = serde_json::from_slice::<ExchangeErrorReply>(&bytes)
					.ok()
					.and_then(|reply| reply.message.or(reply.error))
					.unwrap_or_else(|| {
						format!("exchange endpoint returned HTTP {}", status.as_u16())
					});

				return Err(Error::TokenExchange { reason });
			}

			let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
			let reply: ExchangeReply = serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|source| Error::MalformedPayload { source })?;

			Ok(reply.user)
		})
	}
}
