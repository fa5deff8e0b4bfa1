//! Login hand-off: construction of the provider's authorization URL.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, provider::ProviderDescriptor};

const STATE_LEN: usize = 32;

/// Scopes requested for profile and email access.
pub const DEFAULT_SCOPE: &str = "user:email read:user";

/// Injected configuration for building authorization URLs.
#[derive(Clone, Debug)]
pub struct LoginSettings {
	/// Provider endpoint descriptor.
	pub descriptor: ProviderDescriptor,
	/// OAuth 2.0 client identifier (public).
	pub client_id: String,
	/// Relay callback the provider redirects back to.
	pub redirect_uri: Url,
	/// Requested scope string.
	pub scope: String,
}
impl LoginSettings {
	/// Starts a login attempt with a freshly generated `state` value.
	pub fn begin(&self) -> LoginRequest {
		let state = random_string(STATE_LEN);
		let authorize_url = build_authorize_url(self, &state);

		LoginRequest { authorize_url, state }
	}
}

/// Authorization hand-off metadata returned by [`LoginSettings::begin`].
///
/// The caller navigates the browser to `authorize_url`; the transition is irreversible
/// within this process, and the next state change happens on a fresh load.
#[derive(Clone, Debug)]
pub struct LoginRequest {
	/// Fully-formed authorization URL to send the end-user to.
	pub authorize_url: Url,
	/// Opaque state value that rides along the redirect round-trip.
	pub state: String,
}

fn build_authorize_url(settings: &LoginSettings, state: &str) -> Url {
	let mut url = settings.descriptor.endpoints.authorization.clone();

	{
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("client_id", &settings.client_id);
		pairs.append_pair("redirect_uri", settings.redirect_uri.as_str());
		pairs.append_pair("scope", &settings.scope);
		pairs.append_pair("state", state);
	}

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn settings() -> LoginSettings {
		LoginSettings {
			descriptor: ProviderDescriptor::github(),
			client_id: "client-id".into(),
			redirect_uri: Url::parse("http://localhost:3000/api/auth/github/callback")
				.expect("Redirect URI fixture should parse successfully."),
			scope: DEFAULT_SCOPE.into(),
		}
	}

	#[test]
	fn authorize_url_carries_every_parameter() {
		let request = settings().begin();
		let pairs: HashMap<_, _> = request.authorize_url.query_pairs().into_owned().collect();

		assert!(request.authorize_url.as_str().starts_with("https://github.com/login/oauth/authorize"));
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("client-id"));
		assert_eq!(
			pairs.get("redirect_uri").map(String::as_str),
			Some("http://localhost:3000/api/auth/github/callback"),
		);
		assert_eq!(pairs.get("scope").map(String::as_str), Some(DEFAULT_SCOPE));
		assert_eq!(pairs.get("state").map(String::as_str), Some(request.state.as_str()));
	}

	#[test]
	fn state_is_fresh_and_alphanumeric() {
		let settings = settings();
		let first = settings.begin();
		let second = settings.begin();

		assert_eq!(first.state.len(), STATE_LEN);
		assert!(first.state.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(first.state, second.state, "Each attempt should mint a fresh state value.");
	}
}
