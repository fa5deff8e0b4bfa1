//! URL-embedded outcome wire format shared by the relay and the client resolver.
//!
//! The redirect query is a serialization boundary: the relay encodes exactly one outcome
//! into the recognized parameters below, and the client decodes it against the same
//! [`IdentityProfile`] schema before trusting the payload. Both halves live here so the
//! contract cannot drift apart.

// self
use crate::{_prelude::*, auth::IdentityProfile};

/// Marker parameter set to `true` on a successful outcome.
pub const PARAM_AUTH_SUCCESS: &str = "auth_success";
/// Percent-encoded JSON profile payload accompanying a successful outcome.
pub const PARAM_USER: &str = "user";
/// Machine-readable error code for failed outcomes.
pub const PARAM_ERROR: &str = "error";
/// Human-readable error detail accompanying `error`, when available.
pub const PARAM_MESSAGE: &str = "message";
/// Bare authorization code (provider redirect reached the client directly).
pub const PARAM_CODE: &str = "code";
/// Opaque state parameter round-tripped through the provider.
pub const PARAM_STATE: &str = "state";

/// Every parameter the client recognizes and scrubs after processing.
pub const AUTH_PARAMS: [&str; 6] =
	[PARAM_AUTH_SUCCESS, PARAM_USER, PARAM_ERROR, PARAM_MESSAGE, PARAM_CODE, PARAM_STATE];

/// Error code emitted when the callback carries no authorization code.
pub const ERROR_MISSING_CODE: &str = "missing_code";
/// Error code emitted when the token endpoint produced no usable access token.
pub const ERROR_TOKEN_EXCHANGE_FAILED: &str = "token_exchange_failed";
/// Error code emitted for every other failure during the relay flow.
pub const ERROR_OAUTH_FAILED: &str = "oauth_failed";

/// Encodes a successful outcome onto the frontend URL.
pub fn success_redirect(
	frontend: &Url,
	profile: &IdentityProfile,
) -> Result<Url, serde_json::Error> {
	let payload = serde_json::to_string(profile)?;
	let mut url = frontend.clone();

	url.query_pairs_mut()
		.append_pair(PARAM_AUTH_SUCCESS, "true")
		.append_pair(PARAM_USER, &payload);

	Ok(url)
}

/// Encodes a failure outcome onto the frontend URL.
pub fn error_redirect(frontend: &Url, error: &str, message: Option<&str>) -> Url {
	let mut url = frontend.clone();

	{
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair(PARAM_ERROR, error);

		if let Some(message) = message {
			pairs.append_pair(PARAM_MESSAGE, message);
		}
	}

	url
}

/// Decodes a percent-decoded profile payload against the wire schema.
pub fn decode_profile(raw: &str) -> Result<IdentityProfile> {
	let mut deserializer = serde_json::Deserializer::from_str(raw);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::MalformedPayload { source })
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn profile() -> IdentityProfile {
		IdentityProfile {
			id: 1,
			login: "alice".into(),
			name: Some("Alice Liddell".into()),
			email: Some("a@x.com".into()),
			avatar_url: "https://avatars.example.com/u/1".into(),
			html_url: "https://github.com/alice".into(),
			bio: None,
			public_repos: 3,
			followers: 10,
			following: 2,
			created_at: macros::datetime!(2020-05-01 12:00 UTC),
		}
	}

	#[test]
	fn success_redirect_round_trips_the_profile() {
		let frontend =
			Url::parse("http://localhost:5173").expect("Frontend URL should parse successfully.");
		let url = success_redirect(&frontend, &profile())
			.expect("Profile should encode onto the redirect URL.");
		let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
		let user_payload = pairs
			.iter()
			.find(|(key, _)| key == PARAM_USER)
			.map(|(_, value)| value.clone())
			.expect("Redirect should carry a user parameter.");

		assert!(pairs.iter().any(|(key, value)| key == PARAM_AUTH_SUCCESS && value == "true"));

		let decoded =
			decode_profile(&user_payload).expect("Encoded payload should decode back to a profile.");

		assert_eq!(decoded, profile());
	}

	#[test]
	fn error_redirect_carries_code_and_optional_message() {
		let frontend =
			Url::parse("http://localhost:5173").expect("Frontend URL should parse successfully.");
		let bare = error_redirect(&frontend, ERROR_MISSING_CODE, None);

		assert_eq!(bare.query(), Some("error=missing_code"));

		let detailed = error_redirect(&frontend, ERROR_OAUTH_FAILED, Some("connection reset"));
		let pairs: Vec<(String, String)> = detailed.query_pairs().into_owned().collect();

		assert!(pairs.contains(&(PARAM_ERROR.into(), ERROR_OAUTH_FAILED.into())));
		assert!(pairs.contains(&(PARAM_MESSAGE.into(), "connection reset".into())));
	}

	#[test]
	fn malformed_payloads_are_rejected() {
		assert!(matches!(decode_profile("{not json"), Err(Error::MalformedPayload { .. })));
		assert!(matches!(decode_profile("{\"id\":1}"), Err(Error::MalformedPayload { .. })));
	}
}
