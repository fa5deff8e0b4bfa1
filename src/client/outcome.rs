//! Pure classification of the current URL's query parameters into one auth outcome.

// self
use crate::{_prelude::*, auth::IdentityProfile, wire};

/// Classified result of an authentication attempt as observed from URL state.
///
/// Exactly one variant is derivable from any URL; classification is total and follows a
/// fixed precedence so coexisting parameters cannot produce an ambiguous result.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthOutcome {
	/// The relay handed back a complete profile.
	Success(IdentityProfile),
	/// The attempt failed; carries the human-readable reason.
	Failure(String),
	/// A bare authorization code reached the client; a second exchange is required.
	PendingCode(String),
	/// No auth-related parameters are present.
	None,
}

/// Classifies the URL. Precedence: success payload, then error, then bare code.
pub fn resolve_outcome(url: &Url) -> AuthOutcome {
	if query_param(url, wire::PARAM_AUTH_SUCCESS).as_deref() == Some("true")
		&& let Some(raw) = query_param(url, wire::PARAM_USER)
	{
		return match wire::decode_profile(&raw) {
			Ok(profile) => AuthOutcome::Success(profile),
			Err(_) => AuthOutcome::Failure("Failed to parse user data".into()),
		};
	}
	if let Some(error) = query_param(url, wire::PARAM_ERROR).filter(|value| !value.is_empty()) {
		let message = query_param(url, wire::PARAM_MESSAGE).filter(|value| !value.is_empty());

		return AuthOutcome::Failure(message.unwrap_or(error));
	}
	if let Some(code) = query_param(url, wire::PARAM_CODE).filter(|value| !value.is_empty()) {
		return AuthOutcome::PendingCode(code);
	}

	AuthOutcome::None
}

/// Removes every recognized auth parameter, leaving unrelated query pairs untouched.
///
/// Idempotent: scrubbing twice yields the same URL as scrubbing once.
pub fn scrub_auth_params(url: &Url) -> Url {
	let retained: Vec<(String, String)> = url
		.query_pairs()
		.filter(|(key, _)| !wire::AUTH_PARAMS.contains(&key.as_ref()))
		.map(|(key, value)| (key.into_owned(), value.into_owned()))
		.collect();
	let mut scrubbed = url.clone();

	scrubbed.set_query(None);

	if !retained.is_empty() {
		let mut pairs = scrubbed.query_pairs_mut();

		for (key, value) in &retained {
			pairs.append_pair(key, value);
		}
	}

	scrubbed
}

fn query_param(url: &Url, name: &str) -> Option<String> {
	url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
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
			name: None,
			email: Some("a@x.com".into()),
			avatar_url: "https://avatars.example.com/u/1".into(),
			html_url: "https://github.com/alice".into(),
			bio: None,
			public_repos: 0,
			followers: 0,
			following: 0,
			created_at: macros::datetime!(2020-05-01 12:00 UTC),
		}
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse successfully.")
	}

	fn success_url() -> Url {
		wire::success_redirect(&url("http://localhost:5173/"), &profile())
			.expect("Success fixture should encode onto the URL.")
	}

	#[test]
	fn success_payload_wins() {
		let resolved = resolve_outcome(&success_url());

		assert_eq!(resolved, AuthOutcome::Success(profile()));
	}

	#[test]
	fn unparsable_payload_is_a_failure() {
		let target = url("http://localhost:5173/?auth_success=true&user=%7Bnot-json");

		assert_eq!(
			resolve_outcome(&target),
			AuthOutcome::Failure("Failed to parse user data".into()),
		);
	}

	#[test]
	fn success_marker_without_payload_falls_through() {
		assert_eq!(resolve_outcome(&url("http://localhost:5173/?auth_success=true")), AuthOutcome::None);
		assert_eq!(
			resolve_outcome(&url("http://localhost:5173/?auth_success=true&code=xyz")),
			AuthOutcome::PendingCode("xyz".into()),
		);
	}

	#[test]
	fn error_prefers_the_decoded_message() {
		assert_eq!(
			resolve_outcome(&url("http://localhost:5173/?error=oauth_failed&message=token%20expired")),
			AuthOutcome::Failure("token expired".into()),
		);
		assert_eq!(
			resolve_outcome(&url("http://localhost:5173/?error=missing_code")),
			AuthOutcome::Failure("missing_code".into()),
		);
	}

	#[test]
	fn bare_code_is_pending() {
		assert_eq!(
			resolve_outcome(&url("http://localhost:5173/?code=xyz&state=abc")),
			AuthOutcome::PendingCode("xyz".into()),
		);
	}

	#[test]
	fn unrelated_urls_resolve_to_none() {
		assert_eq!(resolve_outcome(&url("http://localhost:5173/")), AuthOutcome::None);
		assert_eq!(resolve_outcome(&url("http://localhost:5173/?tab=settings")), AuthOutcome::None);
	}

	#[test]
	fn precedence_is_fixed_when_parameters_coexist() {
		// The relay never produces these combinations, but the resolver must stay total.
		let mixed = {
			let mut value = success_url();

			value
				.query_pairs_mut()
				.append_pair(wire::PARAM_ERROR, "oauth_failed")
				.append_pair(wire::PARAM_CODE, "xyz");

			value
		};

		assert_eq!(resolve_outcome(&mixed), AuthOutcome::Success(profile()));

		let error_and_code = url("http://localhost:5173/?error=oauth_failed&code=xyz");

		assert_eq!(resolve_outcome(&error_and_code), AuthOutcome::Failure("oauth_failed".into()));
	}

	#[test]
	fn scrub_removes_only_recognized_parameters() {
		let target =
			url("http://localhost:5173/app?code=xyz&state=abc&tab=settings&error=x#section");
		let scrubbed = scrub_auth_params(&target);

		assert_eq!(scrubbed.as_str(), "http://localhost:5173/app?tab=settings#section");
	}

	#[test]
	fn scrub_is_idempotent() {
		let target = url("http://localhost:5173/?auth_success=true&user=%7B%7D&tab=settings");
		let once = scrub_auth_params(&target);
		let twice = scrub_auth_params(&once);

		assert_eq!(once, twice);

		let clean = url("http://localhost:5173/");

		assert_eq!(scrub_auth_params(&clean), clean);
	}
}
