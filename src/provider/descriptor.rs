//! Provider descriptor data structures and validation.

// crates.io
use url::Host;
// self
use crate::_prelude::*;

/// GitHub authorization page.
pub const GITHUB_AUTHORIZATION_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
/// GitHub token endpoint.
pub const GITHUB_TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
/// GitHub user-info endpoint.
pub const GITHUB_USER_ENDPOINT: &str = "https://api.github.com/user";
/// GitHub user emails endpoint.
pub const GITHUB_USER_EMAILS_ENDPOINT: &str = "https://api.github.com/user/emails";

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required for the login hand-off.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for every exchange.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// User-info endpoint is mandatory for the profile fetch.
	#[error("Missing user-info endpoint.")]
	MissingUserEndpoint,
	/// Emails endpoint is mandatory for primary-email resolution.
	#[error("Missing user emails endpoint.")]
	MissingUserEmailsEndpoint,
	/// Non-loopback endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization page the browser is sent to for consent.
	pub authorization: Url,
	/// Token endpoint used to exchange the authorization code.
	pub token: Url,
	/// User-info endpoint queried with the access token.
	pub user: Url,
	/// Emails endpoint used when the profile carries no public email.
	pub user_emails: Url,
}

/// Immutable provider descriptor consumed by the exchange client and login builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
}
impl ProviderDescriptor {
	/// Creates a new builder with no endpoints configured.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::default()
	}

	/// Returns the descriptor for the public GitHub endpoints.
	pub fn github() -> Self {
		Self::builder()
			.authorization_endpoint(parse_known(GITHUB_AUTHORIZATION_ENDPOINT))
			.token_endpoint(parse_known(GITHUB_TOKEN_ENDPOINT))
			.user_endpoint(parse_known(GITHUB_USER_ENDPOINT))
			.user_emails_endpoint(parse_known(GITHUB_USER_EMAILS_ENDPOINT))
			.build()
			.expect("Canonical GitHub endpoints are valid.")
	}
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	/// Authorization page endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// User-info endpoint.
	pub user_endpoint: Option<Url>,
	/// Emails endpoint.
	pub user_emails_endpoint: Option<Url>,
}
impl ProviderDescriptorBuilder {
	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the user-info endpoint.
	pub fn user_endpoint(mut self, url: Url) -> Self {
		self.user_endpoint = Some(url);

		self
	}

	/// Sets the emails endpoint.
	pub fn user_emails_endpoint(mut self, url: Url) -> Self {
		self.user_emails_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let user = self.user_endpoint.ok_or(ProviderDescriptorError::MissingUserEndpoint)?;
		let user_emails =
			self.user_emails_endpoint.ok_or(ProviderDescriptorError::MissingUserEmailsEndpoint)?;
		let descriptor = ProviderDescriptor {
			endpoints: ProviderEndpoints { authorization, token, user, user_emails },
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("user-info", &self.endpoints.user)?;
		validate_endpoint("user emails", &self.endpoints.user_emails)?;

		Ok(())
	}
}

// Loopback hosts are exempt so local development setups keep working.
fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => ip.is_loopback(),
		Some(Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

fn parse_known(value: &str) -> Url {
	Url::parse(value).expect("Known endpoint literals are valid URLs.")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse successfully.")
	}

	#[test]
	fn github_preset_carries_canonical_endpoints() {
		let descriptor = ProviderDescriptor::github();

		assert_eq!(descriptor.endpoints.authorization.as_str(), GITHUB_AUTHORIZATION_ENDPOINT);
		assert_eq!(descriptor.endpoints.token.as_str(), GITHUB_TOKEN_ENDPOINT);
		assert_eq!(descriptor.endpoints.user.as_str(), GITHUB_USER_ENDPOINT);
		assert_eq!(descriptor.endpoints.user_emails.as_str(), GITHUB_USER_EMAILS_ENDPOINT);
	}

	#[test]
	fn builder_rejects_missing_endpoints() {
		let err = ProviderDescriptor::builder()
			.token_endpoint(url("https://example.com/token"))
			.build()
			.expect_err("Builder should reject a descriptor without an authorization endpoint.");

		assert!(matches!(err, ProviderDescriptorError::MissingAuthorizationEndpoint));
	}

	#[test]
	fn builder_rejects_insecure_remote_endpoints() {
		let err = ProviderDescriptor::builder()
			.authorization_endpoint(url("http://example.com/authorize"))
			.token_endpoint(url("https://example.com/token"))
			.user_endpoint(url("https://example.com/user"))
			.user_emails_endpoint(url("https://example.com/user/emails"))
			.build()
			.expect_err("Builder should reject plain-HTTP remote endpoints.");

		assert!(matches!(
			err,
			ProviderDescriptorError::InsecureEndpoint { endpoint: "authorization", .. }
		));
	}

	#[test]
	fn loopback_endpoints_may_use_plain_http() {
		let descriptor = ProviderDescriptor::builder()
			.authorization_endpoint(url("http://127.0.0.1:8080/authorize"))
			.token_endpoint(url("http://localhost:8080/token"))
			.user_endpoint(url("http://[::1]:8080/user"))
			.user_emails_endpoint(url("http://127.0.0.1:8080/user/emails"))
			.build();

		assert!(descriptor.is_ok(), "Loopback endpoints should be exempt from the HTTPS rule.");
	}
}
