//! Provider exchange client: code-for-token exchange plus profile and email fetches.
//!
//! The three provider calls fail independently. A token-exchange failure is fatal to the
//! whole operation, a profile-fetch failure is fatal, and an email-lookup failure is
//! returned as [`Error::EmailFetch`] so the flow layer can swallow and log it.

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenType},
};
use reqwest::header;
// self
use crate::{
	_prelude::*,
	auth::{IdentityProfile, ProviderToken, TokenSecret},
	error::{ConfigError, TransportError},
	http::{RelayHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::ProviderDescriptor,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

// Requested media type for GitHub REST calls.
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Single-entry email record returned by the provider's emails endpoint.
#[derive(Clone, Debug, Deserialize)]
struct ProviderEmail {
	email: String,
	primary: bool,
}

/// Client for the provider's token and user-info endpoints; owns all provider credentials.
pub struct GithubExchangeClient {
	oauth_client: ConfiguredBasicClient,
	http_client: RelayHttpClient,
	descriptor: ProviderDescriptor,
}
impl GithubExchangeClient {
	/// Builds an exchange client from a descriptor and confidential client credentials.
	///
	/// Credentials ride in the token request body (`client_id`/`client_secret`/`code`),
	/// matching what GitHub's token endpoint expects.
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
		http_client: RelayHttpClient,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client, descriptor })
	}

	/// Exchanges an authorization code for a provider token.
	///
	/// GitHub answers OAuth failures (stale or reused codes) with a 200-status error
	/// body and omits `expires_in` entirely, so the exchange requires nothing beyond a
	/// usable `access_token`.
	pub async fn exchange_code(&self, code: &str) -> Result<ProviderToken> {
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.instrumented(slot.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&handle)
			.await
			.map_err(|err| map_token_error(slot.take(), err))?;
		let scope = response
			.scopes()
			.map(|scopes| scopes.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" "));

		Ok(ProviderToken {
			access_token: TokenSecret::new(response.access_token().secret().to_owned()),
			token_type: token_type_label(response.token_type()),
			scope,
		})
	}

	/// Fetches the user profile with the provided token.
	pub async fn fetch_profile(&self, token: &ProviderToken) -> Result<IdentityProfile> {
		let response = self
			.http_client
			.inner()
			.get(self.descriptor.endpoints.user.clone())
			.header(header::AUTHORIZATION, token.authorization_header())
			.header(header::ACCEPT, GITHUB_ACCEPT)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if !status.is_success() {
			return Err(Error::ProfileFetch {
				status: Some(status.as_u16()),
				reason: format!("user-info endpoint returned HTTP {}", status.as_u16()),
			});
		}

		let bytes = response.bytes().await.map_err(TransportError::from)?;
		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| Error::ProfileFetch {
			status: Some(status.as_u16()),
			reason: format!("user-info payload failed to decode: {source}"),
		})
	}

	/// Looks up the primary email for profiles without a public one.
	///
	/// Callers treat any [`Error::EmailFetch`] as non-fatal.
	pub async fn fetch_primary_email(&self, token: &ProviderToken) -> Result<Option<String>> {
		let response = self
			.http_client
			.inner()
			.get(self.descriptor.endpoints.user_emails.clone())
			.header(header::AUTHORIZATION, token.authorization_header())
			.header(header::ACCEPT, GITHUB_ACCEPT)
			.send()
			.await
			.map_err(|e| Error::EmailFetch { reason: e.to_string() })?;
		let status = response.status();

		if !status.is_success() {
			return Err(Error::EmailFetch {
				reason: format!("emails endpoint returned HTTP {}", status.as_u16()),
			});
		}

		let emails: Vec<ProviderEmail> = response
			.json()
			.await
			.map_err(|e| Error::EmailFetch { reason: format!("emails payload failed to decode: {e}") })?;

		Ok(emails.into_iter().find(|entry| entry.primary).map(|entry| entry.email))
	}
}
impl Debug for GithubExchangeClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GithubExchangeClient").field("descriptor", &self.descriptor).finish()
	}
}

fn token_type_label(token_type: &BasicTokenType) -> String {
	match token_type {
		BasicTokenType::Bearer => "Bearer".into(),
		BasicTokenType::Mac => "MAC".into(),
		other => {
			// Extension token types surface their raw serialized label.
			serde_json::to_value(other)
				.ok()
				.and_then(|value| value.as_str().map(ToOwned::to_owned))
				.unwrap_or_else(|| "Bearer".into())
		},
	}
}

fn map_token_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => server_response_reason(response),
		RequestTokenError::Parse(_, _) => Error::TokenExchange {
			reason: match status {
				Some(code) => format!("token response carried no usable access token (HTTP {code})"),
				None => "token response carried no usable access token".into(),
			},
		},
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Other(message) => Error::TokenExchange {
			reason: format!("token endpoint returned an unexpected response: {message}"),
		},
	}
}

fn server_response_reason(response: BasicErrorResponse) -> Error {
	let reason = match response.error_description() {
		Some(description) => description.clone(),
		None => response.error().as_ref().to_owned(),
	};

	Error::TokenExchange { reason }
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) =>
			if inner.is_builder() {
				ConfigError::from(*inner).into()
			} else {
				TransportError::from(*inner).into()
			},
		HttpClientError::Http(inner) => ConfigError::http_client_build(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => Error::TokenExchange {
			reason: format!("HTTP client error occurred while calling the token endpoint: {message}"),
		},
		_ => Error::TokenExchange {
			reason: "HTTP client error occurred while calling the token endpoint".into(),
		},
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn descriptor() -> ProviderDescriptor {
		ProviderDescriptor::github()
	}

	#[test]
	fn builds_exchange_client_from_descriptor() {
		let http_client = RelayHttpClient::new().expect("Default HTTP client should build.");
		let result = GithubExchangeClient::new(descriptor(), "client-id", "secret", http_client);

		assert!(result.is_ok());
	}

	#[test]
	fn token_type_labels_are_header_ready() {
		assert_eq!(token_type_label(&BasicTokenType::Bearer), "Bearer");
		assert_eq!(token_type_label(&BasicTokenType::Mac), "MAC");
	}

	#[test]
	fn parse_failures_map_to_token_exchange() {
		let err = map_token_error(
			Some(ResponseMetadata { status: Some(200) }),
			RequestTokenError::Other("missing access_token".into()),
		);

		assert!(matches!(err, Error::TokenExchange { .. }));
	}
}
