//! Provider token material kept strictly on the trusted backend.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
///
/// Deliberately implements neither [`Serialize`] nor [`Deserialize`]: the access token
/// must never be persisted or forwarded to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Access token response produced by the provider's token endpoint.
///
/// Lives for a single request cycle: minted by the code exchange, used for the profile
/// and email fetches, then dropped.
#[derive(Clone, Debug)]
pub struct ProviderToken {
	/// Access token secret; never serialized, never logged.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (`bearer` for GitHub).
	pub token_type: String,
	/// Scopes granted to the token, when the provider reports them.
	pub scope: Option<String>,
}
impl ProviderToken {
	/// Builds the `Authorization` header value from the token type and secret.
	pub fn authorization_header(&self) -> String {
		format!("{} {}", self.token_type, self.access_token.expose())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn authorization_header_joins_type_and_secret() {
		let token = ProviderToken {
			access_token: TokenSecret::new("abc"),
			token_type: "bearer".into(),
			scope: Some("user:email".into()),
		};

		assert_eq!(token.authorization_header(), "bearer abc");
	}
}
