//! The authenticated user's identity profile.

// self
use crate::_prelude::*;

/// Identity profile assembled from the provider's user-info payload.
///
/// Field names match the provider payload one-to-one, so the same schema decodes the
/// user-info response on the backend and the URL-embedded outcome on the client.
/// Immutable for the duration of a login session; a new successful authentication
/// replaces the whole value instead of merging into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
	/// Numeric account identifier.
	pub id: u64,
	/// Login handle.
	pub login: String,
	/// Display name, when the user set one.
	#[serde(default)]
	pub name: Option<String>,
	/// Email address; public profile email or the resolved primary email.
	#[serde(default)]
	pub email: Option<String>,
	/// Avatar image URL.
	pub avatar_url: String,
	/// Public profile URL.
	pub html_url: String,
	/// Profile biography, when the user set one.
	#[serde(default)]
	pub bio: Option<String>,
	/// Public repository count.
	pub public_repos: u64,
	/// Follower count.
	pub followers: u64,
	/// Following count.
	pub following: u64,
	/// Account creation timestamp.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl IdentityProfile {
	/// Replaces the email field with the resolved value.
	pub fn with_email(mut self, email: Option<String>) -> Self {
		self.email = email;

		self
	}
}
