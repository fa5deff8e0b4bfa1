//! Client-side persistence of the authenticated profile across reloads.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{_prelude::*, auth::IdentityProfile};

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SessionStoreError {
	/// Serialization failure surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Durable, origin-scoped persistence for the authenticated profile.
///
/// `load` never raises: a missing entry and an unreadable one are both absence, and an
/// unreadable entry is proactively cleared so the corruption cannot resurface.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the stored profile.
	fn save(&self, profile: &IdentityProfile) -> Result<(), SessionStoreError>;

	/// Fetches the stored profile; self-heals on corrupted data.
	fn load(&self) -> Option<IdentityProfile>;

	/// Removes the stored profile. Best-effort; never raises.
	fn clear(&self);
}

/// Persists the profile to a single JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
	path: PathBuf,
}
impl FileSessionStore {
	/// Opens a store at the provided path; the file is created on first save.
	pub fn open(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), SessionStoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| SessionStoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}
}
impl SessionStore for FileSessionStore {
	fn save(&self, profile: &IdentityProfile) -> Result<(), SessionStoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(profile).map_err(|e| SessionStoreError::Serialization {
				message: format!("Failed to serialize profile: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| SessionStoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| SessionStoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| SessionStoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| SessionStoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn load(&self) -> Option<IdentityProfile> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
			Err(e) => {
				tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session.");

				self.clear();

				return None;
			},
		};

		match serde_json::from_slice(&bytes) {
			Ok(profile) => Some(profile),
			Err(e) => {
				tracing::warn!(
					path = %self.path.display(),
					error = %e,
					"Discarding corrupted session data.",
				);

				self.clear();

				None
			},
		}
	}

	fn clear(&self) {
		if let Err(e) = fs::remove_file(&self.path)
			&& e.kind() != std::io::ErrorKind::NotFound
		{
			tracing::warn!(path = %self.path.display(), error = %e, "Failed to clear session.");
		}
	}
}

/// In-process store for tests and short-lived clients; keeps the raw JSON payload so
/// corruption scenarios can be injected.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(Arc<RwLock<Option<String>>>);
impl MemorySessionStore {
	/// Replaces the stored payload verbatim, bypassing serialization.
	pub fn inject_raw(&self, payload: impl Into<String>) {
		*self.0.write() = Some(payload.into());
	}

	/// Returns the raw stored payload, if any.
	pub fn raw(&self) -> Option<String> {
		self.0.read().clone()
	}
}
impl SessionStore for MemorySessionStore {
	fn save(&self, profile: &IdentityProfile) -> Result<(), SessionStoreError> {
		let serialized =
			serde_json::to_string(profile).map_err(|e| SessionStoreError::Serialization {
				message: format!("Failed to serialize profile: {e}"),
			})?;

		*self.0.write() = Some(serialized);

		Ok(())
	}

	fn load(&self) -> Option<IdentityProfile> {
		let raw = self.0.read().clone()?;

		match serde_json::from_str(&raw) {
			Ok(profile) => Some(profile),
			Err(_) => {
				self.clear();

				None
			},
		}
	}

	fn clear(&self) {
		*self.0.write() = None;
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn profile() -> IdentityProfile {
		IdentityProfile {
			id: 7,
			login: "hatter".into(),
			name: Some("Mad Hatter".into()),
			email: None,
			avatar_url: "https://avatars.example.com/u/7".into(),
			html_url: "https://github.com/hatter".into(),
			bio: Some("tea".into()),
			public_repos: 12,
			followers: 3,
			following: 4,
			created_at: macros::datetime!(2019-03-01 00:00 UTC),
		}
	}

	fn temp_path() -> PathBuf {
		let unique = format!(
			"github_oauth_relay_session_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn file_store_round_trips_across_reopen() {
		let path = temp_path();
		let store = FileSessionStore::open(&path);

		store.save(&profile()).expect("Profile should persist to the file store.");
		drop(store);

		let reopened = FileSessionStore::open(&path);
		let loaded = reopened.load().expect("Persisted profile should load after reopen.");

		assert_eq!(loaded, profile());

		reopened.clear();

		assert!(reopened.load().is_none(), "Cleared store should read as absent.");
	}

	#[test]
	fn file_store_heals_corrupted_data() {
		let path = temp_path();

		fs::write(&path, b"{\"id\": 7, \"login\"").expect("Corrupt fixture should write.");

		let store = FileSessionStore::open(&path);

		assert!(store.load().is_none(), "Corrupted data must read as absence.");
		assert!(!path.exists(), "Corrupted entry must be cleared on load.");
		assert!(store.load().is_none(), "A second load should stay absent without panicking.");
	}

	#[test]
	fn memory_store_heals_corrupted_data() {
		let store = MemorySessionStore::default();

		store.inject_raw("not json at all");

		assert!(store.load().is_none());
		assert!(store.raw().is_none(), "Corrupted entry must be cleared on load.");
	}

	#[test]
	fn clear_is_a_no_op_on_missing_entries() {
		let store = FileSessionStore::open(temp_path());

		store.clear();
		store.clear();
	}
}
