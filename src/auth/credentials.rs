//! The atomic access/refresh credential unit held by the store.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Access/refresh pair issued by login or refresh exchanges.
///
/// The pair is the unit of storage: writers replace both fields together so readers never
/// observe an access token matched with a stale refresh token. Serde field names are pinned
/// to the durable-storage keys used by the dashboard (`accessToken`/`refreshToken`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer credential; embeds an expiry claim.
	#[serde(rename = "accessToken")]
	pub access: TokenSecret,
	/// Longer-lived credential exchangeable for a new pair.
	#[serde(rename = "refreshToken")]
	pub refresh: TokenSecret,
}
impl CredentialPair {
	/// Builds a pair from raw token strings.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: TokenSecret::new(access), refresh: TokenSecret::new(refresh) }
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("access", &"<redacted>")
			.field("refresh", &"<redacted>")
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn serde_uses_storage_key_names() {
		let pair = CredentialPair::new("A1", "R1");
		let payload = serde_json::to_string(&pair)
			.expect("Credential pair should serialize successfully.");

		assert_eq!(payload, r#"{"accessToken":"A1","refreshToken":"R1"}"#);

		let round_trip: CredentialPair = serde_json::from_str(&payload)
			.expect("Serialized pair should deserialize successfully.");

		assert_eq!(round_trip, pair);
	}

	#[test]
	fn debug_redacts_both_tokens() {
		let rendered = format!("{:?}", CredentialPair::new("A1", "R1"));

		assert!(!rendered.contains("A1"));
		assert!(!rendered.contains("R1"));
	}
}
