//! Access-token claim decoding (compact JWT payload segment).

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Claims the session layer reads from an access token.
///
/// Only the payload segment is decoded; the signature is never verified here. The server
/// authenticates tokens—the client merely needs the expiry to schedule its deadlines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
	/// Subject the token was issued to.
	#[serde(default)]
	pub sub: Option<String>,
	/// Expiry instant as unix seconds.
	pub exp: i64,
}
impl AccessClaims {
	/// Decodes the payload segment of a compact JWT.
	pub fn decode(token: &TokenSecret) -> Result<Self, ClaimsError> {
		let mut segments = token.expose().split('.');
		let payload = segments.nth(1).ok_or(ClaimsError::MissingPayload)?;
		let bytes = URL_SAFE_NO_PAD.decode(payload)?;

		Ok(serde_json::from_slice(&bytes)?)
	}

	/// Returns the expiry claim as a wall-clock instant.
	pub fn expires_at(&self) -> Result<OffsetDateTime, ClaimsError> {
		OffsetDateTime::from_unix_timestamp(self.exp)
			.map_err(|_| ClaimsError::ExpiryOutOfRange { exp: self.exp })
	}
}

/// Failures produced while decoding an access token.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// Token is not in compact form (missing the payload segment).
	#[error("Token is missing its payload segment.")]
	MissingPayload,
	/// Payload segment is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	Encoding(#[from] base64::DecodeError),
	/// Payload JSON is malformed or lacks required claims.
	#[error("Token claims are malformed.")]
	Claims(#[from] serde_json::Error),
	/// Expiry claim does not map onto a representable instant.
	#[error("Expiry claim {exp} is out of range.")]
	ExpiryOutOfRange {
		/// Raw `exp` value carried by the token.
		exp: i64,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn token_with_payload(payload: &str) -> TokenSecret {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
		let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());

		TokenSecret::new(format!("{header}.{body}.sig"))
	}

	#[test]
	fn decode_reads_sub_and_exp() {
		let token = token_with_payload(r#"{"sub":"alice","exp":1767225600}"#);
		let claims = AccessClaims::decode(&token).expect("Valid token should decode.");

		assert_eq!(claims.sub.as_deref(), Some("alice"));
		assert_eq!(claims.exp, 1_767_225_600);
		assert_eq!(
			claims.expires_at().expect("Expiry should map onto an instant.").unix_timestamp(),
			1_767_225_600,
		);
	}

	#[test]
	fn decode_rejects_opaque_tokens() {
		let err = AccessClaims::decode(&TokenSecret::new("not-a-jwt"))
			.expect_err("Opaque token should fail to decode.");

		assert!(matches!(err, ClaimsError::MissingPayload));
	}

	#[test]
	fn decode_rejects_garbage_payloads() {
		assert!(matches!(
			AccessClaims::decode(&TokenSecret::new("a.!!!.c")),
			Err(ClaimsError::Encoding(_)),
		));

		let missing_exp = token_with_payload(r#"{"sub":"alice"}"#);

		assert!(matches!(AccessClaims::decode(&missing_exp), Err(ClaimsError::Claims(_))));
	}

	#[test]
	fn expiry_out_of_range_is_reported() {
		let claims = AccessClaims { sub: None, exp: i64::MAX };

		assert!(matches!(
			claims.expires_at(),
			Err(ClaimsError::ExpiryOutOfRange { exp: i64::MAX }),
		));
	}
}
