//! Session lifecycle: expiry scheduling, the warning/logout timer, and refresh coordination.

pub mod coordinator;
pub mod schedule;
pub mod timer;

pub use coordinator::*;
pub use schedule::*;
pub use timer::*;

// self
use crate::_prelude::*;

/// Events the session machinery surfaces to the embedding UI layer.
///
/// The crate cannot navigate or render; the embedder reacts—show the extend-session modal on
/// [`ExpiryWarning`](SessionEvent::ExpiryWarning), route to login on
/// [`LoggedOut`](SessionEvent::LoggedOut).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// The warning deadline fired; the user may extend before the forced logout lands.
	ExpiryWarning,
	/// The session ended; credentials are already cleared.
	LoggedOut {
		/// Why the session ended.
		reason: LogoutReason,
	},
}

/// Why a session was terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogoutReason {
	/// The forced-logout deadline fired, or the token was already past its warning window.
	Expired,
	/// The stored access token could not be decoded.
	MalformedToken,
	/// No refresh token was available when an extension was requested.
	MissingRefreshToken,
	/// The refresh exchange failed; a single failed attempt is terminal.
	RefreshRejected,
	/// The user logged out explicitly.
	UserLogout,
}
impl LogoutReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Expired => "expired",
			Self::MalformedToken => "malformed_token",
			Self::MissingRefreshToken => "missing_refresh_token",
			Self::RefreshRejected => "refresh_rejected",
			Self::UserLogout => "user_logout",
		}
	}
}
impl Display for LogoutReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Paths on which the session timer stays disarmed (login, register).
#[derive(Clone, Debug)]
pub struct RoutePolicy {
	public: Vec<String>,
}
impl RoutePolicy {
	/// Builds a policy from explicit public paths.
	pub fn new(public: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self { public: public.into_iter().map(Into::into).collect() }
	}

	/// Returns `true` when the path requires no session.
	pub fn is_public(&self, path: &str) -> bool {
		self.public.iter().any(|public| public == path)
	}
}
impl Default for RoutePolicy {
	fn default() -> Self {
		Self::new(["/", "/register"])
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_policy_covers_login_and_register() {
		let policy = RoutePolicy::default();

		assert!(policy.is_public("/"));
		assert!(policy.is_public("/register"));
		assert!(!policy.is_public("/dashboard"));
	}
}
