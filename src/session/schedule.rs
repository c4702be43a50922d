//! Pure deadline arithmetic and the session phase machine.
//!
//! Deadlines are absolute wall-clock instants computed once per evaluation, never chained
//! relative delays, so repeated re-arming cannot drift or double-schedule. All functions take
//! `now` explicitly; the runtime layer supplies the current instant.

// self
use crate::{
	_prelude::*,
	auth::{AccessClaims, TokenSecret},
	session::LogoutReason,
};

/// The warning fires this long before the token's expiry claim.
pub const WARNING_LEAD: Duration = Duration::seconds(120);
/// The forced logout fires this long after the warning.
pub const LOGOUT_GRACE: Duration = Duration::seconds(30);

/// The warn/logout deadline pair derived from one access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadlines {
	/// Instant at which the expiry warning surfaces.
	pub warn_at: OffsetDateTime,
	/// Instant at which the session is forcibly terminated.
	pub logout_at: OffsetDateTime,
}
impl Deadlines {
	/// Computes the pair from a token's expiry instant.
	pub fn from_expiry(expires_at: OffsetDateTime) -> Self {
		let warn_at = expires_at - WARNING_LEAD;

		Self { warn_at, logout_at: warn_at + LOGOUT_GRACE }
	}
}

/// Session timer phase; at most one warn/logout pair is pending at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
	/// No deadlines pending (public route or logged out).
	Disarmed,
	/// Both deadlines pending.
	Armed(Deadlines),
	/// The warning fired; only the forced logout remains.
	Warning {
		/// Instant at which the session is forcibly terminated.
		logout_at: OffsetDateTime,
	},
}
impl SessionPhase {
	/// Returns the next pending deadline, if any.
	pub fn next_deadline(&self) -> Option<(DeadlineKind, OffsetDateTime)> {
		match *self {
			Self::Disarmed => None,
			Self::Armed(deadlines) => Some((DeadlineKind::Warn, deadlines.warn_at)),
			Self::Warning { logout_at } => Some((DeadlineKind::Logout, logout_at)),
		}
	}

	/// Returns `true` when deadlines are pending.
	pub fn is_armed(&self) -> bool {
		!matches!(self, Self::Disarmed)
	}

	/// Returns `true` when the warning has fired and the grace window is running.
	pub fn is_warning(&self) -> bool {
		matches!(self, Self::Warning { .. })
	}
}

/// Which deadline a wakeup corresponds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeadlineKind {
	/// The expiry warning.
	Warn,
	/// The forced logout.
	Logout,
}

/// What an evaluation tells the runtime to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
	/// Cancel pending deadlines and idle.
	Disarm,
	/// Replace pending deadlines with this pair.
	Arm(Deadlines),
	/// Terminate the session immediately.
	Expire(LogoutReason),
}

/// Evaluates the session against the current token, route, and instant.
///
/// A token whose warning instant has already passed expires immediately—a negative-delay
/// timer is never scheduled.
pub fn evaluate_at(
	access: Option<&TokenSecret>,
	public_route: bool,
	now: OffsetDateTime,
) -> Directive {
	if public_route {
		return Directive::Disarm;
	}

	let Some(token) = access else {
		return Directive::Disarm;
	};
	let expires_at = match AccessClaims::decode(token).and_then(|claims| claims.expires_at()) {
		Ok(instant) => instant,
		Err(_) => return Directive::Expire(LogoutReason::MalformedToken),
	};
	let deadlines = Deadlines::from_expiry(expires_at);

	if deadlines.warn_at <= now {
		return Directive::Expire(LogoutReason::Expired);
	}

	Directive::Arm(deadlines)
}
