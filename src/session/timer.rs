//! Session timer runtime: schedules the warning and forced-logout deadlines and re-arms on
//! every credential or route change.
//!
//! The timer owns a [`SessionPhase`] and a spawned driver. The driver sleeps toward the next
//! pending deadline and is preempted by a wake signal whenever an evaluation replaces the
//! phase, so a superseded deadline can never fire. Firing the forced logout clears the
//! credential store before the [`SessionEvent::LoggedOut`] event is emitted—no partial
//! session state is left behind.

// std
use std::sync::Weak;
// crates.io
use tokio::{
	sync::{mpsc, watch},
	task::JoinHandle,
};
// self
use crate::{
	_prelude::*,
	session::{
		LogoutReason, RoutePolicy, SessionEvent,
		schedule::{self, DeadlineKind, Directive, SessionPhase},
	},
	store::CredentialStore,
};

/// Expiry-driven warning/logout timer bound to one credential store.
pub struct SessionTimer {
	store: Arc<dyn CredentialStore>,
	routes: RoutePolicy,
	phase: Mutex<SessionPhase>,
	route: Mutex<String>,
	events: mpsc::UnboundedSender<SessionEvent>,
	wake: watch::Sender<u64>,
}
impl SessionTimer {
	/// Creates a timer and the event stream the embedding UI consumes.
	///
	/// The timer starts disarmed on the root public route; call
	/// [`spawn`](Self::spawn) once, then [`on_route_change`](Self::on_route_change) /
	/// [`rearm`](Self::rearm) as the embedder navigates and credentials change.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		routes: RoutePolicy,
	) -> (Arc<Self>, mpsc::UnboundedReceiver<SessionEvent>) {
		let (events, receiver) = mpsc::unbounded_channel();
		let (wake, _) = watch::channel(0);
		let timer = Arc::new(Self {
			store,
			routes,
			phase: Mutex::new(SessionPhase::Disarmed),
			route: Mutex::new("/".into()),
			events,
			wake,
		});

		(timer, receiver)
	}

	/// Spawns the deadline driver.
	///
	/// The driver holds only a weak reference: dropping every strong handle stops it, so an
	/// unmounted session cannot keep firing events.
	pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
		let this = Arc::downgrade(self);
		let wake = self.wake.subscribe();

		tokio::spawn(Self::drive(this, wake))
	}

	/// Snapshots the current phase.
	pub fn phase(&self) -> SessionPhase {
		*self.phase.lock()
	}

	/// Re-evaluates deadlines from the current token; call after every credential write.
	///
	/// Replacing the phase cancels any previously pending warn/logout pair before new
	/// deadlines are computed, so no two pairs are ever pending concurrently.
	pub async fn rearm(&self) -> Result<()> {
		self.evaluate().await
	}

	/// Records a route change and re-evaluates; public paths disarm the timer.
	pub async fn on_route_change(&self, path: &str) -> Result<()> {
		*self.route.lock() = path.to_owned();

		self.evaluate().await
	}

	/// Terminates the session: clears both tokens, disarms, and emits
	/// [`SessionEvent::LoggedOut`].
	pub async fn shutdown(&self, reason: LogoutReason) -> Result<()> {
		self.store.clear().await?;
		self.transition(SessionPhase::Disarmed);

		let _ = self.events.send(SessionEvent::LoggedOut { reason });

		Ok(())
	}

	async fn evaluate(&self) -> Result<()> {
		let public_route = self.routes.is_public(&self.route.lock());
		let access = self.store.access().await?;

		match schedule::evaluate_at(access.as_ref(), public_route, OffsetDateTime::now_utc()) {
			Directive::Disarm => {
				self.transition(SessionPhase::Disarmed);

				Ok(())
			},
			Directive::Arm(deadlines) => {
				self.transition(SessionPhase::Armed(deadlines));

				Ok(())
			},
			Directive::Expire(reason) => self.shutdown(reason).await,
		}
	}

	fn transition(&self, phase: SessionPhase) {
		*self.phase.lock() = phase;

		self.wake.send_modify(|epoch| *epoch += 1);
	}

	async fn drive(this: Weak<Self>, mut wake: watch::Receiver<u64>) {
		loop {
			let Some(timer) = this.upgrade() else { return };
			let next = timer.phase().next_deadline();

			// Release the strong handle before suspending so the embedder's drop is final.
			drop(timer);

			match next {
				None =>
					if wake.changed().await.is_err() {
						return;
					},
				Some((kind, at)) => {
					let delay = delay_until(at);

					tokio::select! {
						changed = wake.changed() => if changed.is_err() { return },
						() = tokio::time::sleep(delay) => {
							let Some(timer) = this.upgrade() else { return };

							timer.fire(kind, at).await;
						},
					}
				},
			}
		}
	}

	async fn fire(&self, kind: DeadlineKind, at: OffsetDateTime) {
		{
			let mut phase = self.phase.lock();

			// A wakeup is only honored if the pending deadline is still the one it slept on;
			// anything else is a stale wake racing a re-arm.
			match (kind, *phase) {
				(DeadlineKind::Warn, SessionPhase::Armed(deadlines))
					if deadlines.warn_at == at =>
					*phase = SessionPhase::Warning { logout_at: deadlines.logout_at },
				(DeadlineKind::Logout, SessionPhase::Warning { logout_at })
					if logout_at == at => {},
				_ => return,
			}
		}

		match kind {
			DeadlineKind::Warn => {
				let _ = self.events.send(SessionEvent::ExpiryWarning);
			},
			DeadlineKind::Logout => {
				let _ = self.shutdown(LogoutReason::Expired).await;
			},
		}
	}
}
impl Debug for SessionTimer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTimer")
			.field("phase", &self.phase())
			.field("route", &*self.route.lock())
			.finish()
	}
}

fn delay_until(at: OffsetDateTime) -> std::time::Duration {
	let delta = at - OffsetDateTime::now_utc();

	if delta.is_negative() { std::time::Duration::ZERO } else { delta.unsigned_abs() }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::seeded_store;

	#[tokio::test]
	async fn rearm_replaces_the_pending_pair() {
		let store = seeded_store(Duration::hours(1), "R1");
		let (timer, _events) = SessionTimer::new(store.clone(), RoutePolicy::default());

		timer.on_route_change("/dashboard").await.expect("Arming on a private route should succeed.");

		let first = timer.phase();

		assert!(first.is_armed());

		store.replace_now(crate::auth::CredentialPair::new(
			crate::_preludet::test_access_token(Duration::hours(2)),
			"R2",
		));
		timer.rearm().await.expect("Re-arming after a credential write should succeed.");

		let second = timer.phase();

		assert!(second.is_armed());
		assert_ne!(first, second, "New credentials must replace the pending deadlines.");
	}

	#[tokio::test]
	async fn public_routes_disarm() {
		let store = seeded_store(Duration::hours(1), "R1");
		let (timer, _events) = SessionTimer::new(store, RoutePolicy::default());

		timer.on_route_change("/dashboard").await.expect("Arming should succeed.");
		assert!(timer.phase().is_armed());

		timer.on_route_change("/").await.expect("Disarming should succeed.");
		assert_eq!(timer.phase(), SessionPhase::Disarmed);
	}

	#[tokio::test]
	async fn malformed_tokens_shut_the_session_down() {
		let store = Arc::new(crate::store::MemoryStore::default());

		store.replace_now(crate::auth::CredentialPair::new("garbage", "R1"));

		let (timer, mut events) = SessionTimer::new(store.clone(), RoutePolicy::default());

		timer
			.on_route_change("/dashboard")
			.await
			.expect("Evaluation of a malformed token should not error.");

		assert_eq!(timer.phase(), SessionPhase::Disarmed);
		assert!(store.snapshot().is_none(), "Credentials must be cleared on decode failure.");
		assert_eq!(
			events.recv().await,
			Some(SessionEvent::LoggedOut { reason: LogoutReason::MalformedToken }),
		);
	}
}
