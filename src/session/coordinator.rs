//! Login, logout, and the single-shot session refresh exchange.

// self
use crate::{
	_prelude::*,
	api::{LoginRequest, RefreshRequest, RegisterAck, RegisterRequest, TenderGateway},
	auth::CredentialPair,
	error::SessionError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::{LogoutReason, timer::SessionTimer},
	store::CredentialStore,
};

/// Orchestrates credential-producing flows against the gateway, store, and timer.
///
/// `extend` is the warning modal's confirm action: one refresh exchange, no automatic retry.
/// Success rotates the stored pair and re-arms the timer; any failure terminates the session.
pub struct SessionCoordinator<G>
where
	G: ?Sized + TenderGateway,
{
	gateway: Arc<G>,
	store: Arc<dyn CredentialStore>,
	timer: Arc<SessionTimer>,
	extend_guard: AsyncMutex<()>,
}
impl<G> SessionCoordinator<G>
where
	G: ?Sized + TenderGateway,
{
	/// Creates a coordinator over the provided collaborators.
	pub fn new(
		gateway: impl Into<Arc<G>>,
		store: Arc<dyn CredentialStore>,
		timer: Arc<SessionTimer>,
	) -> Self {
		Self { gateway: gateway.into(), store, timer, extend_guard: AsyncMutex::new(()) }
	}

	/// Exchanges credentials for a token grant, stores it, and arms the timer.
	///
	/// Invalid credentials surface the gateway's error without touching the store.
	pub async fn login(
		&self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Result<()> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request =
					LoginRequest { username: username.into(), password: password.into() };
				let grant = self.gateway.login(&request).await?;

				self.store
					.set(CredentialPair {
						access: grant.access_token,
						refresh: grant.refresh_token,
					})
					.await?;
				self.timer.rearm().await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Creates a dashboard account; no credential action is taken.
	pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterAck> {
		self.gateway.register(request).await
	}

	/// Extends the session from the warning state via one refresh exchange.
	///
	/// A missing refresh token or a failed exchange terminates the session on the spot;
	/// callers must not retry.
	pub async fn extend(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "extend");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				// Singleflight: a second confirm while an exchange is in flight waits for it
				// instead of issuing another.
				let _single_attempt = self.extend_guard.lock().await;
				let Some(refresh) = self.store.refresh().await? else {
					self.timer.shutdown(LogoutReason::MissingRefreshToken).await?;

					return Err(SessionError::MissingRefreshToken.into());
				};

				match self.gateway.refresh(&RefreshRequest { refresh_token: refresh }).await {
					Ok(grant) => {
						self.store
							.set(CredentialPair {
								access: grant.access_token,
								refresh: grant.refresh_token,
							})
							.await?;
						self.timer.rearm().await
					},
					Err(err) => {
						self.timer.shutdown(LogoutReason::RefreshRejected).await?;

						Err(SessionError::RefreshRejected { reason: err.to_string() }.into())
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Ends the session explicitly.
	pub async fn logout(&self) -> Result<()> {
		self.timer.shutdown(LogoutReason::UserLogout).await
	}
}
impl<G> Debug for SessionCoordinator<G>
where
	G: ?Sized + TenderGateway,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionCoordinator").finish()
	}
}
