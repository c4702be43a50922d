//! Reqwest-backed request dispatcher with bearer-credential injection.
//!
//! The dispatcher is the crate's [`TenderGateway`] implementation. Every authenticated call
//! reads the access token from the [`CredentialStore`] at send time, so a refresh that lands
//! between two requests is picked up by the second one without any re-wiring. A 401 response
//! maps to [`SessionError::Expired`] and is never retried here; clearing credentials is the
//! caller's decision, the dispatcher itself never mutates the store.

// crates.io
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	api::{
		ApiFuture, ClassifyRequest, LoginRequest, RefreshRequest, RegisterAck, RegisterRequest,
		SaveAck, SaveDecisionsRequest, ScrapeRequest, ScrapeResponse, TenderGateway, TokenGrant,
	},
	error::{ConfigError, SessionError, TransientError, TransportError},
	store::CredentialStore,
	tender::ClassifiedTender,
};

const LOGIN_ENDPOINT: &str = "login";
const REGISTER_ENDPOINT: &str = "register";
const REFRESH_ENDPOINT: &str = "refresh_token";
const SCRAPE_ENDPOINT: &str = "generate";
const CLASSIFY_ENDPOINT: &str = "classify";
const SAVE_DECISIONS_ENDPOINT: &str = "save-decisions";

/// Bearer-injecting HTTP dispatcher bound to one API origin and one credential store.
#[derive(Clone)]
pub struct Dispatcher {
	client: ReqwestClient,
	origin: Url,
	store: Arc<dyn CredentialStore>,
}
impl Dispatcher {
	/// Creates a dispatcher with a default reqwest client.
	pub fn new(origin: Url, store: Arc<dyn CredentialStore>) -> Result<Self> {
		let client =
			ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Ok(Self::with_client(client, origin, store))
	}

	/// Wraps an existing reqwest client.
	///
	/// If the origin carries a path it must end with a trailing slash, otherwise endpoint
	/// joins replace its last segment.
	pub fn with_client(client: ReqwestClient, origin: Url, store: Arc<dyn CredentialStore>) -> Self {
		Self { client, origin, store }
	}

	async fn dispatch<Req, Resp>(
		&self,
		path: &'static str,
		body: &Req,
		authenticated: bool,
		cancel: Option<CancellationToken>,
	) -> Result<Resp>
	where
		Req: ?Sized + Serialize,
		Resp: DeserializeOwned,
	{
		let url = self
			.origin
			.join(path)
			.map_err(|source| ConfigError::InvalidEndpoint { path, source })?;
		let mut request = self.client.post(url).json(body);

		if authenticated {
			// Read at send time; a concurrent refresh must be visible to the next request.
			if let Some(token) = self.store.access().await? {
				request = request.bearer_auth(token.expose());
			}
		}

		match cancel {
			Some(cancel) => tokio::select! {
				() = cancel.cancelled() => Err(Error::Cancelled),
				outcome = Self::exchange::<Resp>(request) => outcome,
			},
			None => Self::exchange(request).await,
		}
	}

	async fn exchange<Resp>(request: RequestBuilder) -> Result<Resp>
	where
		Resp: DeserializeOwned,
	{
		let response = request.send().await.map_err(TransportError::from)?;
		let status = response.status();

		if status == StatusCode::UNAUTHORIZED {
			return Err(SessionError::Expired.into());
		}

		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(TransientError::Endpoint {
				message: String::from_utf8_lossy(&bytes).trim().to_owned(),
				status: Some(status.as_u16()),
			}
			.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			TransientError::ResponseParse { source, status: Some(status.as_u16()) }.into()
		})
	}
}
impl TenderGateway for Dispatcher {
	fn login<'a>(&'a self, request: &'a LoginRequest) -> ApiFuture<'a, TokenGrant> {
		Box::pin(self.dispatch(LOGIN_ENDPOINT, request, false, None))
	}

	fn register<'a>(&'a self, request: &'a RegisterRequest) -> ApiFuture<'a, RegisterAck> {
		Box::pin(self.dispatch(REGISTER_ENDPOINT, request, false, None))
	}

	fn refresh<'a>(&'a self, request: &'a RefreshRequest) -> ApiFuture<'a, TokenGrant> {
		// The refresh token travels in the body; a stale bearer header would only invite
		// spurious 401s on an otherwise valid exchange.
		Box::pin(self.dispatch(REFRESH_ENDPOINT, request, false, None))
	}

	fn scrape<'a>(
		&'a self,
		request: &'a ScrapeRequest,
		cancel: CancellationToken,
	) -> ApiFuture<'a, ScrapeResponse> {
		Box::pin(self.dispatch(SCRAPE_ENDPOINT, request, true, Some(cancel)))
	}

	fn classify<'a>(
		&'a self,
		request: &'a ClassifyRequest,
		cancel: CancellationToken,
	) -> ApiFuture<'a, Vec<ClassifiedTender>> {
		Box::pin(self.dispatch(CLASSIFY_ENDPOINT, request, true, Some(cancel)))
	}

	fn save_decisions<'a>(&'a self, request: &'a SaveDecisionsRequest) -> ApiFuture<'a, SaveAck> {
		Box::pin(self.dispatch(SAVE_DECISIONS_ENDPOINT, request, true, None))
	}
}
impl Debug for Dispatcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher").field("origin", &self.origin.as_str()).finish()
	}
}
