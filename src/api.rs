//! Wire contracts for the dashboard API and the gateway seam the rest of the crate calls
//! through.
//!
//! [`TenderGateway`] is the crate's only dependency on an HTTP stack: the reqwest-backed
//! [`Dispatcher`](crate::http::Dispatcher) implements it for production, while tests inject
//! fakes or point a real dispatcher at a mock server. Scrape and classify take a
//! [`CancellationToken`] because they belong to the cancellable pipeline; the session calls
//! (login, register, refresh) run to completion.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	tender::{ClassifiedTender, DecisionRecord, Tender},
};

/// Boxed future returned by [`TenderGateway`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Transport contract covering every dashboard API call the client core makes.
pub trait TenderGateway
where
	Self: Send + Sync,
{
	/// Exchanges username/password for a token grant.
	fn login<'a>(&'a self, request: &'a LoginRequest) -> ApiFuture<'a, TokenGrant>;

	/// Creates a new dashboard account.
	fn register<'a>(&'a self, request: &'a RegisterRequest) -> ApiFuture<'a, RegisterAck>;

	/// Exchanges a refresh token for a new grant; the refresh token travels as payload,
	/// never as a bearer header.
	fn refresh<'a>(&'a self, request: &'a RefreshRequest) -> ApiFuture<'a, TokenGrant>;

	/// Submits keywords to the scrape step.
	fn scrape<'a>(
		&'a self,
		request: &'a ScrapeRequest,
		cancel: CancellationToken,
	) -> ApiFuture<'a, ScrapeResponse>;

	/// Submits scraped titles plus the original keywords to the classify step.
	fn classify<'a>(
		&'a self,
		request: &'a ClassifyRequest,
		cancel: CancellationToken,
	) -> ApiFuture<'a, Vec<ClassifiedTender>>;

	/// Persists curated decisions.
	fn save_decisions<'a>(&'a self, request: &'a SaveDecisionsRequest) -> ApiFuture<'a, SaveAck>;
}

/// Credentials submitted to the login endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
	/// Account name.
	pub username: String,
	/// Account password.
	pub password: String,
}

/// Payload for account creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
	/// Account name.
	pub username: String,
	/// Contact address.
	pub email: String,
	/// Account password; strength rules are enforced server-side.
	pub password: String,
}

/// Acknowledgement returned by the register endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterAck {
	/// Human-readable confirmation.
	pub message: String,
}

/// Token pair issued by login and refresh exchanges.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenGrant {
	/// Short-lived bearer credential.
	pub access_token: TokenSecret,
	/// Longer-lived credential for the next exchange.
	pub refresh_token: TokenSecret,
	/// Grant type label (`bearer`), when the server sends one.
	#[serde(default)]
	pub token_type: Option<String>,
}

/// Payload for the refresh exchange.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
	/// The refresh token being exchanged.
	pub refresh_token: TokenSecret,
}

/// Keyword tags submitted to the scrape step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapeRequest {
	/// Keyword tag list, one scrape pass per tag.
	pub keywords: Vec<String>,
}

/// Scrape step result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapeResponse {
	/// Server-side summary line (`"N records saved."`).
	#[serde(default)]
	pub message: Option<String>,
	/// Server-side CSV export path, when the backend wrote one.
	#[serde(default)]
	pub csv_path: Option<String>,
	/// Raw scraped listings.
	pub results: Vec<Tender>,
}

/// Titles plus originating keywords submitted to the classify step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifyRequest {
	/// Titles derived from the scrape step's results.
	pub tenders: Vec<String>,
	/// The keyword list the scrape was submitted with.
	pub keywords: Vec<String>,
}

/// Curated decisions submitted for persistence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveDecisionsRequest {
	/// Keep rows only; remove/undecided rows are never sent.
	pub decisions: Vec<DecisionRecord>,
}

/// Acknowledgement returned by the save-decisions endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveAck {
	/// Human-readable confirmation, when the server sends one.
	#[serde(default)]
	pub message: Option<String>,
}
