//! Curation state: per-tender user decisions, save tracking, and the persistence payload.

// self
use crate::{
	_prelude::*,
	api::{SaveDecisionsRequest, TenderGateway},
	tender::record::{ClassifiedTender, Tender},
};

/// The user's verdict on a classified tender.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Decision {
	/// No verdict yet; the row is never persisted.
	#[default]
	Undecided,
	/// Keep the tender; eligible for persistence.
	Keep,
	/// Discard the tender; reported as removed instead of persisted.
	Remove,
}
impl Decision {
	/// Returns the wire form: `true` for keep, `false` for remove, absent when undecided.
	pub fn as_flag(self) -> Option<bool> {
		match self {
			Self::Undecided => None,
			Self::Keep => Some(true),
			Self::Remove => Some(false),
		}
	}

	/// Builds a decision from the wire form.
	pub fn from_flag(flag: Option<bool>) -> Self {
		match flag {
			None => Self::Undecided,
			Some(true) => Self::Keep,
			Some(false) => Self::Remove,
		}
	}
}
impl Serialize for Decision {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		self.as_flag().serialize(serializer)
	}
}
impl<'de> Deserialize<'de> for Decision {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Self::from_flag(Option::deserialize(deserializer)?))
	}
}

/// Per-row persistence progress surfaced to the UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveStatus {
	/// Row has not been submitted.
	#[default]
	Idle,
	/// Submission in flight.
	Saving,
	/// Server acknowledged the row.
	Saved,
	/// Submission failed; the user may retry.
	Failed,
	/// Row was marked remove/undecided and reported as removed without a network call.
	Removed,
}
impl SaveStatus {
	/// Returns a stable label suitable for UI state classes or logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Saving => "saving",
			Self::Saved => "success",
			Self::Failed => "error",
			Self::Removed => "removed",
		}
	}
}
impl Display for SaveStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A classified tender joined back to its raw record, ready for persistence.
///
/// The join key is the title string. That is fragile—two listings sharing a title would
/// collide—but it is the contract the backend exports were built on, so it stays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
	/// Listing title (join key).
	pub title: String,
	/// Tender or quotation number; empty when the scraper had none.
	#[serde(default)]
	pub tender_number: String,
	/// Issuing agency.
	#[serde(default)]
	pub agency: Option<String>,
	/// Portal reference number; empty when absent.
	#[serde(default)]
	pub ref_number: String,
	/// Award stage label.
	#[serde(default)]
	pub awarded: Option<String>,
	/// Awardee(s), comma-joined.
	#[serde(default)]
	pub awardee: String,
	/// Respondent rows, passed through opaquely.
	#[serde(default)]
	pub respondents: Option<serde_json::Value>,
	/// Respondent count.
	#[serde(default)]
	pub num_of_respondents: u32,
	/// Keywords the scrape was submitted with.
	pub keywords: Vec<String>,
	/// Classifier verdict.
	pub ai_prediction: bool,
	/// Classifier confidence.
	pub ai_confidence: f64,
	/// The user's verdict (`true`/`false`/absent on the wire).
	pub user_decision: Decision,
}

/// Holds one scrape's raw and classified results plus the user's curation state.
#[derive(Clone, Debug, Default)]
pub struct ReviewBoard {
	raw: Vec<Tender>,
	classified: Vec<ClassifiedTender>,
	keywords: Vec<String>,
	decisions: HashMap<String, Decision>,
	save_status: HashMap<String, SaveStatus>,
}
impl ReviewBoard {
	/// Loads a completed scrape+classify result, resetting all curation state.
	///
	/// Every classified title starts [`Decision::Undecided`]; call
	/// [`adopt_predictions`](Self::adopt_predictions) to pre-seed verdicts from the
	/// classifier instead.
	pub fn ingest(
		&mut self,
		raw: Vec<Tender>,
		classified: Vec<ClassifiedTender>,
		keywords: Vec<String>,
	) {
		self.decisions =
			classified.iter().map(|row| (row.title.clone(), Decision::Undecided)).collect();
		self.save_status.clear();
		self.raw = raw;
		self.classified = classified;
		self.keywords = keywords;
	}

	/// Seeds each row's decision from the classifier's prediction.
	pub fn adopt_predictions(&mut self) {
		for row in &self.classified {
			self.decisions
				.insert(row.title.clone(), Decision::from_flag(Some(row.ai_prediction)));
		}
	}

	/// Records the user's verdict for a title.
	pub fn set_decision(&mut self, title: &str, decision: Decision) {
		self.decisions.insert(title.to_owned(), decision);
	}

	/// Returns the current verdict for a title.
	pub fn decision(&self, title: &str) -> Decision {
		self.decisions.get(title).copied().unwrap_or_default()
	}

	/// Returns the persistence progress for a title.
	pub fn save_status(&self, title: &str) -> SaveStatus {
		self.save_status.get(title).copied().unwrap_or_default()
	}

	/// Returns the classified rows in display order.
	pub fn classified(&self) -> &[ClassifiedTender] {
		&self.classified
	}

	/// Returns the raw scrape rows.
	pub fn raw(&self) -> &[Tender] {
		&self.raw
	}

	/// Joins a classified row back to its raw record by title.
	///
	/// Returns `None` when no raw record carries the title; such rows cannot be persisted.
	pub fn record(&self, classified: &ClassifiedTender) -> Option<DecisionRecord> {
		let full = self.raw.iter().find(|tender| tender.title == classified.title)?;

		Some(DecisionRecord {
			title: classified.title.clone(),
			tender_number: full.tender_number.clone().unwrap_or_default(),
			agency: full.agency.clone(),
			ref_number: full.ref_number.clone().unwrap_or_default(),
			awarded: full.awarded.clone(),
			awardee: full.awardee.as_ref().map(|a| a.joined()).unwrap_or_default(),
			respondents: full.respondents.clone(),
			num_of_respondents: full.num_of_respondents.unwrap_or_default(),
			keywords: self.keywords.clone(),
			ai_prediction: classified.ai_prediction,
			ai_confidence: classified.ai_confidence,
			user_decision: self.decision(&classified.title),
		})
	}

	/// Builds the persistence payload: keep rows only.
	///
	/// Remove and undecided rows are excluded; they are reported through
	/// [`save_one`](Self::save_one) as removed instead.
	pub fn decisions_payload(&self) -> Vec<DecisionRecord> {
		self.classified
			.iter()
			.filter_map(|row| self.record(row))
			.filter(|record| record.user_decision == Decision::Keep)
			.collect()
	}

	/// Persists a single row, short-circuiting non-keep rows to [`SaveStatus::Removed`].
	pub async fn save_one<G>(&mut self, gateway: &G, title: &str) -> Result<SaveStatus>
	where
		G: ?Sized + TenderGateway,
	{
		let Some(row) = self.classified.iter().find(|row| row.title == title).cloned() else {
			return Ok(SaveStatus::Idle);
		};

		self.save_status.insert(title.to_owned(), SaveStatus::Saving);

		let record = match self.record(&row) {
			Some(record) if record.user_decision == Decision::Keep => record,
			_ => {
				self.save_status.insert(title.to_owned(), SaveStatus::Removed);

				return Ok(SaveStatus::Removed);
			},
		};
		let outcome =
			gateway.save_decisions(&SaveDecisionsRequest { decisions: vec![record] }).await;
		let status = if outcome.is_ok() { SaveStatus::Saved } else { SaveStatus::Failed };

		self.save_status.insert(title.to_owned(), status);
		outcome?;

		Ok(status)
	}

	/// Persists every keep row in one request, updating each included row's status.
	pub async fn save_all<G>(&mut self, gateway: &G) -> Result<usize>
	where
		G: ?Sized + TenderGateway,
	{
		let payload = self.decisions_payload();
		let titles: Vec<_> = payload.iter().map(|record| record.title.clone()).collect();

		if payload.is_empty() {
			return Ok(0);
		}

		for title in &titles {
			self.save_status.insert(title.clone(), SaveStatus::Saving);
		}

		let outcome = gateway.save_decisions(&SaveDecisionsRequest { decisions: payload }).await;
		let status = if outcome.is_ok() { SaveStatus::Saved } else { SaveStatus::Failed };

		for title in &titles {
			self.save_status.insert(title.clone(), status);
		}

		outcome?;

		Ok(titles.len())
	}
}
