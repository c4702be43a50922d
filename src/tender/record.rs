//! Raw and classified tender records as the scraper and classifier emit them.

// self
use crate::_prelude::*;

/// A procurement listing as scraped from the tender portal.
///
/// Field names follow the scraper's column headers verbatim; the record is displayed and
/// forwarded, never reshaped, so downstream exports keep matching the portal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tender {
	/// Listing title; also the join key back from classification results.
	#[serde(rename = "Title")]
	pub title: String,
	/// Tender or quotation number.
	#[serde(rename = "Tender Number", default)]
	pub tender_number: Option<String>,
	/// Issuing agency.
	#[serde(rename = "Agency", default)]
	pub agency: Option<String>,
	/// Portal reference number; the scraper emits `"N/A"` when absent.
	#[serde(rename = "Ref_Num", default)]
	pub ref_number: Option<String>,
	/// Award stage label (`OPEN`, `AWARDED`, `PENDING AWARD`, `NO AWARD`).
	#[serde(rename = "Awarded", default)]
	pub awarded: Option<String>,
	/// Awardee; older scraper revisions emit a single string, newer ones a list.
	#[serde(rename = "Awardee", default)]
	pub awardee: Option<AwardeeField>,
	/// Respondent rows, passed through opaquely.
	#[serde(rename = "Respondents", default)]
	pub respondents: Option<serde_json::Value>,
	/// Respondent count.
	#[serde(rename = "Num of Respondents", default)]
	pub num_of_respondents: Option<u32>,
}

/// Awardee column in either of its wire shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AwardeeField {
	/// Single awardee string.
	One(String),
	/// Multiple awardees.
	Many(Vec<String>),
}
impl AwardeeField {
	/// Flattens either shape into the comma-joined form used for persistence.
	pub fn joined(&self) -> String {
		match self {
			Self::One(value) => value.clone(),
			Self::Many(values) => values.join(", "),
		}
	}
}

/// A tender annotated with the classifier's relevance verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTender {
	/// Listing title; matches [`Tender::title`] of the raw record it was derived from.
	pub title: String,
	/// Predicted relevance.
	pub ai_prediction: bool,
	/// Prediction confidence in `0.0..=1.0`.
	pub ai_confidence: f64,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn tender_decodes_scraper_column_names() {
		let payload = r#"{
			"Title": "Supply of laptops",
			"Tender Number": "TD-1001",
			"Agency": "Ministry of Education",
			"Ref_Num": "N/A",
			"Awarded": "OPEN",
			"Respondents": [["Acme Pte Ltd", "$10,000"]],
			"Num of Respondents": 1
		}"#;
		let tender: Tender =
			serde_json::from_str(payload).expect("Scraper record should deserialize.");

		assert_eq!(tender.title, "Supply of laptops");
		assert_eq!(tender.tender_number.as_deref(), Some("TD-1001"));
		assert_eq!(tender.ref_number.as_deref(), Some("N/A"));
		assert!(tender.awardee.is_none());
	}

	#[test]
	fn awardee_field_handles_both_shapes() {
		let one: AwardeeField = serde_json::from_str(r#""Acme Pte Ltd""#)
			.expect("String awardee should deserialize.");
		let many: AwardeeField = serde_json::from_str(r#"["Acme", "Globex"]"#)
			.expect("List awardee should deserialize.");

		assert_eq!(one.joined(), "Acme Pte Ltd");
		assert_eq!(many.joined(), "Acme, Globex");
	}
}
