//! Tender-domain models: raw scrape records, classification results, and curation state.

pub mod decision;
pub mod record;

pub use decision::*;
pub use record::*;
