//! ATECO domain: directory records, enrichment, report assembly and batch
//! import helpers.

mod batch;
mod enrichment;
mod lookup;
mod report;

pub use batch::{batch_summary, clean_codes, parse_code_list, BatchEntry, MAX_BATCH_SIZE};
pub use enrichment::{AtecoEnrichment, RiskOutlook};
pub use lookup::{AtecoItem, AtecoLookup, AtecoSuggestion};
pub use report::{suggestions_message, AtecoCodes, AtecoReport, MAX_CERTIFICAZIONI, MAX_NORMATIVE};
