//! Plain-text rendering of query results for the agent.
//!
//! Missing fields render as `N/A`, missing summaries as `No summary available`.

use time::Date;

use crate::{
	ContentPassage, PermitLookup, PermitStatistics, QueryOutcome,
	temporal::{DatedRecords, ExpiringWindow},
};
use permit_domain::{
	PermitRecord, StatusReport,
	dates::{days_between, format_date, parse_date},
};

const NOT_AVAILABLE: &str = "N/A";
const NO_SUMMARY: &str = "No summary available";
const UNTITLED: &str = "Untitled";

pub fn issue_year(year: Option<i32>, records: &[PermitRecord]) -> String {
	if records.is_empty() {
		return match year {
			Some(year) =>
				format!("No documents found issued in year {year} with the specified filters."),
			None => "No documents found issued with the specified filters.".to_string(),
		};
	}

	let mut parts = vec![format!("List of documents issued: {} items found\n", records.len())];

	for (idx, record) in records.iter().enumerate() {
		parts.push(format!(
			"{}. {} - {}\n   Organization: {}\n   Issue Date: {}\n   Summary: {}\n",
			idx + 1,
			or_na(&record.document_title),
			or_na(&record.permit_number),
			or_na(&record.organization),
			or_na(&record.issue_date),
			summary(record),
		));
	}

	parts.join("\n")
}

pub fn expiration_year(year: Option<i32>, records: &[PermitRecord]) -> String {
	if records.is_empty() {
		return match year {
			Some(year) =>
				format!("No documents found expiring in year {year} with the specified filters."),
			None => "No documents found expiring with the specified filters.".to_string(),
		};
	}

	let mut parts = vec![format!("List of documents expiring: {} items found\n", records.len())];

	for (idx, record) in records.iter().enumerate() {
		parts.push(format!(
			"{}. {} - {}\n   Organization: {}\n   Expiration Date: {}\n   Summary: {}\n",
			idx + 1,
			or_na(&record.document_title),
			or_na(&record.permit_number),
			or_na(&record.organization),
			or_na(&record.expiration_date),
			summary(record),
		));
	}

	parts.join("\n")
}

pub fn expired(result: &DatedRecords) -> String {
	let as_of = format_date(result.as_of);

	if result.records.is_empty() {
		return format!("No expired documents found as of {as_of}.");
	}

	let mut parts = vec![format!(
		"Documents that have already expired as of {as_of}:\nTotal: {} expired permits\n",
		result.records.len()
	)];

	for (idx, record) in result.records.iter().enumerate() {
		parts.push(format!(
			"{}. {} - {}\n   Organization: {}\n   Installation: {}\n   Expired On: {}\n   Summary: {}\n",
			idx + 1,
			or_na(&record.document_title),
			or_na(&record.permit_number),
			or_na(&record.organization),
			or_na(&record.installation),
			or_na(&record.expiration_date),
			summary(record),
		));
	}

	parts.join("\n")
}

/// Days remaining are counted from the same date the query window started on.
pub fn expiring_soon(result: &ExpiringWindow) -> String {
	if result.records.is_empty() {
		return format!("No documents expiring within the next {} days.", result.days);
	}

	let mut parts = vec![format!(
		"Documents expiring within the next {} days (as of {}):\nTotal: {} permits\n",
		result.days,
		format_date(result.as_of),
		result.records.len()
	)];

	for (idx, record) in result.records.iter().enumerate() {
		parts.push(format!(
			"{}. {} - {}\n   Organization: {}\n   Installation: {}\n   Expires On: {} {}\n   Summary: {}\n",
			idx + 1,
			or_na(&record.document_title),
			or_na(&record.permit_number),
			or_na(&record.organization),
			or_na(&record.installation),
			or_na(&record.expiration_date),
			days_remaining_text(record.expiration_date.as_deref(), result.as_of),
			summary(record),
		));
	}

	parts.join("\n")
}

pub fn permit_details(
	permit_number: &str,
	lookup: &PermitLookup,
	today: Date,
	status_threshold_days: i64,
) -> String {
	let record = match lookup {
		PermitLookup::Found(record) => record,
		PermitLookup::NotFound { .. } =>
			return format!("Permit '{permit_number}' not found in the database."),
	};
	let expiry = record.expiration_date.as_deref().filter(|value| !value.is_empty());
	let report = StatusReport::evaluate(expiry, today, status_threshold_days);
	let status_line =
		format!("Status: {} {}", report.status.label(), report.describe().unwrap_or_default());

	format!(
		"Permit Details for {permit_number}:\n\n\
		 Document Title: {}\n\
		 Permit Type: {}\n\
		 Organization: {}\n\
		 Installation: {}\n\n\
		 Issue Date: {}\n\
		 Expiration Date: {}\n\
		 {}\n\n\
		 Summary:\n{}\n\n\
		 Document Path: {}",
		or_na(&record.document_title),
		or_na(&record.permit_type),
		or_na(&record.organization),
		or_na(&record.installation),
		or_na(&record.issue_date),
		expiry.unwrap_or(NOT_AVAILABLE),
		status_line.trim_end(),
		summary(record),
		or_na(&record.filepath),
	)
}

pub fn installation(installation: &str, records: &[PermitRecord]) -> String {
	if records.is_empty() {
		return format!("No permits found for installation '{installation}'.");
	}

	let mut parts = vec![format!(
		"Permits for installation '{installation}':\nTotal: {} permits found\n",
		records.len()
	)];

	for (idx, record) in records.iter().enumerate() {
		parts.push(format!(
			"{}. {} - {}\n   Document: {}\n   Organization: {}\n   Issue Date: {}\n   Expiration: {}\n   Summary: {}\n",
			idx + 1,
			or_na(&record.permit_number),
			or_na(&record.permit_type),
			or_na(&record.document_title),
			or_na(&record.organization),
			or_na(&record.issue_date),
			or_na(&record.expiration_date),
			summary(record),
		));
	}

	parts.join("\n")
}

/// Search failures are reported; an empty hit list is not.
pub fn content(outcome: &QueryOutcome<Vec<ContentPassage>>) -> String {
	if let QueryOutcome::Failed { message, .. } = outcome {
		return format!("Error retrieving documents: {message}");
	}

	let passages = outcome.value();

	if passages.is_empty() {
		return "No relevant documents found for the query.".to_string();
	}

	passages
		.iter()
		.map(|passage| {
			format!("[{}]:\n{}", passage.title.as_deref().unwrap_or(UNTITLED), passage.content)
		})
		.collect::<Vec<_>>()
		.join("\n\n")
}

pub fn organizations(organizations: &[String]) -> String {
	if organizations.is_empty() {
		return "No organizations found.".to_string();
	}

	format!("Organizations ({}): {}", organizations.len(), organizations.join(", "))
}

pub fn statistics(stats: &PermitStatistics) -> String {
	serde_json::to_string_pretty(stats)
		.unwrap_or_else(|err| format!("Error rendering permit statistics: {err}"))
}

fn or_na(value: &Option<String>) -> &str {
	value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn summary(record: &PermitRecord) -> &str {
	record.permit_summary.as_deref().unwrap_or(NO_SUMMARY)
}

fn days_remaining_text(expiration_date: Option<&str>, as_of: Date) -> String {
	match expiration_date.and_then(parse_date) {
		Some(expires_on) => format!("({} days remaining)", days_between(as_of, expires_on)),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use crate::{
		PermitLookup,
		format::{expiring_soon, issue_year, permit_details},
		temporal::ExpiringWindow,
	};
	use permit_domain::PermitRecord;

	fn record(number: &str, expiry: Option<&str>) -> PermitRecord {
		PermitRecord {
			document_title: Some("PLO Pipeline".to_string()),
			permit_type: Some("PLO".to_string()),
			organization: Some("PPN".to_string()),
			permit_number: Some(number.to_string()),
			issue_date: Some("2020-01-01".to_string()),
			expiration_date: expiry.map(str::to_string),
			installation: Some("IT Semarang".to_string()),
			..Default::default()
		}
	}

	#[test]
	fn issue_year_lists_numbered_entries() {
		let text = issue_year(Some(2020), &[record("PLO-1", None)]);

		assert_eq!(
			text,
			"List of documents issued: 1 items found\n\n\
			 1. PLO Pipeline - PLO-1\n   Organization: PPN\n   Issue Date: 2020-01-01\n   \
			 Summary: No summary available\n"
		);
	}

	#[test]
	fn expiring_soon_counts_days_from_window_start() {
		let window = ExpiringWindow {
			as_of: date!(2025 - 11 - 20),
			days: 60,
			records: vec![record("PLO-2", Some("2026-01-05")), record("PLO-3", Some("bad"))],
		};
		let text = expiring_soon(&window);

		assert!(text.starts_with(
			"Documents expiring within the next 60 days (as of 2025-11-20):\nTotal: 2 permits\n"
		));
		assert!(text.contains("Expires On: 2026-01-05 (46 days remaining)\n"));
		assert!(text.contains("Expires On: bad \n"));
	}

	#[test]
	fn details_report_status_and_missing_permit() {
		let found = PermitLookup::Found(Box::new(record("PLO-4", Some("2025-12-01"))));
		let text = permit_details("PLO-4", &found, date!(2025 - 11 - 20), 30);

		assert!(text.starts_with("Permit Details for PLO-4:\n\nDocument Title: PLO Pipeline\n"));
		assert!(text.contains("Expiration Date: 2025-12-01\nStatus: Expiring Soon Expires in 11 days\n"));
		assert!(text.ends_with("Document Path: N/A"));

		let missing = PermitLookup::NotFound { permit_number: "X".to_string() };

		assert_eq!(
			permit_details("X", &missing, date!(2025 - 11 - 20), 30),
			"Permit 'X' not found in the database."
		);
	}

	#[test]
	fn details_without_expiry_are_active() {
		let found = PermitLookup::Found(Box::new(record("KK-1", None)));
		let text = permit_details("KK-1", &found, date!(2025 - 11 - 20), 30);

		assert!(text.contains("Expiration Date: N/A\nStatus: Active\n"));
	}
}
