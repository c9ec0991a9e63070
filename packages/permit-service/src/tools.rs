//! Named tools for the agent. Every call returns text and never fails.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{ExpiredQuery, ExpiringSoonQuery, InstallationQuery, PermitService, YearQuery, format};
use permit_domain::{PermitType, dates};

pub const GET_PERMIT_DOCUMENT_CONTENT: &str = "get_permit_document_content";
pub const GET_CURRENT_DATE: &str = "get_current_date";
pub const GET_TIME_DIFFERENCE: &str = "get_time_difference";
pub const GET_LIST_DOCUMENTS_BY_ISSUE_YEAR: &str = "get_list_documents_by_issue_year";
pub const GET_LIST_DOCUMENTS_BY_EXPIRATION_YEAR: &str = "get_list_documents_by_expiration_year";
pub const GET_LIST_DOCUMENTS_ALREADY_EXPIRED: &str = "get_list_documents_already_expired";
pub const GET_LIST_DOCUMENTS_EXPIRING_SOON: &str = "get_list_documents_expiring_soon";
pub const GET_PERMIT_DETAILS: &str = "get_permit_details";
pub const GET_PERMITS_BY_INSTALLATION: &str = "get_permits_by_installation";
pub const GET_LIST_ORGANIZATIONS: &str = "get_list_organizations";
pub const GET_PERMIT_STATISTICS: &str = "get_permit_statistics";

pub const TOOL_NAMES: [&str; 11] = [
	GET_PERMIT_DOCUMENT_CONTENT,
	GET_CURRENT_DATE,
	GET_TIME_DIFFERENCE,
	GET_LIST_DOCUMENTS_BY_ISSUE_YEAR,
	GET_LIST_DOCUMENTS_BY_EXPIRATION_YEAR,
	GET_LIST_DOCUMENTS_ALREADY_EXPIRED,
	GET_LIST_DOCUMENTS_EXPIRING_SOON,
	GET_PERMIT_DETAILS,
	GET_PERMITS_BY_INSTALLATION,
	GET_LIST_ORGANIZATIONS,
	GET_PERMIT_STATISTICS,
];

#[derive(Debug, Deserialize)]
struct KeywordArgs {
	keyword: String,
}

#[derive(Debug, Deserialize)]
struct TimeDifferenceArgs {
	now_datetime: String,
	target_datetime: String,
}

#[derive(Debug, Deserialize)]
struct PermitNumberArgs {
	permit_number: String,
}

pub struct PermitTools {
	service: PermitService,
}
impl PermitTools {
	pub fn new(service: PermitService) -> Self {
		Self { service }
	}

	/// Dispatches by tool name. Bad arguments and unknown names are reported as text.
	pub async fn call(&self, name: &str, args: Value) -> String {
		tracing::info!(tool = name, "Tool call received.");

		match name {
			GET_PERMIT_DOCUMENT_CONTENT => match parse_args::<KeywordArgs>(name, args) {
				Ok(args) => self.document_content(&args.keyword).await,
				Err(text) => text,
			},
			GET_CURRENT_DATE => self.current_date(),
			GET_TIME_DIFFERENCE => match parse_args::<TimeDifferenceArgs>(name, args) {
				Ok(args) => time_difference(&args.now_datetime, &args.target_datetime).to_string(),
				Err(text) => text,
			},
			GET_LIST_DOCUMENTS_BY_ISSUE_YEAR => match parse_args::<YearQuery>(name, args) {
				Ok(query) => self.documents_by_issue_year(&query).await,
				Err(text) => text,
			},
			GET_LIST_DOCUMENTS_BY_EXPIRATION_YEAR => match parse_args::<YearQuery>(name, args) {
				Ok(query) if query.permit_type.is_some_and(|kind| !kind.carries_expiration()) =>
					invalid_arguments(name, "permit_type must be PLO"),
				Ok(query) => self.documents_by_expiration_year(&query).await,
				Err(text) => text,
			},
			GET_LIST_DOCUMENTS_ALREADY_EXPIRED => match parse_args::<ExpiredQuery>(name, args) {
				Ok(query) => self.documents_already_expired(&query).await,
				Err(text) => text,
			},
			GET_LIST_DOCUMENTS_EXPIRING_SOON => match parse_args::<ExpiringSoonQuery>(name, args) {
				Ok(query) => self.documents_expiring_soon(&query).await,
				Err(text) => text,
			},
			GET_PERMIT_DETAILS => match parse_args::<PermitNumberArgs>(name, args) {
				Ok(args) => self.permit_details(&args.permit_number).await,
				Err(text) => text,
			},
			GET_PERMITS_BY_INSTALLATION => match parse_args::<InstallationQuery>(name, args) {
				Ok(query) => self.permits_by_installation(&query).await,
				Err(text) => text,
			},
			GET_LIST_ORGANIZATIONS => self.organizations().await,
			GET_PERMIT_STATISTICS => self.statistics().await,
			_ => format!("Unknown tool: {name}."),
		}
	}

	pub async fn document_content(&self, keyword: &str) -> String {
		format::content(&self.service.content(keyword).await)
	}

	pub fn current_date(&self) -> String {
		dates::format_date(self.service.today())
	}

	pub async fn documents_by_issue_year(&self, query: &YearQuery) -> String {
		format::issue_year(query.year, &self.service.issue_year(query).await.into_value())
	}

	pub async fn documents_by_expiration_year(&self, query: &YearQuery) -> String {
		format::expiration_year(query.year, &self.service.expiration_year(query).await.into_value())
	}

	pub async fn documents_already_expired(&self, query: &ExpiredQuery) -> String {
		format::expired(&self.service.expired(query).await.into_value())
	}

	pub async fn documents_expiring_soon(&self, query: &ExpiringSoonQuery) -> String {
		format::expiring_soon(&self.service.expiring_soon(query).await.into_value())
	}

	pub async fn permit_details(&self, permit_number: &str) -> String {
		let lookup = self.service.permit_by_number(permit_number).await.into_value();

		format::permit_details(
			permit_number.trim(),
			&lookup,
			self.service.today(),
			self.service.cfg.permits.status_threshold_days,
		)
	}

	pub async fn permits_by_installation(&self, query: &InstallationQuery) -> String {
		let records = self.service.permits_by_installation(query).await.into_value();

		format::installation(query.installation.trim(), &records)
	}

	pub async fn organizations(&self) -> String {
		format::organizations(&self.service.organizations().await.into_value())
	}

	pub async fn statistics(&self) -> String {
		format::statistics(&self.service.statistics().await.into_value())
	}
}

/// Signed whole days from `now` to `target`; malformed dates yield 0.
pub fn time_difference(now: &str, target: &str) -> i64 {
	match dates::days_between_str(now, target) {
		Some(days) => days,
		None => {
			tracing::warn!(now, target, "Invalid date format for time difference.");

			0
		},
	}
}

/// Permit types accepted by the expiration-year tool.
pub fn expiration_permit_types() -> Vec<&'static str> {
	PermitType::ALL
		.into_iter()
		.filter(|kind| kind.carries_expiration())
		.map(PermitType::as_str)
		.collect()
}

fn parse_args<T>(tool: &str, args: Value) -> Result<T, String>
where
	T: DeserializeOwned,
{
	let args = match args {
		Value::Null => Value::Object(Map::new()),
		other => other,
	};

	serde_json::from_value(args).map_err(|err| invalid_arguments(tool, &err.to_string()))
}

fn invalid_arguments(tool: &str, message: &str) -> String {
	format!("Invalid arguments for {tool}: {message}.")
}

#[cfg(test)]
mod tests {
	use crate::tools::{expiration_permit_types, time_difference};

	#[test]
	fn time_difference_is_signed() {
		assert_eq!(time_difference("2025-11-20", "2026-01-05"), 46);
		assert_eq!(time_difference("2026-01-05", "2025-11-20"), -46);
		assert_eq!(time_difference("2025-11-20", "20-11-2025"), 0);
	}

	#[test]
	fn only_plo_expires() {
		assert_eq!(expiration_permit_types(), vec!["PLO"]);
	}
}
