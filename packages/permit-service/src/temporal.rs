//! Year, expired, and expiring-soon listings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::Date;

use crate::{PermitService, QueryOutcome, non_empty};
use permit_domain::{
	DateField, PermitRecord, PermitType, SortOrder, YearOperator,
	dates::{format_date, window_end},
	sort_records,
};
use permit_storage::query::{Field, QuerySpec};

pub const ISSUE_YEAR_FIELDS: [Field; 6] = [
	Field::DocumentTitle,
	Field::PermitType,
	Field::Organization,
	Field::IssueDate,
	Field::PermitSummary,
	Field::PermitNumber,
];
pub const EXPIRATION_YEAR_FIELDS: [Field; 6] = [
	Field::DocumentTitle,
	Field::PermitType,
	Field::Organization,
	Field::ExpirationDate,
	Field::PermitSummary,
	Field::PermitNumber,
];
pub const EXPIRY_FIELDS: [Field; 8] = [
	Field::DocumentTitle,
	Field::PermitType,
	Field::Organization,
	Field::Filepath,
	Field::ExpirationDate,
	Field::PermitSummary,
	Field::PermitNumber,
	Field::Installation,
];

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct YearQuery {
	#[serde(default)]
	pub permit_type: Option<PermitType>,
	#[serde(default, deserialize_with = "lenient_year")]
	pub year: Option<i32>,
	#[serde(default)]
	pub organization: Option<String>,
	/// Ignored unless `year` is also set.
	#[serde(default)]
	pub operator: Option<YearOperator>,
	/// Defaults to latest first.
	#[serde(default)]
	pub order_by: Option<SortOrder>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ExpiredQuery {
	#[serde(default)]
	pub organization: Option<String>,
	/// Defaults to latest first.
	#[serde(default)]
	pub order_by: Option<SortOrder>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ExpiringSoonQuery {
	/// Look-ahead window; `permits.expiring_soon_days` when absent.
	#[serde(default)]
	pub days: Option<u32>,
	#[serde(default)]
	pub organization: Option<String>,
	/// Defaults to earliest first.
	#[serde(default)]
	pub order_by: Option<SortOrder>,
}

/// Records evaluated against one reference date.
#[derive(Clone, Debug, PartialEq)]
pub struct DatedRecords {
	pub as_of: Date,
	pub records: Vec<PermitRecord>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpiringWindow {
	pub as_of: Date,
	pub days: u32,
	pub records: Vec<PermitRecord>,
}

impl PermitService {
	pub async fn issue_year(&self, query: &YearQuery) -> QueryOutcome<Vec<PermitRecord>> {
		let spec = year_spec(query, Field::IssueDate, &ISSUE_YEAR_FIELDS);
		let order = query.order_by.unwrap_or_default();

		match self.fetch_records(&spec).await {
			Ok(mut records) => {
				sort_records(&mut records, DateField::IssueDate, order);
				tracing::info!(count = records.len(), year = ?query.year, "Listed permits by issue year.");

				QueryOutcome::Complete(records)
			},
			Err(err) => QueryOutcome::failed("issue_year", Vec::new(), err),
		}
	}

	pub async fn expiration_year(&self, query: &YearQuery) -> QueryOutcome<Vec<PermitRecord>> {
		let spec = year_spec(query, Field::ExpirationDate, &EXPIRATION_YEAR_FIELDS);
		let order = query.order_by.unwrap_or_default();

		match self.fetch_records(&spec).await {
			Ok(mut records) => {
				sort_records(&mut records, DateField::ExpirationDate, order);
				tracing::info!(
					count = records.len(),
					year = ?query.year,
					"Listed permits by expiration year."
				);

				QueryOutcome::Complete(records)
			},
			Err(err) => QueryOutcome::failed("expiration_year", Vec::new(), err),
		}
	}

	/// PLO entries whose expiration date is strictly before today.
	pub async fn expired(&self, query: &ExpiredQuery) -> QueryOutcome<DatedRecords> {
		let today = self.today();
		let spec = expired_spec(query, today);
		let order = query.order_by.unwrap_or(SortOrder::Latest);

		match self.fetch_records(&spec).await {
			Ok(mut records) => {
				sort_records(&mut records, DateField::ExpirationDate, order);
				tracing::info!(count = records.len(), as_of = %format_date(today), "Listed expired permits.");

				QueryOutcome::Complete(DatedRecords { as_of: today, records })
			},
			Err(err) =>
				QueryOutcome::failed("expired", DatedRecords { as_of: today, records: Vec::new() }, err),
		}
	}

	/// PLO entries expiring between today and today plus the window, both inclusive.
	pub async fn expiring_soon(&self, query: &ExpiringSoonQuery) -> QueryOutcome<ExpiringWindow> {
		let today = self.today();
		let days = query.days.unwrap_or(self.cfg.permits.expiring_soon_days);
		let spec = expiring_soon_spec(query, today, days);
		let order = query.order_by.unwrap_or(SortOrder::Earliest);

		match self.fetch_records(&spec).await {
			Ok(mut records) => {
				sort_records(&mut records, DateField::ExpirationDate, order);
				tracing::info!(count = records.len(), days, "Listed permits expiring soon.");

				QueryOutcome::Complete(ExpiringWindow { as_of: today, days, records })
			},
			Err(err) => QueryOutcome::failed(
				"expiring_soon",
				ExpiringWindow { as_of: today, days, records: Vec::new() },
				err,
			),
		}
	}
}

/// The year predicate is only added when both `year` and `operator` are present.
pub fn year_spec(query: &YearQuery, date: Field, fields: &[Field]) -> QuerySpec {
	let mut spec = QuerySpec::select(fields);

	if let Some(permit_type) = query.permit_type {
		spec = spec.where_equals(Field::PermitType, "@permitType", permit_type.as_str());
	}
	if let (Some(year), Some(operator)) = (query.year, query.operator) {
		spec = spec.where_year(date, operator, "@year", year);
	}
	if let Some(organization) = non_empty(query.organization.as_deref()) {
		spec = spec.where_equals(Field::Organization, "@organization", organization);
	}

	spec
}

pub fn expired_spec(query: &ExpiredQuery, today: Date) -> QuerySpec {
	let spec = QuerySpec::select(&EXPIRY_FIELDS)
		.where_before(Field::ExpirationDate, "@today", format_date(today))
		.where_equals(Field::PermitType, "@permitType", PermitType::Plo.as_str());

	with_organization(spec, query.organization.as_deref())
}

pub fn expiring_soon_spec(query: &ExpiringSoonQuery, today: Date, days: u32) -> QuerySpec {
	let spec = QuerySpec::select(&EXPIRY_FIELDS)
		.where_between(
			Field::ExpirationDate,
			("@today", Value::from(format_date(today))),
			("@endDate", Value::from(format_date(window_end(today, days)))),
		)
		.where_equals(Field::PermitType, "@permitType", PermitType::Plo.as_str());

	with_organization(spec, query.organization.as_deref())
}

fn with_organization(spec: QuerySpec, organization: Option<&str>) -> QuerySpec {
	match non_empty(organization) {
		Some(organization) => spec.where_equals(Field::Organization, "@organization", organization),
		None => spec,
	}
}

/// Accepts `2024`, `"2024"`, `null`, or a blank string.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
	D: Deserializer<'de>,
{
	let invalid = || serde::de::Error::custom("year must be an integer");

	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Number(number)) =>
			number.as_i64().and_then(|year| i32::try_from(year).ok()).map(Some).ok_or_else(invalid),
		Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
		Some(Value::String(raw)) => raw.trim().parse::<i32>().map(Some).map_err(|_| invalid()),
		Some(_) => Err(invalid()),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use time::macros::date;

	use crate::temporal::{
		ExpiredQuery, ExpiringSoonQuery, ISSUE_YEAR_FIELDS, YearQuery, expired_spec,
		expiring_soon_spec, year_spec,
	};
	use permit_domain::YearOperator;
	use permit_storage::query::Field;

	#[test]
	fn year_without_operator_adds_no_year_predicate() {
		let query = YearQuery { year: Some(2024), ..Default::default() };
		let spec = year_spec(&query, Field::IssueDate, &ISSUE_YEAR_FIELDS);

		assert!(spec.predicates.is_empty());
		assert!(spec.parameter("@year").is_none());
	}

	#[test]
	fn blank_organization_is_ignored() {
		let query = ExpiredQuery { organization: Some("  ".to_string()), order_by: None };
		let spec = expired_spec(&query, date!(2025 - 03 - 01));

		assert!(spec.parameter("@organization").is_none());
		assert_eq!(spec.parameter("@permitType"), Some(&json!("PLO")));
		assert_eq!(spec.parameter("@today"), Some(&json!("2025-03-01")));
	}

	#[test]
	fn expiring_window_binds_inclusive_end() {
		let spec = expiring_soon_spec(&ExpiringSoonQuery::default(), date!(2025 - 12 - 20), 30);

		assert_eq!(spec.parameter("@endDate"), Some(&json!("2026-01-19")));
	}

	#[test]
	fn year_accepts_numeric_strings() {
		let query: YearQuery =
			serde_json::from_value(json!({ "year": "2023", "operator": "greater" }))
				.expect("Parse failed.");

		assert_eq!(query.year, Some(2023));
		assert_eq!(query.operator, Some(YearOperator::Greater));
		assert!(serde_json::from_value::<YearQuery>(json!({ "year": "soon" })).is_err());
		assert!(serde_json::from_value::<YearQuery>(json!({ "year": 2024.5 })).is_err());
	}
}
