use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

use crate::{PermitService, QueryOutcome, non_empty};
use permit_domain::{PermitRecord, PermitType};
use permit_storage::query::{Field, QuerySpec};

#[derive(Clone, Debug, PartialEq)]
pub enum PermitLookup {
	Found(Box<PermitRecord>),
	NotFound { permit_number: String },
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct InstallationQuery {
	pub installation: String,
	#[serde(default)]
	pub permit_type: Option<PermitType>,
}

impl PermitService {
	/// Exact match on the permit number. Only the first matching row is returned.
	pub async fn permit_by_number(&self, permit_number: &str) -> QueryOutcome<PermitLookup> {
		let permit_number = permit_number.trim();
		let not_found = || PermitLookup::NotFound { permit_number: permit_number.to_string() };

		if permit_number.is_empty() {
			return QueryOutcome::invalid("permit_by_number", not_found(), "Permit number is empty.");
		}

		let spec = permit_number_spec(permit_number);

		match self.fetch_records(&spec).await {
			Ok(records) => match records.into_iter().next() {
				Some(record) => {
					tracing::info!(permit_number, "Found permit.");

					QueryOutcome::Complete(PermitLookup::Found(Box::new(record)))
				},
				None => {
					tracing::info!(permit_number, "Permit not found.");

					QueryOutcome::Complete(not_found())
				},
			},
			Err(err) => QueryOutcome::failed("permit_by_number", not_found(), err),
		}
	}

	/// Case-insensitive substring match on the installation. Rows keep store order.
	pub async fn permits_by_installation(
		&self,
		query: &InstallationQuery,
	) -> QueryOutcome<Vec<PermitRecord>> {
		let Some(installation) = non_empty(Some(query.installation.as_str())) else {
			return QueryOutcome::invalid(
				"permits_by_installation",
				Vec::new(),
				"Installation is empty.",
			);
		};
		let spec = installation_spec(installation, query.permit_type);

		match self.fetch_records(&spec).await {
			Ok(records) => {
				tracing::info!(installation, count = records.len(), "Listed permits by installation.");

				QueryOutcome::Complete(records)
			},
			Err(err) => QueryOutcome::failed("permits_by_installation", Vec::new(), err),
		}
	}

	/// Sorted, deduplicated organization codes.
	pub async fn organizations(&self) -> QueryOutcome<Vec<String>> {
		let spec =
			QuerySpec::select_documents(&[Field::Organization]).where_defined(Field::Organization);

		match self.gateways.records.query(&spec).await {
			Ok(rows) => {
				let organizations = rows
					.into_iter()
					.filter_map(|row| match row.get(Field::Organization.name()) {
						Some(Value::String(organization)) => Some(organization.clone()),
						_ => None,
					})
					.collect::<BTreeSet<_>>()
					.into_iter()
					.collect::<Vec<_>>();

				tracing::info!(count = organizations.len(), "Listed organizations.");

				QueryOutcome::Complete(organizations)
			},
			Err(err) => QueryOutcome::failed("organizations", Vec::new(), err),
		}
	}
}

pub fn permit_number_spec(permit_number: &str) -> QuerySpec {
	QuerySpec::select(&Field::ALL).where_equals(Field::PermitNumber, "@permitNumber", permit_number)
}

pub fn installation_spec(installation: &str, permit_type: Option<PermitType>) -> QuerySpec {
	let spec = QuerySpec::select(&Field::ALL).where_contains_ignore_case(
		Field::Installation,
		"@installation",
		installation,
	);

	match permit_type {
		Some(permit_type) =>
			spec.where_equals(Field::PermitType, "@permitType", permit_type.as_str()),
		None => spec,
	}
}
