use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{PermitService, QueryOutcome, Result};
use permit_domain::{PermitType, dates::format_date};
use permit_storage::query::{Field, QuerySpec};

/// Group key used when a row has no string value for the grouped field.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Counts over joined permit entries.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PermitStatistics {
	#[serde(rename = "total_permits")]
	pub total: u64,
	#[serde(rename = "expired_count")]
	pub expired: u64,
	#[serde(rename = "active_count")]
	pub active: u64,
	pub by_type: BTreeMap<String, u64>,
	pub by_organization: BTreeMap<String, u64>,
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub generated_at: Option<OffsetDateTime>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl PermitService {
	/// Four sequential row queries counted client-side. Any failure yields zeroed counts with
	/// `error` set.
	pub async fn statistics(&self) -> QueryOutcome<PermitStatistics> {
		match self.collect_statistics().await {
			Ok(stats) => {
				tracing::info!(total = stats.total, expired = stats.expired, "Generated permit statistics.");

				QueryOutcome::Complete(stats)
			},
			Err(err) => {
				let fallback = PermitStatistics { error: Some(err.to_string()), ..Default::default() };

				QueryOutcome::failed("statistics", fallback, err)
			},
		}
	}

	async fn collect_statistics(&self) -> Result<PermitStatistics> {
		let now = self.gateways.clock.now();
		let total_spec = QuerySpec::select(&[Field::PermitNumber]);
		let expired_spec = QuerySpec::select(&[Field::PermitNumber])
			.where_before(Field::ExpirationDate, "@today", format_date(now.date()))
			.where_equals(Field::PermitType, "@permitType", PermitType::Plo.as_str());
		let type_spec = QuerySpec::select(&[Field::PermitType]);
		let organization_spec = QuerySpec::select(&[Field::Organization]);

		let total = count_rows(&self.gateways.records.query(&total_spec).await?);
		let expired = count_rows(&self.gateways.records.query(&expired_spec).await?);
		let by_type = group_rows(Field::PermitType, &self.gateways.records.query(&type_spec).await?);
		let by_organization =
			group_rows(Field::Organization, &self.gateways.records.query(&organization_spec).await?);

		Ok(PermitStatistics {
			total,
			expired,
			active: total.saturating_sub(expired),
			by_type,
			by_organization,
			generated_at: Some(now),
			error: None,
		})
	}
}

pub fn count_rows(rows: &[Value]) -> u64 {
	u64::try_from(rows.len()).unwrap_or(u64::MAX)
}

/// Counts joined rows per value of `field`. Rows without a string value land in [`UNKNOWN_GROUP`].
pub fn group_rows(field: Field, rows: &[Value]) -> BTreeMap<String, u64> {
	let mut groups = BTreeMap::new();

	for row in rows {
		let key = row.get(field.name()).and_then(Value::as_str).unwrap_or(UNKNOWN_GROUP);
		let slot = groups.entry(key.to_string()).or_insert(0_u64);

		*slot = slot.saturating_add(1);
	}

	groups
}
