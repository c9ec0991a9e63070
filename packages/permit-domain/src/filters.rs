use serde::{Deserialize, Serialize};

use crate::permit::PermitRecord;

/// Year comparison applied to a date field.
///
/// `Greater` and `Less` include the boundary year (`>=` and `<=`). There is no strict variant.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum YearOperator {
	Equal,
	Greater,
	Less,
}
impl YearOperator {
	pub fn symbol(self) -> &'static str {
		match self {
			Self::Equal => "=",
			Self::Greater => ">=",
			Self::Less => "<=",
		}
	}

	pub fn matches(self, actual: i32, target: i32) -> bool {
		match self {
			Self::Equal => actual == target,
			Self::Greater => actual >= target,
			Self::Less => actual <= target,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	#[default]
	Latest,
	Earliest,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DateField {
	IssueDate,
	ExpirationDate,
}

/// Stable sort on a date field. A missing date sorts as the empty string.
pub fn sort_records(records: &mut [PermitRecord], field: DateField, order: SortOrder) {
	match order {
		SortOrder::Latest => records
			.sort_by(|a, b| b.date(field).unwrap_or_default().cmp(a.date(field).unwrap_or_default())),
		SortOrder::Earliest => records
			.sort_by(|a, b| a.date(field).unwrap_or_default().cmp(b.date(field).unwrap_or_default())),
	}
}
