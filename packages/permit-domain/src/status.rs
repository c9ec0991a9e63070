use serde::Serialize;
use time::Date;

use crate::dates;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PermitStatus {
	Active,
	#[serde(rename = "Expiring Soon")]
	ExpiringSoon,
	Expired,
}
impl PermitStatus {
	pub fn from_days_remaining(days_remaining: i64, threshold_days: i64) -> Self {
		if days_remaining < 0 {
			Self::Expired
		} else if days_remaining <= threshold_days {
			Self::ExpiringSoon
		} else {
			Self::Active
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Active => "Active",
			Self::ExpiringSoon => "Expiring Soon",
			Self::Expired => "Expired",
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusReport {
	pub status: PermitStatus,
	pub days_remaining: Option<i64>,
}
impl StatusReport {
	/// Permits without a parseable expiration date are active.
	pub fn evaluate(expiration_date: Option<&str>, today: Date, threshold_days: i64) -> Self {
		let Some(expires_on) = expiration_date.and_then(dates::parse_date) else {
			return Self { status: PermitStatus::Active, days_remaining: None };
		};
		let days_remaining = dates::days_between(today, expires_on);

		Self {
			status: PermitStatus::from_days_remaining(days_remaining, threshold_days),
			days_remaining: Some(days_remaining),
		}
	}

	pub fn describe(&self) -> Option<String> {
		let days = self.days_remaining?;

		if days < 0 {
			Some(format!("Expired {} days ago", days.unsigned_abs()))
		} else {
			Some(format!("Expires in {days} days"))
		}
	}
}
