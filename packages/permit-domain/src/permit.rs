use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filters::DateField;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum PermitType {
	#[serde(rename = "PLO")]
	Plo,
	#[serde(rename = "KKPR/KKPRL")]
	KkprKkprl,
	#[serde(rename = "Ijin Lingkungan")]
	IjinLingkungan,
}
impl PermitType {
	pub const ALL: [Self; 3] = [Self::Plo, Self::KkprKkprl, Self::IjinLingkungan];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plo => "PLO",
			Self::KkprKkprl => "KKPR/KKPRL",
			Self::IjinLingkungan => "Ijin Lingkungan",
		}
	}

	/// Only PLO permits carry an expiration date.
	pub fn carries_expiration(self) -> bool {
		matches!(self, Self::Plo)
	}
}
impl fmt::Display for PermitType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A stored permit document bundling one or more permit entries.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitDocument {
	pub document_title: String,
	pub permit_type: PermitType,
	pub organization: String,
	pub filepath: String,
	#[serde(default)]
	pub permits: Vec<PermitEntry>,
}
impl PermitDocument {
	/// One flattened record per nested entry, in entry order.
	pub fn records(&self) -> impl Iterator<Item = PermitRecord> + '_ {
		self.permits.iter().map(|entry| PermitRecord {
			document_title: Some(self.document_title.clone()),
			permit_type: Some(self.permit_type.as_str().to_string()),
			organization: Some(self.organization.clone()),
			filepath: Some(self.filepath.clone()),
			permit_number: Some(entry.permit_number.clone()),
			issue_date: Some(entry.issue_date.clone()),
			expiration_date: entry.expiration_date.clone(),
			permit_summary: Some(entry.permit_summary.clone()),
			installation: Some(entry.installation.clone()),
		})
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitEntry {
	pub permit_number: String,
	pub issue_date: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expiration_date: Option<String>,
	pub permit_summary: String,
	pub installation: String,
}

/// A document joined with one of its entries, restricted to the selected fields.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitRecord {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub document_title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub permit_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub organization: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filepath: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub permit_number: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub issue_date: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expiration_date: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub permit_summary: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub installation: Option<String>,
}
impl PermitRecord {
	pub fn date(&self, field: DateField) -> Option<&str> {
		match field {
			DateField::IssueDate => self.issue_date.as_deref(),
			DateField::ExpirationDate => self.expiration_date.as_deref(),
		}
	}
}
