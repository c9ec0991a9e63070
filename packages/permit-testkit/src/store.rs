use std::sync::Mutex;

use serde_json::{Map, Value};

use permit_domain::{PermitDocument, PermitRecord};
use permit_service::{BoxFuture, Error, RecordStore, Result};
use permit_storage::query::{Field, Predicate, QuerySpec};

/// SQL keywords the Cosmos REST gateway refuses across partitions without a query plan.
const PLANNED_QUERY_KEYWORDS: [&str; 7] =
	["COUNT(", "SUM(", "AVG(", "MIN(", "MAX(", "GROUP BY", "DISTINCT"];

/// Evaluates [`QuerySpec`] against fixture documents with Cosmos DB semantics: string ordering for
/// date comparisons, undefined fields failing every comparison, and undefined properties omitted
/// from projected rows.
pub struct InMemoryRecordStore {
	documents: Vec<PermitDocument>,
	queries: Mutex<Vec<QuerySpec>>,
	reject_planned_queries: bool,
}
impl InMemoryRecordStore {
	pub fn new(documents: Vec<PermitDocument>) -> Self {
		Self { documents, queries: Mutex::new(Vec::new()), reject_planned_queries: false }
	}

	/// Behaves like a multi-partition container reached over plain REST: rendered SQL that needs
	/// a query plan fails with a storage error.
	pub fn multi_partition(documents: Vec<PermitDocument>) -> Self {
		Self { reject_planned_queries: true, ..Self::new(documents) }
	}

	/// Every query received so far, in arrival order.
	pub fn recorded_queries(&self) -> Vec<QuerySpec> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn evaluate(&self, spec: &QuerySpec) -> Result<Vec<Value>> {
		if self.reject_planned_queries {
			let sql = spec.render();

			if PLANNED_QUERY_KEYWORDS.iter().any(|keyword| sql.contains(keyword)) {
				return Err(Error::Storage {
					message: format!(
						"Cross-partition query requires a query plan and was rejected: {sql}"
					),
				});
			}
		}

		let mut matched = Vec::new();

		for row in self.rows(spec.join_entries) {
			if matches_all(spec, &row)? {
				matched.push(row);
			}
		}

		Ok(matched.iter().map(|row| project(&spec.fields, row)).collect())
	}

	fn rows(&self, join_entries: bool) -> Vec<PermitRecord> {
		if join_entries {
			return self.documents.iter().flat_map(PermitDocument::records).collect();
		}

		self.documents
			.iter()
			.map(|document| PermitRecord {
				document_title: Some(document.document_title.clone()),
				permit_type: Some(document.permit_type.as_str().to_string()),
				organization: Some(document.organization.clone()),
				filepath: Some(document.filepath.clone()),
				..Default::default()
			})
			.collect()
	}
}
impl RecordStore for InMemoryRecordStore {
	fn query<'a>(&'a self, spec: &'a QuerySpec) -> BoxFuture<'a, Result<Vec<Value>>> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).push(spec.clone());

		let result = self.evaluate(spec);

		Box::pin(async move { result })
	}
}

/// Fails every query with a storage error.
pub struct FailingRecordStore {
	pub message: String,
}
impl FailingRecordStore {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}
impl RecordStore for FailingRecordStore {
	fn query<'a>(&'a self, _spec: &'a QuerySpec) -> BoxFuture<'a, Result<Vec<Value>>> {
		let message = self.message.clone();

		Box::pin(async move { Err(Error::Storage { message }) })
	}
}

fn field_value(record: &PermitRecord, field: Field) -> Option<&str> {
	let value = match field {
		Field::DocumentTitle => &record.document_title,
		Field::PermitType => &record.permit_type,
		Field::Organization => &record.organization,
		Field::Filepath => &record.filepath,
		Field::PermitNumber => &record.permit_number,
		Field::IssueDate => &record.issue_date,
		Field::ExpirationDate => &record.expiration_date,
		Field::PermitSummary => &record.permit_summary,
		Field::Installation => &record.installation,
	};

	value.as_deref()
}

fn matches_all(spec: &QuerySpec, row: &PermitRecord) -> Result<bool> {
	for predicate in &spec.predicates {
		if !matches(spec, predicate, row)? {
			return Ok(false);
		}
	}

	Ok(true)
}

fn matches(spec: &QuerySpec, predicate: &Predicate, row: &PermitRecord) -> Result<bool> {
	let value = field_value(row, predicate.field());

	Ok(match predicate {
		Predicate::Equals { param, .. } => {
			let expected = string_param(spec, param)?;

			value == Some(expected)
		},
		Predicate::YearCompare { operator, param, .. } => {
			let target = spec
				.parameter(param)
				.and_then(Value::as_i64)
				.and_then(|year| i32::try_from(year).ok())
				.ok_or_else(|| unbound(param))?;

			value
				.and_then(|value| value.get(..4))
				.and_then(|year| year.parse::<i32>().ok())
				.is_some_and(|year| operator.matches(year, target))
		},
		Predicate::Before { param, .. } => {
			let bound = string_param(spec, param)?;

			value.is_some_and(|value| value < bound)
		},
		Predicate::Between { start, end, .. } => {
			let start = string_param(spec, start)?;
			let end = string_param(spec, end)?;

			value.is_some_and(|value| start <= value && value <= end)
		},
		Predicate::ContainsIgnoreCase { param, .. } => {
			let needle = string_param(spec, param)?.to_lowercase();

			value.is_some_and(|value| value.to_lowercase().contains(&needle))
		},
		Predicate::IsDefined { .. } => value.is_some(),
	})
}

fn string_param<'a>(spec: &'a QuerySpec, name: &str) -> Result<&'a str> {
	spec.parameter(name).and_then(Value::as_str).ok_or_else(|| unbound(name))
}

fn unbound(name: &str) -> Error {
	Error::Storage { message: format!("Parameter {name} is not bound.") }
}

fn project(fields: &[Field], row: &PermitRecord) -> Value {
	let mut object = Map::new();

	for field in fields {
		if let Some(value) = field_value(row, *field) {
			object.insert(field.name().to_string(), Value::from(value));
		}
	}

	Value::Object(object)
}
