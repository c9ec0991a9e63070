//! Parameterized Cosmos DB SQL for the permit container.
//!
//! Every caller-supplied value travels as a named parameter; the rendered text only ever contains
//! field paths, operators, and parameter names. Queries project plain fields only. Aggregates,
//! `GROUP BY`, and `DISTINCT` need a client-side query plan across partitions, so counting and
//! deduplication happen on the returned rows.

use serde::Serialize;
use serde_json::Value;

use permit_domain::YearOperator;

/// Alias of the document root.
pub const DOCUMENT_ALIAS: &str = "c";
/// Alias of one nested permit entry when entries are joined.
pub const ENTRY_ALIAS: &str = "p";

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Field {
	DocumentTitle,
	PermitType,
	Organization,
	Filepath,
	PermitNumber,
	IssueDate,
	ExpirationDate,
	PermitSummary,
	Installation,
}
impl Field {
	pub const ALL: [Self; 9] = [
		Self::DocumentTitle,
		Self::PermitType,
		Self::Organization,
		Self::Filepath,
		Self::PermitNumber,
		Self::IssueDate,
		Self::ExpirationDate,
		Self::PermitSummary,
		Self::Installation,
	];

	/// Stored property name.
	pub fn name(self) -> &'static str {
		match self {
			Self::DocumentTitle => "documentTitle",
			Self::PermitType => "permitType",
			Self::Organization => "organization",
			Self::Filepath => "filepath",
			Self::PermitNumber => "permitNumber",
			Self::IssueDate => "issueDate",
			Self::ExpirationDate => "expirationDate",
			Self::PermitSummary => "permitSummary",
			Self::Installation => "installation",
		}
	}

	/// Whether the property lives on a nested entry rather than on the document.
	pub fn is_entry_field(self) -> bool {
		matches!(
			self,
			Self::PermitNumber
				| Self::IssueDate
				| Self::ExpirationDate
				| Self::PermitSummary
				| Self::Installation
		)
	}

	pub fn path(self) -> String {
		let alias = if self.is_entry_field() { ENTRY_ALIAS } else { DOCUMENT_ALIAS };

		format!("{alias}.{}", self.name())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
	Equals { field: Field, param: &'static str },
	/// Compares the four-digit year prefix of a date field.
	YearCompare { field: Field, operator: YearOperator, param: &'static str },
	/// Strictly earlier than the bound date.
	Before { field: Field, param: &'static str },
	/// Inclusive on both ends.
	Between { field: Field, start: &'static str, end: &'static str },
	ContainsIgnoreCase { field: Field, param: &'static str },
	IsDefined { field: Field },
}
impl Predicate {
	pub fn field(&self) -> Field {
		match self {
			Self::Equals { field, .. }
			| Self::YearCompare { field, .. }
			| Self::Before { field, .. }
			| Self::Between { field, .. }
			| Self::ContainsIgnoreCase { field, .. }
			| Self::IsDefined { field } => *field,
		}
	}

	fn render(&self) -> String {
		match self {
			Self::Equals { field, param } => format!("{} = {param}", field.path()),
			Self::YearCompare { field, operator, param } => format!(
				"StringToNumber(LEFT({}, 4)) {} {param}",
				field.path(),
				operator.symbol()
			),
			Self::Before { field, param } => format!("{} < {param}", field.path()),
			Self::Between { field, start, end } => {
				let path = field.path();

				format!("{path} >= {start} AND {path} <= {end}")
			},
			Self::ContainsIgnoreCase { field, param } =>
				format!("CONTAINS({}, {param}, true)", field.path()),
			Self::IsDefined { field } => {
				let path = field.path();

				format!("IS_DEFINED({path}) AND NOT IS_NULL({path})")
			},
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryParameter {
	pub name: String,
	pub value: Value,
}

/// A parameterized query against the permit container.
///
/// Built through the constructors and `where_*` methods, which keep predicates and parameter
/// bindings in step.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySpec {
	pub fields: Vec<Field>,
	pub join_entries: bool,
	pub predicates: Vec<Predicate>,
	pub parameters: Vec<QueryParameter>,
}
impl QuerySpec {
	/// Selects the given fields over the document-entry join, one row per entry.
	pub fn select(fields: &[Field]) -> Self {
		Self::new(fields, true)
	}

	/// Selects the given fields with one row per document, unless an entry field is involved.
	pub fn select_documents(fields: &[Field]) -> Self {
		Self::new(fields, fields.iter().any(|field| field.is_entry_field()))
	}

	pub fn where_equals(mut self, field: Field, param: &'static str, value: impl Into<Value>) -> Self {
		self.bind(param, value.into());
		self.push(Predicate::Equals { field, param })
	}

	pub fn where_year(
		mut self,
		field: Field,
		operator: YearOperator,
		param: &'static str,
		year: i32,
	) -> Self {
		self.bind(param, Value::from(year));
		self.push(Predicate::YearCompare { field, operator, param })
	}

	pub fn where_before(mut self, field: Field, param: &'static str, value: impl Into<Value>) -> Self {
		self.bind(param, value.into());
		self.push(Predicate::Before { field, param })
	}

	pub fn where_between(
		mut self,
		field: Field,
		start: (&'static str, Value),
		end: (&'static str, Value),
	) -> Self {
		self.bind(start.0, start.1);
		self.bind(end.0, end.1);
		self.push(Predicate::Between { field, start: start.0, end: end.0 })
	}

	pub fn where_contains_ignore_case(
		mut self,
		field: Field,
		param: &'static str,
		value: impl Into<Value>,
	) -> Self {
		self.bind(param, value.into());
		self.push(Predicate::ContainsIgnoreCase { field, param })
	}

	pub fn where_defined(self, field: Field) -> Self {
		self.push(Predicate::IsDefined { field })
	}

	pub fn parameter(&self, name: &str) -> Option<&Value> {
		self.parameters.iter().find(|param| param.name == name).map(|param| &param.value)
	}

	/// Renders the SQL text. Values stay in [`QuerySpec::parameters`].
	pub fn render(&self) -> String {
		let columns = self.fields.iter().map(|field| field.path()).collect::<Vec<_>>();
		let mut sql = format!("SELECT {} FROM {DOCUMENT_ALIAS}", columns.join(", "));

		if self.join_entries {
			sql.push_str(&format!(" JOIN {ENTRY_ALIAS} IN {DOCUMENT_ALIAS}.permits"));
		}
		if !self.predicates.is_empty() {
			let clauses = self.predicates.iter().map(Predicate::render).collect::<Vec<_>>();

			sql.push_str(" WHERE ");
			sql.push_str(&clauses.join(" AND "));
		}
		sql
	}

	fn new(fields: &[Field], join_entries: bool) -> Self {
		Self { fields: fields.to_vec(), join_entries, predicates: Vec::new(), parameters: Vec::new() }
	}

	fn push(mut self, predicate: Predicate) -> Self {
		if predicate.field().is_entry_field() {
			self.join_entries = true;
		}

		self.predicates.push(predicate);

		self
	}

	fn bind(&mut self, name: &'static str, value: Value) {
		match self.parameters.iter_mut().find(|param| param.name == name) {
			Some(existing) => existing.value = value,
			None => self.parameters.push(QueryParameter { name: name.to_string(), value }),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use crate::query::{Field, QuerySpec};
	use permit_domain::YearOperator;

	#[test]
	fn renders_year_filter_over_joined_entries() {
		let spec = QuerySpec::select(&[Field::DocumentTitle, Field::IssueDate])
			.where_year(Field::IssueDate, YearOperator::Greater, "@year", 2023)
			.where_equals(Field::PermitType, "@permitType", "PLO");

		assert_eq!(
			spec.render(),
			"SELECT c.documentTitle, p.issueDate FROM c JOIN p IN c.permits \
			 WHERE StringToNumber(LEFT(p.issueDate, 4)) >= @year AND c.permitType = @permitType"
		);
		assert_eq!(spec.parameter("@year"), Some(&json!(2023)));
		assert_eq!(spec.parameter("@permitType"), Some(&json!("PLO")));
	}

	#[test]
	fn rendered_text_never_contains_values() {
		let hostile = "x' OR 1=1 --";
		let spec = QuerySpec::select(&Field::ALL)
			.where_equals(Field::PermitNumber, "@permitNumber", hostile)
			.where_contains_ignore_case(Field::Installation, "@installation", hostile);
		let sql = spec.render();

		assert!(!sql.contains(hostile));
		assert!(sql.contains("CONTAINS(p.installation, @installation, true)"));
		assert_eq!(spec.parameters.len(), 2);
	}

	#[test]
	fn document_projection_skips_join() {
		let spec = QuerySpec::select_documents(&[Field::Organization])
			.where_defined(Field::Organization);

		assert_eq!(
			spec.render(),
			"SELECT c.organization FROM c \
			 WHERE IS_DEFINED(c.organization) AND NOT IS_NULL(c.organization)"
		);
		assert!(!spec.join_entries);
	}

	#[test]
	fn entry_fields_force_join() {
		assert!(QuerySpec::select_documents(&[Field::PermitNumber]).join_entries);

		let spec = QuerySpec::select_documents(&[Field::PermitType])
			.where_defined(Field::ExpirationDate);

		assert!(spec.join_entries);
		assert_eq!(
			spec.render(),
			"SELECT c.permitType FROM c JOIN p IN c.permits \
			 WHERE IS_DEFINED(p.expirationDate) AND NOT IS_NULL(p.expirationDate)"
		);
	}

	#[test]
	fn between_binds_both_bounds() {
		let spec = QuerySpec::select(&[Field::ExpirationDate]).where_between(
			Field::ExpirationDate,
			("@today", json!("2025-03-01")),
			("@endDate", json!("2025-03-31")),
		);

		assert!(spec.render().ends_with("p.expirationDate >= @today AND p.expirationDate <= @endDate"));
		assert_eq!(spec.parameter("@endDate"), Some(&json!("2025-03-31")));
	}
}
