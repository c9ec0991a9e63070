pub mod dates;
pub mod filters;
pub mod permit;
pub mod status;

pub use filters::{DateField, SortOrder, YearOperator, sort_records};
pub use permit::{PermitDocument, PermitEntry, PermitRecord, PermitType};
pub use status::{PermitStatus, StatusReport};
