//! In-memory gateways and fixtures for exercising permit queries without Azure.

mod fixtures;
mod store;
mod stubs;

pub use fixtures::{
	FIXTURE_TODAY, fixture_documents, service_with, test_config, test_embedding_config,
};
pub use store::{FailingRecordStore, InMemoryRecordStore};
pub use stubs::{FixedClock, StubEmbedding, StubSearch};
