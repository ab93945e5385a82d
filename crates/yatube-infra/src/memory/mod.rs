//! In-memory repositories - used for tests and when no database is configured.

mod store;

pub use store::{InMemoryGroupRepository, InMemoryPostRepository, InMemoryStore, InMemoryUserRepository};
