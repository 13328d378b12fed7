//! Test utilities for metadata-manager integration tests
//!
//! - TestFixture: a catalog over a fresh JSON file in a temporary directory,
//!   or over the PostgreSQL database named by `METADATA_MANAGER_TEST_PG`

pub mod test_fixture;
