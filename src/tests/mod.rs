//! Helpers shared by unit, doc and integration tests.

pub mod support;
