//! Unit tests for the remote module.

mod executor_tests;
mod pagination_tests;
mod support;
mod token_tests;
