//! Unit tests for the batch module.

mod support;
