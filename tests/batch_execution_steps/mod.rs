//! Step definitions for batch execution scenarios.

mod given;
mod then;
mod when;
pub mod world;
