//! Helpers for tests. Enabled with the `test_utils` feature.
pub mod prepare_env;
mod scripted_oracle;

pub use scripted_oracle::{ScriptedOracle, ScriptedResponse};
