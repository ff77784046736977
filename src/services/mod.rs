pub mod converter;
pub mod generator;
mod orchestrator;

pub use converter::{convert_compose, convert_run_command};
pub use generator::{escape_value, generate};
pub use orchestrator::{GeneratedUnit, Orchestrator, translate_restart};
