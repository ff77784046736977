pub mod domain;
pub mod infra;
pub mod parser;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    ContainerConfig, ConvertError, ParseError, UnitFileOptions, ValidationError,
};
pub use parser::{parse_compose, parse_run_command};
pub use services::{GeneratedUnit, Orchestrator, convert_compose, convert_run_command, generate};
