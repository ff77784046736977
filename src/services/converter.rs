//! Entry points tying parsing, validation and generation together.

use crate::domain::{ConvertError, UnitFileOptions};
use crate::parser::{CommandInput, parse_compose, parse_run_command};
use crate::services::generator::generate;
use crate::services::orchestrator::{GeneratedUnit, Orchestrator};
use tracing::info;

/// Converts a `docker run` / `podman run` command into one unit.
pub fn convert_run_command(
    input: impl Into<CommandInput>,
    options: &UnitFileOptions,
) -> Result<GeneratedUnit, ConvertError> {
    let config = parse_run_command(input);
    config.validate()?;

    let service = config.default_name();
    info!("Converted run command for {}", service);

    Ok(GeneratedUnit {
        file_name: config.unit_file_name(),
        contents: generate(&config, options),
        service,
    })
}

/// Converts a compose manifest into one unit per service. The first service
/// failing validation aborts the conversion.
pub fn convert_compose(
    text: &str,
    options: &UnitFileOptions,
) -> Result<Vec<GeneratedUnit>, ConvertError> {
    let project = parse_compose(text)?;

    for service in &project.services {
        service
            .container
            .validate()
            .map_err(|source| ConvertError::ServiceValidation {
                service: service.name.clone(),
                source,
            })?;
    }

    Ok(Orchestrator::new(options.clone()).generate_all(&project))
}
