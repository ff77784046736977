use crate::domain::{ServiceOptions, UnitFileOptions};
use crate::parser::{ComposeProject, ComposeService};
use crate::services::generator::generate;
use tracing::{debug, info, warn};

/// One rendered unit file, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Compose service name, or the container's default name for run commands.
    pub service: String,
    pub file_name: String,
    pub contents: String,
}

/// Generates one unit per compose service, wiring cross-service options
/// (dependencies and restart policy) on top of the caller's defaults.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    defaults: UnitFileOptions,
}

impl Orchestrator {
    pub fn new(defaults: UnitFileOptions) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &UnitFileOptions {
        &self.defaults
    }

    /// Renders every service in manifest order.
    pub fn generate_all(&self, project: &ComposeProject) -> Vec<GeneratedUnit> {
        info!("Generating {} unit(s)", project.services.len());

        project
            .services
            .iter()
            .map(|service| self.generate_service(service))
            .collect()
    }

    fn generate_service(&self, service: &ComposeService) -> GeneratedUnit {
        let options = UnitFileOptions {
            unit: self.defaults.unit.with_dependencies(&service.depends_on),
            service: translate_restart(
                &service.name,
                service.container.restart.as_deref(),
                &self.defaults.service,
            ),
            ..self.defaults.clone()
        };

        debug!(
            "Service {} depends on [{}]",
            service.name,
            service.depends_on.join(", ")
        );

        GeneratedUnit {
            service: service.name.clone(),
            file_name: service.container.unit_file_name(),
            contents: generate(&service.container, &options),
        }
    }
}

/// Maps a compose restart policy onto the `[Service]` bag. Without a policy
/// the caller's bag is returned untouched.
pub fn translate_restart(
    service: &str,
    policy: Option<&str>,
    base: &ServiceOptions,
) -> ServiceOptions {
    let mut options = base.clone();

    match policy {
        None => {}
        Some("no") => options.restart = None,
        Some(policy @ ("always" | "on-failure")) => options.restart = Some(policy.to_string()),
        Some("unless-stopped") => options.restart = Some("always".to_string()),
        Some(other) => warn!(
            "Service '{}': restart policy '{}' has no systemd equivalent, keeping defaults",
            service, other
        ),
    }

    options
}
