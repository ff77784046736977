//! Error types for the conversion pipeline.

use thiserror::Error;

/// Fatal problems found while decoding a compose manifest.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// The document root is not a mapping.
    #[error("compose file must be a mapping at the top level")]
    NotAnObject,

    /// `services` is missing, empty or not a mapping.
    #[error("compose file must define at least one service under 'services'")]
    MissingServices,

    /// A service has neither `image` nor `build`.
    #[error("service '{service}' must specify either 'image' or 'build'")]
    MissingImage { service: String },

    /// A top-level feature with no Quadlet equivalent.
    #[error("unsupported compose feature: '{0}'")]
    UnsupportedFeature(String),

    /// A service definition has the wrong shape.
    #[error("invalid definition for service '{service}': {source}")]
    InvalidService {
        service: String,
        #[source]
        source: serde_yml::Error,
    },
}

/// Every problem found by [`ContainerConfig::validate`](super::ContainerConfig::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .errors.join(", "))]
pub struct ValidationError {
    errors: Vec<String>,
}

impl ValidationError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Errors returned by the conversion entry points.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Validation failed for one service of a manifest.
    #[error("service '{service}': {source}")]
    ServiceValidation {
        service: String,
        #[source]
        source: ValidationError,
    },
}
