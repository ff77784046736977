pub mod container;
pub mod error;
pub mod options;

pub use container::{ContainerConfig, HealthCheck, NotifyMode};
pub use error::{ConvertError, ParseError, ValidationError};
pub use options::{GlobalArgs, InstallOptions, ServiceOptions, UnitFileOptions, UnitOptions};
