pub mod config;
pub mod unit_writer;

pub use config::{AppConfig, load_app_config};
pub use unit_writer::{DirectoryWriter, DryRunWriter, UnitSink, write_units};
