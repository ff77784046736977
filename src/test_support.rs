use crate::infra::UnitSink;
use crate::services::GeneratedUnit;
use anyhow::{Result, bail};

/// In-memory [`UnitSink`] that records every unit it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    units: Vec<GeneratedUnit>,
    fail_on: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes writing the unit with this file name fail.
    pub fn set_fail_on(&mut self, file_name: &str) {
        self.fail_on = Some(file_name.to_string());
    }

    pub fn units(&self) -> &[GeneratedUnit] {
        &self.units
    }

    pub fn file_names(&self) -> Vec<String> {
        self.units.iter().map(|u| u.file_name.clone()).collect()
    }

    pub fn contents_of(&self, file_name: &str) -> Option<&str> {
        self.units
            .iter()
            .find(|u| u.file_name == file_name)
            .map(|u| u.contents.as_str())
    }
}

impl UnitSink for MemorySink {
    fn write_unit(&mut self, unit: &GeneratedUnit) -> Result<()> {
        if self.fail_on.as_deref() == Some(unit.file_name.as_str()) {
            bail!("Mock failure on: {}", unit.file_name);
        }
        self.units.push(unit.clone());
        Ok(())
    }
}
