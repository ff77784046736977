use crate::services::GeneratedUnit;
use anyhow::{Context, Result};
use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Destination for generated unit files
pub trait UnitSink: Debug {
    /// Persist (or display) one unit
    fn write_unit(&mut self, unit: &GeneratedUnit) -> Result<()>;
}

/// Writes each unit as `<dir>/<file_name>`, creating the directory on demand.
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    dir: PathBuf,
}

impl DirectoryWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl UnitSink for DirectoryWriter {
    fn write_unit(&mut self, unit: &GeneratedUnit) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {:?}", self.dir))?;

        let target = self.dir.join(&unit.file_name);
        fs::write(&target, &unit.contents).with_context(|| format!("writing {:?}", target))?;

        info!("Wrote {:?}", target);
        Ok(())
    }
}

/// Prints units instead of writing them, each preceded by a `# <file>` header.
#[derive(Debug)]
pub struct DryRunWriter<W: Write + Debug> {
    out: W,
    written: usize,
}

impl<W: Write + Debug> DryRunWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Debug> UnitSink for DryRunWriter<W> {
    fn write_unit(&mut self, unit: &GeneratedUnit) -> Result<()> {
        if self.written > 0 {
            writeln!(self.out)?;
        }
        writeln!(self.out, "# {}", unit.file_name)?;
        self.out
            .write_all(unit.contents.as_bytes())
            .with_context(|| format!("printing {}", unit.file_name))?;
        self.written += 1;
        Ok(())
    }
}

/// Sends every unit to `sink`, stopping at the first failure.
pub fn write_units(sink: &mut dyn UnitSink, units: &[GeneratedUnit]) -> Result<()> {
    for unit in units {
        sink.write_unit(unit)
            .with_context(|| format!("emitting unit for service '{}'", unit.service))?;
    }
    Ok(())
}
