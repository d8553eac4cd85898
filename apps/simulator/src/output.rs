//! JSON-lines output for simulation results.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::simulator::GameReport;

pub struct ReportWriter {
    writer: Box<dyn Write + Send>,
    path: Option<PathBuf>,
}

impl ReportWriter {
    /// Write to `path`, or to stdout when no path is given.
    pub fn new(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(BufWriter::new(io::stdout())),
                path: None,
            });
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn write_game(&mut self, report: &GameReport) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(report)?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
