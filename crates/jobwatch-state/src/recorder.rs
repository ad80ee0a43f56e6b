//! ResultRecorder — append-only CSV persistence for check results.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use jobwatch_core::{CheckResult, FIELD_NAMES};

use crate::error::{RecordError, RecordResult};

/// Appends [`CheckResult`] rows to a CSV log file.
#[derive(Debug, Clone)]
pub struct ResultRecorder {
    path: PathBuf,
}

impl ResultRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one result, writing the header first if the log is empty.
    pub fn append(&self, result: &CheckResult) -> RecordResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| RecordError::Open {
                path: self.path.clone(),
                source,
            })?;

        let needs_header = file
            .metadata()
            .map_err(|source| RecordError::Open {
                path: self.path.clone(),
                source,
            })?
            .len()
            == 0;

        let buf = encode_rows(result, needs_header)?;
        file.write_all(&buf).map_err(|source| RecordError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = ?self.path, header = needs_header, status = %result.status(), "result appended");
        Ok(())
    }
}

/// Serialize the (optional) header and one data row into a single buffer.
fn encode_rows(result: &CheckResult, with_header: bool) -> RecordResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    if with_header {
        writer.write_record(FIELD_NAMES)?;
    }
    writer.serialize(result)?;
    writer
        .into_inner()
        .map_err(|e| RecordError::Serialize(e.into_error().into()))
}
