use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::types::{MunicipalityRef, MunicipalityResults};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// Spreadsheet applications detect the encoding from this signature.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const FIXED_COLUMNS: [&str; 5] = ["code", "location", "registered", "envelopes", "valid"];

/// Streams result rows to CSV, one row per municipality.
///
/// The party column order is pinned at construction from the first
/// municipality processed; every row then carries exactly
/// `5 + parties.len()` columns, with parties missing from a page written
/// as 0. Rows are flushed as they are written, so an aborted run leaves
/// the completed prefix on disk.
pub struct ResultsWriter<W: Write> {
    writer: csv::Writer<W>,
    parties: Vec<String>,
}

impl ResultsWriter<File> {
    pub fn from_path(path: impl AsRef<Path>, parties: Vec<String>) -> Result<Self, WriteError> {
        let file = File::create(path)?;
        Self::from_writer(file, parties)
    }
}

impl<W: Write> ResultsWriter<W> {
    pub fn from_writer(mut inner: W, parties: Vec<String>) -> Result<Self, WriteError> {
        inner.write_all(UTF8_BOM)?;
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(
            FIXED_COLUMNS
                .iter()
                .copied()
                .chain(parties.iter().map(String::as_str)),
        )?;
        writer.flush()?;
        Ok(Self { writer, parties })
    }

    pub fn write_row(
        &mut self,
        municipality: &MunicipalityRef,
        results: &MunicipalityResults,
    ) -> Result<(), WriteError> {
        let mut record = Vec::with_capacity(FIXED_COLUMNS.len() + self.parties.len());
        record.push(municipality.code.clone());
        record.push(municipality.name.clone());
        record.push(results.summary.registered.to_string());
        record.push(results.summary.envelopes.to_string());
        record.push(results.summary.valid.to_string());
        for party in &self.parties {
            record.push(results.votes.get(party).unwrap_or(0).to_string());
        }
        self.writer.write_record(&record)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, WriteError> {
        self.writer
            .into_inner()
            .map_err(|e| WriteError::Io(e.into_error()))
    }
}
