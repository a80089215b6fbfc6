use chrono::{ DateTime, Local };
use serde::Serialize;
use std::fs::{ self, File };
use std::path::{ Path, PathBuf };
use thiserror::Error;

use crate::models::participant::Participant;

pub const ERROR_SENTINEL: &str = "ERROR";

const FILE_PREFIX: &str = "results";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to prepare output location '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write result row: {0}")]
    Csv(#[from] csv::Error),
}

/// One line of the results file. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub participant_id: String,
    pub age: String,
    pub gender: String,
    pub education: String,
    pub state: String,
    pub block: String,
    pub question: String,
    pub response: String,
}

impl ResultRow {
    pub fn new(participant: &Participant, block: &str, question: &str, response: &str) -> Self {
        Self {
            participant_id: participant.id.clone(),
            age: participant.age.clone(),
            gender: participant.gender.clone(),
            education: participant.education.clone(),
            state: participant.state.clone(),
            block: block.to_string(),
            question: question.to_string(),
            response: response.to_string(),
        }
    }
}

/// `gpt-4.1-mini` becomes `gpt_4_1_mini`.
pub fn model_tag(model: &str) -> String {
    model.replace(&['.', '-'][..], "_")
}

pub fn output_path(output_dir: &Path, model: &str, at: DateTime<Local>) -> PathBuf {
    output_dir.join(
        format!("{}_{}_{}.csv", FILE_PREFIX, model_tag(model), at.format("%Y%m%d_%H%M%S"))
    )
}

/// Appends result rows to a CSV file, flushing after every row so a killed
/// run keeps everything already answered.
pub struct ResultWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl ResultWriter {
    /// Creates `output_dir` if needed and opens a fresh, timestamped results file in it.
    pub fn create(output_dir: &Path, model: &str) -> Result<Self, OutputError> {
        fs::create_dir_all(output_dir).map_err(|source| OutputError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;
        Self::open(output_path(output_dir, model, Local::now()))
    }

    pub fn open(path: PathBuf) -> Result<Self, OutputError> {
        let file = File::create(&path).map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;
        // Header goes out up front so even a run with no rows leaves a valid file.
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record([
            "participant_id",
            "age",
            "gender",
            "education",
            "state",
            "block",
            "question",
            "response",
        ])?;
        writer.flush().map_err(|source| OutputError::Io { path: path.clone(), source })?;

        Ok(Self { path, writer, rows_written: 0 })
    }

    pub fn write_row(&mut self, row: &ResultRow) -> Result<(), OutputError> {
        self.writer.serialize(row)?;
        self.writer.flush().map_err(|source| OutputError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}
