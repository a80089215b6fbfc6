pub mod demographics;
pub mod questions;

use std::fs;
use std::path::{ Path, PathBuf };
use thiserror::Error;

pub use demographics::{ load_demographics, parse_demographics };
pub use questions::{ load_questions, parse_questions, BLOCK_MARKER };

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read input file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn read_input(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
