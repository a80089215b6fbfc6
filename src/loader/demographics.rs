use log::debug;
use std::path::Path;

use super::{ read_input, LoadError };
use crate::models::participant::Participant;

const FIELD_COUNT: usize = 5;

pub fn load_demographics<P: AsRef<Path>>(path: P) -> Result<Vec<Participant>, LoadError> {
    let content = read_input(path.as_ref())?;
    Ok(parse_demographics(&content))
}

/// Parses `id, age, gender, education, state` lines.
///
/// Lines that do not split into exactly five fields are skipped without
/// complaint; file order is kept.
pub fn parse_demographics(content: &str) -> Vec<Participant> {
    let mut participants = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let parts: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if parts.len() != FIELD_COUNT {
            if !line.trim().is_empty() {
                debug!("Skipping demographics line {}: {} fields", line_no + 1, parts.len());
            }
            continue;
        }

        participants.push(Participant {
            id: parts[0].to_string(),
            age: parts[1].to_string(),
            gender: parts[2].to_string(),
            education: parts[3].to_string(),
            state: parts[4].to_string(),
        });
    }

    participants
}
