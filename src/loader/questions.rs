use std::path::Path;

use super::{ read_input, LoadError };
use crate::models::participant::QuestionBlock;

pub const BLOCK_MARKER: &str = "# Block";

pub fn load_questions<P: AsRef<Path>>(path: P) -> Result<Vec<QuestionBlock>, LoadError> {
    let content = read_input(path.as_ref())?;
    Ok(parse_questions(&content))
}

/// Groups question lines under the `# Block ...` marker that precedes them.
///
/// Blocks keep first-seen order. A repeated block name starts that block over
/// in its original position.
pub fn parse_questions(content: &str) -> Vec<QuestionBlock> {
    let mut blocks: Vec<QuestionBlock> = Vec::new();
    let mut current: Option<usize> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with(BLOCK_MARKER) {
            let name = line.trim_start_matches('#').trim();
            let idx = match blocks.iter().position(|b| b.name == name) {
                Some(idx) => {
                    blocks[idx].questions.clear();
                    idx
                }
                None => {
                    blocks.push(QuestionBlock::new(name));
                    blocks.len() - 1
                }
            };
            current = Some(idx);
        } else if !line.is_empty() {
            if let Some(idx) = current {
                blocks[idx].questions.push(line.to_string());
            }
        }
    }

    blocks
}
