use serde::{ Serialize, Deserialize };

/// One simulated survey respondent, in demographics-file order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub age: String,
    pub gender: String,
    pub education: String,
    pub state: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    pub name: String,
    pub questions: Vec<String>,
}

impl QuestionBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), questions: Vec::new() }
    }
}

/// Total number of questions across every block.
pub fn total_questions(blocks: &[QuestionBlock]) -> usize {
    blocks.iter().map(|b| b.questions.len()).sum()
}
