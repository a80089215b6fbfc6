use log::{ error, info };
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ExperimentConfig;
use crate::config::prompt::{ intro_prompt, question_prompt };
use crate::llm::chat::ChatClient;
use crate::llm::retry::{ RetryingChatClient, Sleeper, TokioSleeper };
use crate::loader::{ load_demographics, load_questions, LoadError };
use crate::models::chat::{ ChatMessage, Conversation };
use crate::models::participant::{ total_questions, Participant, QuestionBlock };
use crate::output::{ OutputError, ResultRow, ResultWriter, ERROR_SENTINEL };

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// How one participant's session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The intro exchange went through and every question got a row.
    Completed {
        conversation: Conversation,
        answered: usize,
        errors: usize,
    },
    /// The intro call failed after retries; nothing was written.
    IntroFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub participants_completed: usize,
    pub participants_skipped: usize,
    pub rows_written: usize,
    pub errors: usize,
}

pub struct ExperimentRunner {
    config: ExperimentConfig,
    client: RetryingChatClient,
    chat_client: Arc<dyn ChatClient>,
    sleeper: Arc<dyn Sleeper>,
    rng: StdRng,
}

impl ExperimentRunner {
    pub fn new(config: ExperimentConfig, chat_client: Arc<dyn ChatClient>) -> Self {
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
        let client = RetryingChatClient::new(
            chat_client.clone(),
            config.retry,
            config.temperature,
            sleeper.clone()
        );
        Self {
            config,
            client,
            chat_client,
            sleeper,
            rng: StdRng::from_entropy(),
        }
    }

    /// Swaps the clock used for retry delays and rate-limit pauses.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.client = RetryingChatClient::new(
            self.chat_client.clone(),
            self.config.retry,
            self.config.temperature,
            sleeper.clone()
        );
        self.sleeper = sleeper;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Loads both input files, opens a new results file and simulates every participant.
    pub async fn run(&mut self) -> Result<RunSummary, RunError> {
        let participants = load_demographics(&self.config.demographics_file)?;
        let blocks = load_questions(&self.config.questions_file)?;
        info!(
            "Loaded {} participants and {} blocks ({} questions)",
            participants.len(),
            blocks.len(),
            total_questions(&blocks)
        );

        let mut writer = ResultWriter::create(&self.config.output_dir, &self.client.model())?;
        let summary = self.run_with(&participants, &blocks, &mut writer).await?;

        info!("Results saved to: {}", summary.output_path.display());
        Ok(summary)
    }

    pub async fn run_with(
        &mut self,
        participants: &[Participant],
        blocks: &[QuestionBlock],
        writer: &mut ResultWriter
    ) -> Result<RunSummary, OutputError> {
        let mut summary = RunSummary {
            output_path: writer.path().to_path_buf(),
            participants_completed: 0,
            participants_skipped: 0,
            rows_written: 0,
            errors: 0,
        };

        for participant in participants {
            match self.run_participant(participant, blocks, writer).await? {
                SessionOutcome::Completed { answered, errors, .. } => {
                    summary.participants_completed += 1;
                    summary.rows_written += answered + errors;
                    summary.errors += errors;
                }
                SessionOutcome::IntroFailed => {
                    summary.participants_skipped += 1;
                }
            }
        }

        info!(
            "Run finished: {} participants completed, {} skipped, {} rows ({} errors)",
            summary.participants_completed,
            summary.participants_skipped,
            summary.rows_written,
            summary.errors
        );
        Ok(summary)
    }

    /// Simulates one participant from a fresh conversation.
    ///
    /// Only a failure to write the results file is returned as an error; API
    /// failures end up as `ERROR` rows or, for the intro, a skipped participant.
    pub async fn run_participant(
        &mut self,
        participant: &Participant,
        blocks: &[QuestionBlock],
        writer: &mut ResultWriter
    ) -> Result<SessionOutcome, OutputError> {
        info!("Starting participant {}...", participant.id);

        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::user(intro_prompt(participant)));

        let Some(intro_reply) = self.client.ask(conversation.messages()).await else {
            error!("Intro prompt failed for {} after retries.", participant.id);
            return Ok(SessionOutcome::IntroFailed);
        };
        conversation.push(ChatMessage::assistant(intro_reply));
        info!("Intro prompt delivered.");
        info!("Context size: {} messages", conversation.len());

        let mut answered = 0;
        let mut errors = 0;

        for block in blocks {
            info!("Starting Block {} for participant {}...", block.name, participant.id);

            let mut order: Vec<&String> = block.questions.iter().collect();
            order.shuffle(&mut self.rng);

            for question in order {
                let prompt = question_prompt(question);

                conversation = conversation.trimmed(self.config.context_window);
                conversation.push(ChatMessage::user(prompt));

                let response = match self.client.ask(conversation.messages()).await {
                    Some(answer) => {
                        conversation.push(ChatMessage::assistant(answer.clone()));
                        info!("{} | {} | {} -> {}", participant.id, block.name, question, answer);
                        info!("Context size: {} messages", conversation.len());
                        self.sleeper.sleep(self.config.rate_limit_pause).await;
                        answered += 1;
                        answer
                    }
                    None => {
                        error!("Error for {} | {} after retries.", participant.id, question);
                        errors += 1;
                        ERROR_SENTINEL.to_string()
                    }
                };

                writer.write_row(&ResultRow::new(participant, &block.name, question, &response))?;
            }
        }

        Ok(SessionOutcome::Completed { conversation, answered, errors })
    }
}
