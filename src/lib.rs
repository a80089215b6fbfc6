pub mod cli;
pub mod config;
pub mod context;
pub mod experiment;
pub mod llm;
pub mod loader;
pub mod models;
pub mod output;

use cli::Args;
use config::ExperimentConfig;
use experiment::{ ExperimentRunner, RunSummary };
use llm::chat::new_client as new_chat_client;
use log::info;
use std::error::Error;

pub async fn run(args: Args) -> Result<RunSummary, Box<dyn Error + Send + Sync>> {
    let config = ExperimentConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Chat LLM Type: {}", config.llm.llm_type);
    info!("Model: {}", config.llm.model);
    info!("Base URL: {}", config.llm.resolved_base_url());
    info!("Temperature: {}", config.temperature);
    info!("Demographics File: {}", config.demographics_file.display());
    info!("Questions File: {}", config.questions_file.display());
    info!("Output Dir: {}", config.output_dir.display());
    info!("Max Retries: {}", config.retry.max_retries);
    info!("Retry Delay: {:?}", config.retry.delay);
    info!("Rate Limit Pause: {:?}", config.rate_limit_pause);
    info!("Context Window: {} pairs", config.context_window);
    info!("-------------------------");

    let chat_client = new_chat_client(&config.llm)?;
    let mut runner = ExperimentRunner::new(config, chat_client);
    let summary = runner.run().await?;

    Ok(summary)
}
