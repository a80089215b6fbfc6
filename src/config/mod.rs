pub mod prompt;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cli::Args;
use crate::context::DEFAULT_MAX_RECENT_PAIRS;
use crate::llm::{ LlmConfig, LlmType, ParseLlmTypeError };
use crate::llm::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY not found. Please set it in a .env file.")]
    MissingApiKey,
    #[error(transparent)]
    LlmType(#[from] ParseLlmTypeError),
    #[error("Invalid value for {name}: {value} (expected a non-negative number of seconds)")]
    InvalidDuration { name: &'static str, value: f64 },
    #[error("max_retries must be at least 1")]
    ZeroRetries,
}

/// Everything the experiment runner needs, fixed before the first call.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub llm: LlmConfig,
    pub temperature: f32,
    pub demographics_file: PathBuf,
    pub questions_file: PathBuf,
    pub output_dir: PathBuf,
    pub retry: RetryPolicy,
    pub rate_limit_pause: Duration,
    pub context_window: usize,
}

impl ExperimentConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_key = args.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        if args.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }

        Ok(Self {
            llm: LlmConfig {
                llm_type: args.llm_type.parse::<LlmType>()?,
                api_key: api_key.to_string(),
                model: args.model.clone(),
                base_url: args.base_url.clone().filter(|u| !u.trim().is_empty()),
            },
            temperature: args.temperature,
            demographics_file: PathBuf::from(&args.demographics_file),
            questions_file: PathBuf::from(&args.questions_file),
            output_dir: PathBuf::from(&args.output_dir),
            retry: RetryPolicy {
                max_retries: args.max_retries,
                delay: seconds("retry_delay_secs", args.retry_delay_secs)?,
            },
            rate_limit_pause: seconds("rate_limit_pause_secs", args.rate_limit_pause_secs)?,
            context_window: args.context_window,
        })
    }

    /// Config with the stock pacing and the given inputs; handy for embedding and tests.
    pub fn with_defaults(
        llm: LlmConfig,
        demographics_file: impl Into<PathBuf>,
        questions_file: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>
    ) -> Self {
        Self {
            llm,
            temperature: 1.0,
            demographics_file: demographics_file.into(),
            questions_file: questions_file.into(),
            output_dir: output_dir.into(),
            retry: RetryPolicy::default(),
            rate_limit_pause: Duration::from_millis(500),
            context_window: DEFAULT_MAX_RECENT_PAIRS,
        }
    }
}

fn seconds(name: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDuration { name, value })
}
