use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, groq, xai, deepseek)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub llm_type: String,

    /// Model identifier sent with every request; also used to name the output file
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-5-2025-08-07")]
    pub model: String,

    /// Base URL for the provider API (e.g., https://api.openai.com/v1)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the provider pick one if None
    pub base_url: Option<String>,

    /// API Key for the chat provider. Required.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sampling temperature for every request
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "1.0")]
    pub temperature: f32,

    // --- Survey Input/Output Args ---
    /// Path to the demographics file (id, age, gender, education, state per line)
    #[arg(long, env = "DEMOGRAPHICS_FILE", default_value = "demographics/demographics_2028_T1LC.txt")]
    pub demographics_file: String,

    /// Path to the block-annotated questions file
    #[arg(long, env = "QUESTIONS_FILE", default_value = "questions/questions_2028_T1LC.txt")]
    pub questions_file: String,

    /// Directory the results CSV is written into (created if missing)
    #[arg(long, env = "OUTPUT_DIR", default_value = "data_gpt_raw")]
    pub output_dir: String,

    // --- Pacing Args ---
    /// Attempts per API call before recording a failure
    #[arg(long, env = "MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    /// Seconds to wait between failed attempts
    #[arg(long, env = "RETRY_DELAY_SECS", default_value = "2.0")]
    pub retry_delay_secs: f64,

    /// Seconds to pause after each answered question
    #[arg(long, env = "RATE_LIMIT_PAUSE_SECS", default_value = "0.5")]
    pub rate_limit_pause_secs: f64,

    /// Recent question/answer pairs kept behind the persona introduction
    #[arg(long, env = "CONTEXT_WINDOW_PAIRS", default_value = "7")]
    pub context_window: usize,
}
