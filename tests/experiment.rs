use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use forecast_panel::config::ExperimentConfig;
use forecast_panel::experiment::{ ExperimentRunner, SessionOutcome };
use forecast_panel::llm::chat::ChatClient;
use forecast_panel::llm::retry::Sleeper;
use forecast_panel::llm::{ LlmConfig, LlmError, LlmType };
use forecast_panel::loader::{ parse_demographics, parse_questions };
use forecast_panel::models::chat::{ ChatMessage, Role };
use forecast_panel::output::ResultWriter;

type Responder = dyn Fn(&[ChatMessage]) -> Result<String, LlmError> + Send + Sync;

struct ScriptedClient {
    respond: Box<Responder>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedClient {
    fn new(respond: impl Fn(&[ChatMessage]) -> Result<String, LlmError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self { respond: Box::new(respond), calls: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn complete(&self, messages: &[ChatMessage], _temperature: f32) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        (self.respond)(messages)
    }

    fn get_model(&self) -> String {
        "gpt-test-1.0".into()
    }
}

#[derive(Default)]
struct RecordingSleeper {
    naps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.naps.lock().unwrap().push(duration);
    }
}

fn is_intro(messages: &[ChatMessage]) -> bool {
    messages.len() == 1
}

fn last_user(messages: &[ChatMessage]) -> &str {
    &messages.last().unwrap().content
}

fn config(dir: &Path, demographics: &str, questions: &str) -> ExperimentConfig {
    let demographics_file = dir.join("demographics.txt");
    let questions_file = dir.join("questions.txt");
    fs::write(&demographics_file, demographics).unwrap();
    fs::write(&questions_file, questions).unwrap();

    let llm = LlmConfig {
        llm_type: LlmType::OpenAI,
        api_key: "sk-test".into(),
        model: "gpt-test-1.0".into(),
        base_url: None,
    };
    ExperimentConfig::with_defaults(llm, demographics_file, questions_file, dir.join("out"))
}

fn runner(config: ExperimentConfig, client: Arc<ScriptedClient>, sleeper: Arc<RecordingSleeper>) -> ExperimentRunner {
    ExperimentRunner::new(config, client)
        .with_sleeper(sleeper)
        .with_rng(StdRng::seed_from_u64(7))
}

fn read_rows(path: &Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.deserialize().map(|r| r.unwrap()).collect()
}

#[tokio::test]
async fn single_question_run_writes_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), "p1, 34, female, Bachelors, Ohio\n", "# Block A\nWill X win?\n");
    let client = ScriptedClient::new(|messages| {
        if is_intro(messages) { Ok("Understood.".into()) } else { Ok("  62\n".into()) }
    });
    let sleeper = Arc::new(RecordingSleeper::default());

    let summary = runner(config, client.clone(), sleeper.clone()).run().await.unwrap();

    assert_eq!(summary.participants_completed, 1);
    assert_eq!(summary.rows_written, 1);
    assert_eq!(summary.errors, 0);

    let file_name = summary.output_path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(file_name.starts_with("results_gpt_test_1_0_"));
    assert!(file_name.ends_with(".csv"));
    assert!(summary.output_path.starts_with(dir.path().join("out")));

    let rows = read_rows(&summary.output_path);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["participant_id"], "p1");
    assert_eq!(row["age"], "34");
    assert_eq!(row["gender"], "female");
    assert_eq!(row["education"], "Bachelors");
    assert_eq!(row["state"], "Ohio");
    assert_eq!(row["block"], "Block A");
    assert_eq!(row["question"], "Will X win?");
    assert_eq!(row["response"], "62");

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0][0].content.contains("34-year-old female"));
    assert_eq!(calls[1].len(), 3);
    assert_eq!(calls[1][1], ChatMessage::assistant("Understood."));
    assert!(last_user(&calls[1]).starts_with("Question: Will X win?\n"));

    // One rate-limit pause after the answered question, no retry delays.
    assert_eq!(*sleeper.naps.lock().unwrap(), vec![Duration::from_millis(500)]);
}

#[tokio::test]
async fn failed_question_is_recorded_as_error_without_assistant_turn() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), "p1, 34, female, Bachelors, Ohio\n", "# Block A\nWill X win?\n");
    let client = ScriptedClient::new(|messages| {
        if is_intro(messages) {
            Ok("Ready.".into())
        } else {
            Err(LlmError::Other("503 Service Unavailable".into()))
        }
    });
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut runner = runner(config.clone(), client.clone(), sleeper.clone());

    let participants = parse_demographics("p1, 34, female, Bachelors, Ohio\n");
    let blocks = parse_questions("# Block A\nWill X win?\n");
    fs::create_dir_all(&config.output_dir).unwrap();
    let mut writer = ResultWriter::open(config.output_dir.join("results.csv")).unwrap();

    let outcome = runner.run_participant(&participants[0], &blocks, &mut writer).await.unwrap();

    let SessionOutcome::Completed { conversation, answered, errors } = outcome else {
        panic!("intro should have succeeded");
    };
    assert_eq!(answered, 0);
    assert_eq!(errors, 1);
    assert_eq!(conversation.len(), 3);
    assert_eq!(conversation.last().unwrap().role, Role::User);

    let rows = read_rows(writer.path());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["response"], "ERROR");

    // Intro once, question three times; two retry delays and no rate-limit pause.
    assert_eq!(client.calls().len(), 4);
    assert_eq!(*sleeper.naps.lock().unwrap(), vec![Duration::from_secs(2); 2]);
}

#[tokio::test]
async fn participant_with_failed_intro_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(
        dir.path(),
        "p1, 34, female, Bachelors, Nowhere\np2, 51, male, Masters, Iowa\n",
        "# Block A\nQ1\nQ2\n"
    );
    let client = ScriptedClient::new(|messages| {
        if is_intro(messages) && messages[0].content.contains("Nowhere") {
            Err(LlmError::Other("timeout".into()))
        } else {
            Ok("40".into())
        }
    });
    let sleeper = Arc::new(RecordingSleeper::default());

    let summary = runner(config, client.clone(), sleeper).run().await.unwrap();

    assert_eq!(summary.participants_skipped, 1);
    assert_eq!(summary.participants_completed, 1);
    assert_eq!(summary.rows_written, 2);

    let rows = read_rows(&summary.output_path);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["participant_id"] == "p2"));
    // Three intro attempts for p1, then one intro and two questions for p2.
    assert_eq!(client.calls().len(), 6);
}

#[tokio::test]
async fn writes_one_row_per_participant_and_question() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(
        dir.path(),
        "a, 20, male, HS, Texas\nnot a participant\nb, 30, female, BA, Utah\nc, 40, female, MA, Iowa\n",
        "intro text\n# Block A\nA1\nA2\n\n# Block B\nB1\nB2\nB3\n"
    );
    let client = ScriptedClient::new(|messages| {
        if is_intro(messages) { Ok("ok".into()) } else { Ok("50".into()) }
    });

    let summary = runner(config, client, Arc::new(RecordingSleeper::default())).run().await.unwrap();
    let rows = read_rows(&summary.output_path);

    assert_eq!(rows.len(), 3 * 5);
    assert_eq!(summary.rows_written, 15);

    for id in ["a", "b", "c"] {
        let mine: Vec<&HashMap<String, String>> = rows
            .iter()
            .filter(|r| r["participant_id"] == id)
            .collect();
        assert_eq!(mine.len(), 5);

        // Blocks stay in file order; questions are a permutation within each block.
        let blocks: Vec<&str> = mine.iter().map(|r| r["block"].as_str()).collect();
        assert_eq!(blocks, vec!["Block A", "Block A", "Block B", "Block B", "Block B"]);

        let mut block_a: Vec<&str> = mine[..2].iter().map(|r| r["question"].as_str()).collect();
        block_a.sort();
        assert_eq!(block_a, vec!["A1", "A2"]);

        let mut block_b: Vec<&str> = mine[2..].iter().map(|r| r["question"].as_str()).collect();
        block_b.sort();
        assert_eq!(block_b, vec!["B1", "B2", "B3"]);
    }
}

#[tokio::test]
async fn long_sessions_send_anchored_sliding_window() {
    let dir = tempfile::tempdir().unwrap();
    let questions: String = std::iter::once("# Block A".to_string())
        .chain((1..=20).map(|i| format!("Question {}", i)))
        .collect::<Vec<_>>()
        .join("\n");
    let mut config = config(dir.path(), "p1, 34, female, Bachelors, Ohio\n", &questions);
    config.context_window = 3;

    let client = ScriptedClient::new(|messages| {
        if is_intro(messages) { Ok("intro ack".into()) } else { Ok("10".into()) }
    });

    runner(config, client.clone(), Arc::new(RecordingSleeper::default())).run().await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 21);
    let intro = calls[0][0].clone();
    for call in &calls[1..] {
        assert_eq!(call[0], intro);
        assert_eq!(call[1], ChatMessage::assistant("intro ack"));
        assert!(call.len() <= 2 + 2 * 3 + 1);
        assert_eq!(call.last().unwrap().role, Role::User);
    }
    assert_eq!(calls.last().unwrap().len(), 2 + 6 + 1);
}

#[tokio::test]
async fn missing_questions_file_fails_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), "p1, 34, female, Bachelors, Ohio\n", "# Block A\nQ\n");
    config.questions_file = dir.path().join("missing.txt");

    let client = ScriptedClient::new(|_| Ok("50".into()));
    let result = runner(config, client.clone(), Arc::new(RecordingSleeper::default())).run().await;

    assert!(result.is_err());
    assert!(client.calls().is_empty());
}
