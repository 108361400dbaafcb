use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use ai_llm_service::AiLlmError;
use answer_engine::error::{FALLBACK_MESSAGE, PROCESSING_MESSAGE};
use answer_engine::prompt::SYSTEM_PROMPT;
use answer_engine::{
    AnswerEngine, AnswerSource, EngineConfig, EngineError, GenerationRequest, LanguageModel,
};
use chat_history::{ConversationStore, HistoryError, InMemoryConversationStore, Role, Turn};
use knowledge_base::{KnowledgeError, KnowledgeIndex, Snippet};

/// Replays scripted replies and records every request.
#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, AiLlmError>>>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<String, AiLlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::default(),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, AiLlmError> {
        self.seen.lock().unwrap().push(req.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Our 100 Mbps plan costs NPR 1,500 per month.".into()))
    }
}

struct FixedIndex {
    snippets: Vec<Snippet>,
    calls: AtomicUsize,
    fail: bool,
}

impl FixedIndex {
    fn new(texts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            snippets: texts
                .iter()
                .map(|t| Snippet {
                    text: t.to_string(),
                    source: "plans.md".into(),
                    score: 0.8,
                })
                .collect(),
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            snippets: vec![],
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeIndex for FixedIndex {
    async fn search(&self, _query: &str, k: usize) -> Result<Vec<Snippet>, KnowledgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(KnowledgeError::Qdrant("connection refused".into()));
        }
        Ok(self.snippets.iter().take(k).cloned().collect())
    }
}

/// Store whose reads or writes fail on demand.
struct BrokenStore {
    fail_reads: bool,
    writes: AtomicUsize,
}

impl BrokenStore {
    fn new(fail_reads: bool) -> Arc<Self> {
        Arc::new(Self {
            fail_reads,
            writes: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ConversationStore for BrokenStore {
    async fn append(&self, _session_id: &str, _turn: Turn) -> Result<(), HistoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(HistoryError::Backend("READONLY replica".into()))
    }

    async fn append_exchange(
        &self,
        _session_id: &str,
        _user_text: &str,
        _assistant_text: &str,
    ) -> Result<(), HistoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(HistoryError::Backend("READONLY replica".into()))
    }

    async fn history(&self, _session_id: &str) -> Result<Vec<Turn>, HistoryError> {
        if self.fail_reads {
            Err(HistoryError::Backend("connection reset by peer".into()))
        } else {
            Ok(vec![])
        }
    }

    async fn clear(&self, session_id: &str) -> Result<(), HistoryError> {
        Err(HistoryError::NotFound(session_id.into()))
    }
}

fn engine(
    index: Arc<FixedIndex>,
    llm: Arc<ScriptedModel>,
) -> (AnswerEngine, Arc<InMemoryConversationStore>) {
    let store = Arc::new(InMemoryConversationStore::new());
    let engine = AnswerEngine::new(EngineConfig::default(), store.clone(), index, llm);
    (engine, store)
}

#[tokio::test]
async fn small_talk_skips_retrieval_generation_and_history() {
    let index = FixedIndex::new(&["irrelevant"]);
    let llm = ScriptedModel::new(vec![]);
    let (engine, store) = engine(index.clone(), llm.clone());

    let answer = engine.answer("  Hello!! ", "s1").await.unwrap();

    assert_eq!(answer.source, AnswerSource::SmallTalk);
    assert_eq!(answer.text, "Hello! How can I help you today?");
    assert_eq!(index.calls(), 0);
    assert!(llm.requests().is_empty());
    assert!(store.history("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn grounded_prompt_carries_snippets_and_history() {
    let index = FixedIndex::new(&["The 100 Mbps plan costs NPR 1,500 per month."]);
    let llm = ScriptedModel::new(vec![
        Ok("It costs NPR 1,500.".into()),
        Ok("Yes, installation is free.".into()),
    ]);
    let (engine, store) = engine(index, llm.clone());

    let first = engine.answer("What does the 100 Mbps plan cost?", "s1").await.unwrap();
    assert_eq!(first.source, AnswerSource::Grounded);
    assert_eq!(first.text, "It costs NPR 1,500.");

    engine.answer("Is installation included?", "s1").await.unwrap();

    let reqs = llm.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].system.as_deref(), Some(SYSTEM_PROMPT));
    assert!(reqs[0].prompt.contains("The 100 Mbps plan costs NPR 1,500 per month."));
    assert!(!reqs[0].prompt.contains("Conversation so far:"));
    assert!(reqs[1].prompt.contains("User: What does the 100 Mbps plan cost?"));
    assert!(reqs[1].prompt.contains("Assistant: It costs NPR 1,500."));

    let turns = store.history("s1").await.unwrap();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[3].text, "Yes, installation is free.");
}

#[tokio::test]
async fn unhelpful_answer_triggers_localized_fallback() {
    let index = FixedIndex::new(&["IPTV channel list: Kantipur, Himalaya."]);
    let llm = ScriptedModel::new(vec![
        Ok("I'm sorry, I couldn't find relevant information on that.".into()),
        Ok("Restart your router and check the cables.".into()),
    ]);
    let (engine, store) = engine(index, llm.clone());

    let answer = engine.answer("My router keeps blinking red", "s1").await.unwrap();

    assert_eq!(answer.source, AnswerSource::Fallback);
    assert_eq!(answer.text, "Restart your router and check the cables.");

    let reqs = llm.requests();
    assert_eq!(reqs.len(), 2);
    let fallback = &reqs[1].prompt;
    assert!(fallback.contains("My router keeps blinking red"));
    assert!(fallback.contains("https://classic.com.np"));
    assert!(!fallback.contains("Kantipur"));
    assert!(!fallback.contains("Conversation so far:"));

    let turns = store.history("s1").await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].text, "Restart your router and check the cables.");
}

#[tokio::test]
async fn nepali_question_gets_nepali_fallback() {
    let index = FixedIndex::new(&[]);
    let llm = ScriptedModel::new(vec![Ok("मलाई थाहा छैन।".into()), Ok("राउटर पुनः सुरु गर्नुहोस्।".into())]);
    let (engine, _store) = engine(index, llm.clone());

    let answer = engine.answer("मेरो इन्टरनेट किन ढिलो छ?", "s1").await.unwrap();

    assert_eq!(answer.source, AnswerSource::Fallback);
    assert!(llm.requests()[1].prompt.contains("नेपालीमा उत्तर दिनुहोस्"));
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let (engine, store) = engine(FixedIndex::new(&["doc"]), ScriptedModel::new(vec![]));

    engine.answer("What plans do you offer?", "a").await.unwrap();
    engine.answer("What plans do you offer?", "a").await.unwrap();
    engine.answer("Do you have IPTV?", "b").await.unwrap();

    assert_eq!(store.history("a").await.unwrap().len(), 4);
    assert_eq!(store.history("b").await.unwrap().len(), 2);
}

#[tokio::test]
async fn grounded_timeout_is_a_processing_error_and_records_nothing() {
    let llm = ScriptedModel::new(vec![Err(AiLlmError::Timeout(Duration::from_secs(30)))]);
    let (engine, store) = engine(FixedIndex::new(&["doc"]), llm);

    let err = engine.answer("What is the IPTV price?", "s1").await.unwrap_err();

    assert!(matches!(err, EngineError::Processing { .. }));
    assert_eq!(err.to_string(), PROCESSING_MESSAGE);
    assert!(store.history("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn retrieval_failure_is_a_processing_error() {
    let llm = ScriptedModel::new(vec![]);
    let (engine, store) = engine(FixedIndex::failing(), llm.clone());

    let err = engine.answer("What is the IPTV price?", "s1").await.unwrap_err();

    assert!(matches!(err, EngineError::Processing { .. }));
    assert!(err.cause().contains("connection refused"));
    assert!(llm.requests().is_empty());
    assert!(store.history("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn fallback_failure_is_a_fallback_error_and_records_nothing() {
    let llm = ScriptedModel::new(vec![
        Ok("I don't know.".into()),
        Err(AiLlmError::Timeout(Duration::from_secs(30))),
    ]);
    let (engine, store) = engine(FixedIndex::new(&["doc"]), llm);

    let err = engine.answer("Can I pay with eSewa?", "s1").await.unwrap_err();

    assert!(matches!(err, EngineError::Fallback { .. }));
    assert_eq!(err.to_string(), FALLBACK_MESSAGE);
    assert!(store.history("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn history_read_failure_is_a_processing_error_before_any_model_call() {
    let index = FixedIndex::new(&["doc"]);
    let llm = ScriptedModel::new(vec![]);
    let store = BrokenStore::new(true);
    let engine = AnswerEngine::new(EngineConfig::default(), store.clone(), index.clone(), llm.clone());

    let err = engine.answer("What is the IPTV price?", "s1").await.unwrap_err();

    assert!(matches!(err, EngineError::Processing { .. }));
    assert!(err.cause().contains("connection reset"));
    assert_eq!(index.calls(), 0);
    assert!(llm.requests().is_empty());
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn history_write_failure_after_generation_is_a_processing_error() {
    let llm = ScriptedModel::new(vec![Ok("IPTV Basic costs NPR 500.".into())]);
    let store = BrokenStore::new(false);
    let engine = AnswerEngine::new(
        EngineConfig::default(),
        store.clone(),
        FixedIndex::new(&["doc"]),
        llm.clone(),
    );

    let err = engine.answer("What is the IPTV price?", "s1").await.unwrap_err();

    assert!(matches!(err, EngineError::Processing { .. }));
    assert_eq!(err.to_string(), PROCESSING_MESSAGE);
    assert!(err.cause().contains("READONLY"));
    assert_eq!(llm.requests().len(), 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_grounded_answer_falls_back() {
    let llm = ScriptedModel::new(vec![
        Ok("  \n\t ".into()),
        Ok("Please call Classic Tech customer support.".into()),
    ]);
    let (engine, store) = engine(FixedIndex::new(&["doc"]), llm.clone());

    let answer = engine.answer("Why is my bill higher this month?", "s1").await.unwrap();

    assert_eq!(answer.source, AnswerSource::Fallback);
    assert_eq!(answer.text, "Please call Classic Tech customer support.");
    assert_eq!(llm.requests().len(), 2);
    let turns = store.history("s1").await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].text, "Please call Classic Tech customer support.");
}
