use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use draftloop_core::{ConversationState, LoopError, LoopRunner, REVISION_CAP};
use draftloop_critic::REVISE_DIRECTIVE;
use draftloop_llm::{Message, Role, ScriptedBackend};
use draftloop_logging::{brief_hash, LogFormat, Logger, Step};
use draftloop_writer::WriterPrompts;

const BRIEF: &str = "Write a post about learning Git as a beginner.";

fn silent() -> Arc<Logger> {
    Arc::new(Logger::silent())
}

fn fixes(n: usize) -> String {
    format!("{}\n- fix {}", REVISE_DIRECTIVE, n)
}

/// One backend serving both steps, telling them apart by the system prompt
fn shared_backend() -> ScriptedBackend {
    let drafts = AtomicUsize::new(0);
    let critiques = AtomicUsize::new(0);
    ScriptedBackend::from_fn(move |messages| {
        if messages[0].content() == WriterPrompts::system_prompt() {
            format!("draft {}", drafts.fetch_add(1, Ordering::SeqCst) + 1)
        } else {
            fixes(critiques.fetch_add(1, Ordering::SeqCst) + 1)
        }
    })
}

fn writer_backend() -> ScriptedBackend {
    let drafts = AtomicUsize::new(0);
    ScriptedBackend::from_fn(move |_| format!("draft {}", drafts.fetch_add(1, Ordering::SeqCst) + 1))
}

fn critic_backend() -> ScriptedBackend {
    let critiques = AtomicUsize::new(0);
    ScriptedBackend::from_fn(move |_| fixes(critiques.fetch_add(1, Ordering::SeqCst) + 1))
}

fn state_with_revisions(revisions: u32) -> ConversationState {
    let mut state = ConversationState::new(BRIEF);
    for n in 0..revisions {
        state.append_draft(format!("earlier draft {}", n));
        state.append_fixes(fixes(n as usize));
    }
    state
}

#[tokio::test]
async fn test_full_run_stops_at_cap() {
    let backend = shared_backend();
    let runner = LoopRunner::new(&backend, &backend, silent());

    let outcome = runner.run(ConversationState::new(BRIEF)).await.unwrap();

    assert_eq!(outcome.revisions, REVISION_CAP);
    assert_eq!(outcome.writer_calls, 6);
    assert_eq!(outcome.critique_calls, 5);
    assert_eq!(outcome.messages, 12);
    assert_eq!(outcome.post, "draft 6");
    assert_eq!(backend.call_count(), 11);

    // The run ends on a draft, never on a critique
    let last = outcome.state.messages().last().unwrap();
    assert_eq!(last.role(), Role::Assistant);
}

#[tokio::test]
async fn test_steps_alternate_and_revisions_grow_by_one() {
    let writer = writer_backend();
    let critic = critic_backend();
    let runner = LoopRunner::new(&writer, &critic, silent());

    let outcome = runner.run(ConversationState::new(BRIEF)).await.unwrap();
    let messages = outcome.state.messages();

    assert_eq!(messages[0], Message::user(BRIEF));
    for (i, message) in messages.iter().enumerate().skip(1) {
        let expected = if i % 2 == 1 { Role::Assistant } else { Role::User };
        assert_eq!(message.role(), expected, "message {}", i);
    }

    // Each writer request sees one more fixes list than the previous one
    let fixes_seen: Vec<usize> = writer
        .requests()
        .iter()
        .map(|req| {
            req.iter()
                .filter(|m| m.role() == Role::User && m.content().starts_with(REVISE_DIRECTIVE))
                .count()
        })
        .collect();
    assert_eq!(fixes_seen, vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_first_cycle_builds_expected_history() {
    let writer = writer_backend();
    let critic = critic_backend();
    let runner = LoopRunner::new(&writer, &critic, silent());

    runner.run(ConversationState::new(BRIEF)).await.unwrap();

    // The second writer call sees brief, first draft and first fixes list
    let second_writer_request = &writer.requests()[1];
    let history = &second_writer_request[1..];
    assert_eq!(history.len(), 3);
    assert_eq!(history[1], Message::assistant("draft 1"));
    assert_eq!(history[2], Message::user(fixes(1)));

    // The first critique saw only the review prompt and the first draft
    let first_critique_request = &critic.requests()[0];
    assert_eq!(first_critique_request.len(), 2);
    assert_eq!(first_critique_request[1], Message::assistant("draft 1"));
}

#[tokio::test]
async fn test_four_revisions_still_routes_to_critique() {
    let writer = writer_backend();
    let critic = critic_backend();
    let runner = LoopRunner::new(&writer, &critic, silent());

    let outcome = runner.run(state_with_revisions(4)).await.unwrap();

    assert_eq!(outcome.critique_calls, 1);
    assert_eq!(outcome.writer_calls, 2);
    assert_eq!(outcome.revisions, 5);
}

#[tokio::test]
async fn test_five_revisions_terminates_after_draft() {
    let writer = writer_backend();
    let critic = critic_backend();
    let runner = LoopRunner::new(&writer, &critic, silent());

    let outcome = runner.run(state_with_revisions(5)).await.unwrap();

    assert_eq!(critic.call_count(), 0);
    assert_eq!(outcome.writer_calls, 1);
    assert_eq!(outcome.revisions, 5);
    assert_eq!(outcome.post, "draft 1");
}

#[tokio::test]
async fn test_writer_failure_aborts_run() {
    let writer = ScriptedBackend::new()
        .with_replies(["draft 1", "draft 2"])
        .with_failure(429, "rate limited");
    let critic = critic_backend();
    let runner = LoopRunner::new(&writer, &critic, silent());

    let err = runner.run(ConversationState::new(BRIEF)).await.unwrap_err();

    assert_eq!(err.step(), Step::Writer);
    assert!(!err.is_precondition_violation());
    match err {
        LoopError::BackendInvocation { source, .. } => assert_eq!(source.status(), Some(429)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(writer.call_count(), 3);
    assert_eq!(critic.call_count(), 2);
}

#[tokio::test]
async fn test_critique_failure_aborts_run() {
    let writer = writer_backend();
    let critic = ScriptedBackend::new().with_failure(500, "internal error");
    let runner = LoopRunner::new(&writer, &critic, silent());

    let err = runner.run(ConversationState::new(BRIEF)).await.unwrap_err();

    assert_eq!(err.step(), Step::Critique);
    assert_eq!(writer.call_count(), 1);
}

#[tokio::test]
async fn test_empty_critique_still_counts_revision() {
    let writer = writer_backend();
    let critic = ScriptedBackend::from_fn(|_| String::new());
    let runner = LoopRunner::new(&writer, &critic, silent());

    let outcome = runner.run(ConversationState::new(BRIEF)).await.unwrap();

    assert_eq!(outcome.revisions, REVISION_CAP);
    assert_eq!(outcome.critique_calls, 5);
}

#[tokio::test]
async fn test_event_log_records_every_decision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl");
    let logger = Arc::new(Logger::with_file(LogFormat::Compact, &path).unwrap().quiet());

    let writer = ScriptedBackend::from_fn(|_| "tiny draft".to_string());
    let critic = critic_backend();
    let runner = LoopRunner::new(&writer, &critic, logger).with_lint(true);
    runner.run(ConversationState::new(BRIEF)).await.unwrap();

    let events: Vec<serde_json::Value> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    let routes: Vec<&str> = events
        .iter()
        .filter(|e| e["event"] == "route_decided")
        .map(|e| e["route"].as_str().unwrap())
        .collect();
    assert_eq!(
        routes,
        vec!["critique", "critique", "critique", "critique", "critique", "done"]
    );

    let lints: Vec<&serde_json::Value> =
        events.iter().filter(|e| e["event"] == "draft_lint").collect();
    assert_eq!(lints.len(), 6);
    assert!(!lints[0]["warnings"].as_array().unwrap().is_empty());

    assert_eq!(events.first().unwrap()["event"], "run_started");
    assert_eq!(events.last().unwrap()["event"], "run_completed");

    // The log names the brief by hash only
    assert_eq!(events[0]["brief_hash"], brief_hash(BRIEF));
    assert!(!std::fs::read_to_string(&path).unwrap().contains(BRIEF));
}

#[tokio::test]
async fn test_truncated_draft_is_flagged_and_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl");
    let logger = Arc::new(Logger::with_file(LogFormat::Compact, &path).unwrap().quiet());

    let writer = ScriptedBackend::from_fn(|_| "a draft that ran out of".to_string())
        .with_finish_reason("length");
    let critic = critic_backend();
    let runner = LoopRunner::new(&writer, &critic, logger);
    let outcome = runner.run(ConversationState::new(BRIEF)).await.unwrap();

    // Truncation is reported, never acted on
    assert_eq!(outcome.writer_calls, 6);
    assert_eq!(outcome.post, "a draft that ran out of");

    let completed: Vec<serde_json::Value> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .filter(|e| e["event"] == "writer_completed")
        .collect();
    assert_eq!(completed.len(), 6);
    assert!(completed.iter().all(|e| e["truncated"] == true));
}
