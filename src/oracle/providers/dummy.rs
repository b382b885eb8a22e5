//! Dummy oracle provider — scripted responses, no network.
//!
//! With an empty script it echoes the prompt back prefixed with `[echo]`,
//! which is enough to exercise a full save/optimize round-trip without a
//! real API key.  Tests enqueue canned completions (or failures) and
//! assert on the call counter — e.g. that the relevance short-circuit
//! really skips the oracle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::oracle::OracleError;

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    script: Arc<Mutex<VecDeque<Result<String, OracleError>>>>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl DummyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a canned completion, returned by the next unscripted `complete`.
    pub fn enqueue(&self, completion: impl Into<String>) {
        self.script
            .lock()
            .expect("dummy script lock")
            .push_back(Ok(completion.into()));
    }

    /// Queue a canned failure.
    pub fn enqueue_error(&self, err: OracleError) {
        self.script.lock().expect("dummy script lock").push_back(Err(err));
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt passed to `complete`, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().expect("dummy prompts lock").last().cloned()
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("dummy prompts lock")
            .push(prompt.to_string());
        let scripted = self.script.lock().expect("dummy script lock").pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(format!("[echo] {prompt}")),
        }
    }
}
