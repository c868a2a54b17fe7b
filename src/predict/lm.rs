//! Language Model Seam
//!
//! Predictors talk to a model only through `LanguageModel`. `DummyLm` answers
//! from a fixed table and records every prompt it sees.

use parking_lot::Mutex;
use tracing::trace;

use super::error::{ForwardError, ForwardResult};
use super::example::Example;

/// A completion backend.
pub trait LanguageModel: Send + Sync {
    /// Produce output fields for `prompt`.
    fn complete(&self, prompt: &str) -> ForwardResult<Example>;
}

/// Deterministic model answering from a prompt -> reply table.
pub struct DummyLm {
    replies: Vec<(String, Example)>,
    history: Mutex<Vec<String>>,
}

impl DummyLm {
    pub fn new<P, I>(replies: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = (P, Example)>,
    {
        Self {
            replies: replies.into_iter().map(|(p, e)| (p.into(), e)).collect(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl LanguageModel for DummyLm {
    fn complete(&self, prompt: &str) -> ForwardResult<Example> {
        self.history.lock().push(prompt.to_string());
        trace!(target: "modtree::lm", prompt, "Dummy completion");
        self.replies
            .iter()
            .find(|(p, _)| p == prompt)
            .map(|(_, reply)| reply.clone())
            .ok_or_else(|| ForwardError::Model(format!("no reply for prompt '{}'", prompt)))
    }
}
