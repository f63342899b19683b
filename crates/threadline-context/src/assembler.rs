use std::collections::VecDeque;
use std::sync::Arc;

use threadline_llm::ChatMessage;

use crate::estimator::{CharRatioEstimator, TokenEstimator};
use crate::templates::SUMMARY_CONTEXT_PREFIX;

pub const DEFAULT_CONTEXT_BUDGET: usize = 3000;

/// Builds the ordered prompt for one generation call within a token budget.
///
/// Layout is `[system prompt?] + [summary?] + [history suffix]`:
/// - the system prompt is always included, even if it alone exceeds the budget;
/// - the summary is included whole or not at all;
/// - history is walked newest-first and the walk stops at the first message that
///   does not fit, so the kept part is always a contiguous suffix.
#[derive(Clone)]
pub struct PromptAssembler {
    estimator: Arc<dyn TokenEstimator>,
    system_prompt: Option<String>,
    budget: usize,
}

impl PromptAssembler {
    pub fn new(estimator: Arc<dyn TokenEstimator>, budget: usize) -> Self {
        Self {
            estimator,
            system_prompt: None,
            budget,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt.filter(|s| !s.is_empty());
        self
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn estimator(&self) -> &Arc<dyn TokenEstimator> {
        &self.estimator
    }

    pub fn build(&self, history: &[ChatMessage], summary: Option<&str>) -> Vec<ChatMessage> {
        let mut used = 0usize;
        let mut head = Vec::with_capacity(2);

        if let Some(system_prompt) = &self.system_prompt {
            used = used.saturating_add(self.estimator.estimate(system_prompt));
            head.push(ChatMessage::system(system_prompt.clone()));
        }

        if let Some(summary) = summary.filter(|s| !s.trim().is_empty()) {
            let summary_text = format!("{}{}", SUMMARY_CONTEXT_PREFIX, summary);
            let cost = self.estimator.estimate(&summary_text);
            if used.saturating_add(cost) <= self.budget {
                used = used.saturating_add(cost);
                head.push(ChatMessage::system(summary_text));
            } else {
                tracing::debug!(cost, used, budget = self.budget, "Summary dropped from prompt");
            }
        }

        let mut kept: VecDeque<ChatMessage> = VecDeque::new();
        for message in history.iter().rev() {
            let cost = self.estimator.estimate(&message.content);
            if used.saturating_add(cost) > self.budget {
                break;
            }
            used = used.saturating_add(cost);
            kept.push_front(message.clone());
        }

        if kept.len() < history.len() {
            tracing::debug!(
                kept = kept.len(),
                dropped = history.len() - kept.len(),
                used,
                budget = self.budget,
                "History trimmed to fit context budget"
            );
        }

        head.extend(kept);
        head
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(Arc::new(CharRatioEstimator::default()), DEFAULT_CONTEXT_BUDGET)
    }
}
