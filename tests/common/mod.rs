#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arxiv_analyzer::article::Article;
use arxiv_analyzer::error::{AppError, Result};
use arxiv_analyzer::llm::CompletionClient;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Scripted completion client.
///
/// Replies are chosen by the first registered marker contained in the user
/// prompt, falling back to a valid analysis. Tracks total calls and the
/// highest number of calls observed in flight at once.
#[derive(Default)]
pub struct FakeClient {
    replies: Mutex<HashMap<String, Reply>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn reply_for(self, marker: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(marker.to_string(), reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn pick(&self, prompt: &str) -> Reply {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Reply::Text(valid_payload().to_string()))
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = self.pick(user);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(msg) => Err(AppError::UpstreamFailure(msg)),
        }
    }
}

pub fn valid_payload() -> Value {
    json!({
        "main_topic": "Self-attention for sequence transduction",
        "methodology": "Empirical evaluation on WMT benchmarks",
        "key_findings": ["Attention alone suffices", "Training is faster"],
        "techniques": ["multi-head attention", "positional encoding"],
        "category": {
            "domain": "Computer Science",
            "subcategory": "Natural Language Processing",
            "complexity": "Advanced",
            "article_type": "Application"
        },
        "summary": {
            "brief": "Introduces the Transformer architecture.",
            "key_points": ["No recurrence", "State of the art BLEU"]
        }
    })
}

pub fn article(id: &str) -> Article {
    Article::new(
        id,
        format!("Title of {id}"),
        format!("Abstract of {id}"),
    )
    .with_categories(["cs.CL"])
}

pub fn fake(client: FakeClient) -> Arc<FakeClient> {
    Arc::new(client)
}
