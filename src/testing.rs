//! In-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::restapi::Transport;
use crate::types::DashboardError;

#[derive(Clone)]
enum Reply {
    Ok(Value),
    Fail,
}

#[derive(Default)]
struct Inner {
    replies: HashMap<String, VecDeque<Reply>>,
    gets: HashMap<String, usize>,
    posts: Vec<String>,
}

/// Replays queued replies per path. The last queued reply for a path repeats forever.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    inner: Mutex<Inner>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency: Some(latency),
            ..Self::default()
        })
    }

    pub(crate) fn reply(&self, path: &str, value: Value) {
        self.push(path, Reply::Ok(value));
    }

    pub(crate) fn fail(&self, path: &str) {
        self.push(path, Reply::Fail);
    }

    pub(crate) fn get_count(&self, path: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.gets.get(path).copied().unwrap_or(0)
    }

    pub(crate) fn posts(&self) -> Vec<String> {
        self.inner.lock().unwrap().posts.clone()
    }

    fn push(&self, path: &str, reply: Reply) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .replies
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, path: &str) -> Option<Reply> {
        let mut inner = self.inner.lock().unwrap();
        *inner.gets.entry(path.to_string()).or_default() += 1;
        let queue = inner.replies.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<Value, DashboardError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.next_reply(path) {
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Fail) => Err(DashboardError::Api {
                path: path.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
            None => Err(DashboardError::Api {
                path: path.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }

    async fn post(&self, path: &str) -> Result<(), DashboardError> {
        self.inner.lock().unwrap().posts.push(path.to_string());
        Ok(())
    }
}
