#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::crypto::SecretString;
use crate::resolver::ProviderResponse;
use crate::AuthError;

use super::token::TokenApi;

/// Scripted [`TokenApi`] for tests.
///
/// [`hold`](Self::hold) parks the next `refresh` calls on a
/// [`Notify`] until released, which is how the at-most-one-refresh
/// property is exercised without real network latency.
#[derive(Clone, Default)]
pub struct MockTokenApi {
    pub responses: Arc<Mutex<VecDeque<Result<ProviderResponse, AuthError>>>>,
    pub revoke_results: Arc<Mutex<VecDeque<Result<(), AuthError>>>>,
    pub revoked: Arc<Mutex<Vec<String>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl MockTokenApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<ProviderResponse, AuthError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_json(&self, body: serde_json::Value) {
        self.push(ProviderResponse::from_json_value(body));
    }

    pub fn refresh_call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|op| *op == "refresh")
            .count()
    }

    /// Makes subsequent `refresh` calls wait until the returned handle is
    /// notified.
    pub fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    fn next(&self) -> Result<ProviderResponse, AuthError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AuthError::TransientFailure(
                    "no scripted response".to_owned(),
                ))
            })
    }
}

#[async_trait]
impl TokenApi for MockTokenApi {
    async fn refresh(&self, _refresh_token: &SecretString) -> Result<ProviderResponse, AuthError> {
        self.calls.lock().unwrap().push("refresh".to_owned());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.next()
    }

    async fn revoke(&self, refresh_token: &SecretString) -> Result<(), AuthError> {
        self.calls.lock().unwrap().push("revoke".to_owned());
        self.revoked
            .lock()
            .unwrap()
            .push(refresh_token.expose_secret().to_owned());
        self.revoke_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}
