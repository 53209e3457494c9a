#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::crypto::SecretString;
use crate::resolver::ProviderResponse;
use crate::AuthError;

use super::auth::AuthApi;

/// Scripted [`AuthApi`] for tests: responses are popped in push order and
/// every call is recorded.
#[derive(Clone, Default)]
pub struct MockAuthApi {
    pub responses: Arc<Mutex<VecDeque<Result<ProviderResponse, AuthError>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<ProviderResponse, AuthError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Scripts a raw JSON body, the way a transport would hand it over.
    pub fn push_json(&self, body: serde_json::Value) {
        self.push(ProviderResponse::from_json_value(body));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next(&self, op: &str) -> Result<ProviderResponse, AuthError> {
        self.calls.lock().unwrap().push(op.to_owned());
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
impl AuthApi for MockAuthApi {
    async fn login(&self, _email: &str, _password: &str) -> Result<ProviderResponse, AuthError> {
        self.next("login")
    }

    async fn verify_totp(
        &self,
        _challenge_token: &SecretString,
        _code: &str,
    ) -> Result<ProviderResponse, AuthError> {
        self.next("verify_totp")
    }
}
