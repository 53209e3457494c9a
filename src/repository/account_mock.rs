#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::crypto::SecretString;
use crate::resolver::ProviderResponse;
use crate::AuthError;

use super::account::{AccountApi, NewAccount};

/// Scripted [`AccountApi`] for tests.
#[derive(Clone, Default)]
pub struct MockAccountApi {
    pub responses: Arc<Mutex<VecDeque<Result<ProviderResponse, AuthError>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockAccountApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<ProviderResponse, AuthError>) {
        self.responses.lock().unwrap().push_back(response);
    }

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
impl AccountApi for MockAccountApi {
    async fn register(&self, _account: &NewAccount) -> Result<ProviderResponse, AuthError> {
        self.next("register")
    }

    async fn verify_email(&self, _token: &str) -> Result<ProviderResponse, AuthError> {
        self.next("verify_email")
    }

    async fn resend_verification(&self, _email: &str) -> Result<ProviderResponse, AuthError> {
        self.next("resend_verification")
    }

    async fn request_password_reset(&self, _email: &str) -> Result<ProviderResponse, AuthError> {
        self.next("request_password_reset")
    }

    async fn reset_password(
        &self,
        _token: &str,
        _new_password: &SecretString,
    ) -> Result<ProviderResponse, AuthError> {
        self.next("reset_password")
    }

    async fn request_login_code(&self, _email: &str) -> Result<ProviderResponse, AuthError> {
        self.next("request_login_code")
    }

    async fn verify_login_code(
        &self,
        _email: &str,
        _code: &str,
    ) -> Result<ProviderResponse, AuthError> {
        self.next("verify_login_code")
    }
}
