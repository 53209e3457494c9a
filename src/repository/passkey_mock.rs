#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::crypto::SecretString;
use crate::resolver::ProviderResponse;
use crate::AuthError;

use super::passkey::{CeremonyOffer, PasskeyApi, PasskeySummary};

/// Scripted [`PasskeyApi`] for tests: begin calls pop from `offers`,
/// finish calls pop from `responses`, and management calls operate on the
/// `passkeys` list.
#[derive(Clone, Default)]
pub struct MockPasskeyApi {
    pub offers: Arc<Mutex<VecDeque<Result<CeremonyOffer, AuthError>>>>,
    pub responses: Arc<Mutex<VecDeque<Result<ProviderResponse, AuthError>>>>,
    pub passkeys: Arc<Mutex<Vec<PasskeySummary>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockPasskeyApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_offer(&self, ceremony_id: &str) {
        self.offers.lock().unwrap().push_back(Ok(CeremonyOffer {
            options: serde_json::json!({"challenge": "stub"}),
            ceremony_id: ceremony_id.to_owned(),
        }));
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

    fn record(&self, op: &str) {
        self.calls.lock().unwrap().push(op.to_owned());
    }
}

#[async_trait]
impl PasskeyApi for MockPasskeyApi {
    async fn login_begin(&self) -> Result<CeremonyOffer, AuthError> {
        self.record("login_begin");
        self.offers.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(AuthError::TransientFailure("no scripted offer".to_owned()))
        })
    }

    async fn login_finish(
        &self,
        _ceremony_id: &str,
        _credential: &serde_json::Value,
    ) -> Result<ProviderResponse, AuthError> {
        self.record("login_finish");
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

    async fn register_begin(
        &self,
        _access_token: &SecretString,
    ) -> Result<CeremonyOffer, AuthError> {
        self.record("register_begin");
        self.offers.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(AuthError::TransientFailure("no scripted offer".to_owned()))
        })
    }

    async fn register_finish(
        &self,
        _ceremony_id: &str,
        _credential: &serde_json::Value,
    ) -> Result<ProviderResponse, AuthError> {
        self.record("register_finish");
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

    async fn list_passkeys(
        &self,
        _access_token: &SecretString,
    ) -> Result<Vec<PasskeySummary>, AuthError> {
        self.record("list_passkeys");
        Ok(self.passkeys.lock().unwrap().clone())
    }

    async fn remove_passkey(
        &self,
        _access_token: &SecretString,
        passkey_id: &str,
    ) -> Result<(), AuthError> {
        self.record("remove_passkey");
        let mut passkeys = self.passkeys.lock().unwrap();
        let before = passkeys.len();
        passkeys.retain(|pk| pk.id != passkey_id);
        if passkeys.len() == before {
            return Err(AuthError::rejected("unknown passkey"));
        }
        Ok(())
    }
}
