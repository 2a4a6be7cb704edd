//! Two-step login: request a code, then submit it

use std::time::Duration;

use tracing::debug;

use logtail_core::{CodeRequestGate, LoginForm, LoginValidation};

use crate::api::ApiClient;
use crate::error::ClientResult;

/// Delay between a successful login and leaving the login screen
pub const REDIRECT_DELAY: Duration = Duration::from_millis(3000);

/// Validates the form, enforces the code-request cooldown and calls the API
#[derive(Debug, Clone)]
pub struct LoginFlow {
    api: ApiClient,
    gate: CodeRequestGate,
}

impl LoginFlow {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            gate: CodeRequestGate::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Whether a code request is in flight
    pub fn code_request_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Check a code request without sending it: a request in flight is
    /// reported before any field problem.
    pub fn check_code_request(&self, form: &LoginForm) -> ClientResult<()> {
        if self.gate.is_busy() {
            return Err(LoginValidation::CodeRequestInFlight.into());
        }
        form.code_request()?;
        Ok(())
    }

    /// Ask for a verification code.
    ///
    /// Invalid fields and a request already in flight are refused without
    /// touching the network. The gate reopens when this call returns.
    pub async fn request_code(&self, form: &LoginForm) -> ClientResult<String> {
        let request = form.code_request()?;
        let _permit = self.gate.try_begin()?;
        self.api.send_code(&request).await
    }

    /// Submit the code. Empty fields are refused without touching the network.
    pub async fn submit(&self, form: &LoginForm) -> ClientResult<String> {
        let submission = form.submission()?;
        let message = self.api.register(&submission).await?;
        debug!(username = %submission.username, "login accepted");
        Ok(message)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.api.logout().await
    }
}
