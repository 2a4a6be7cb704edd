//! Login form validation and the code-request cooldown

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use thiserror::Error;

/// Usernames the server refuses to issue codes for
pub const BLOCKED_USERNAMES: [&str; 2] = ["Because", "because"];

/// Local validation failures. None of these reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginValidation {
    #[error("Please enter a username")]
    MissingUsername,

    #[error("Please enter an email address")]
    MissingEmail,

    #[error("Please enter the verification code")]
    MissingCode,

    #[error("Unsupported user")]
    BlockedUser,

    #[error("Verification code already sent")]
    CodeRequestInFlight,
}

/// Fields of the login screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub email: String,
    pub code: String,
}

/// Body of `POST /login_api/send`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeRequest {
    pub username: String,
    pub email: String,
}

/// Body of `POST /login_api/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSubmission {
    pub username: String,
    pub code: String,
    pub email: String,
}

impl LoginForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            code: code.into(),
        }
    }

    /// Validate the fields needed to ask for a code
    pub fn code_request(&self) -> Result<CodeRequest, LoginValidation> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.is_empty() {
            return Err(LoginValidation::MissingUsername);
        }
        if BLOCKED_USERNAMES.contains(&username) {
            return Err(LoginValidation::BlockedUser);
        }
        if email.is_empty() {
            return Err(LoginValidation::MissingEmail);
        }
        Ok(CodeRequest {
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    /// Validate every field needed to log in
    pub fn submission(&self) -> Result<CodeSubmission, LoginValidation> {
        let username = self.username.trim();
        let email = self.email.trim();
        let code = self.code.trim();
        if username.is_empty() {
            return Err(LoginValidation::MissingUsername);
        }
        if email.is_empty() {
            return Err(LoginValidation::MissingEmail);
        }
        if code.is_empty() {
            return Err(LoginValidation::MissingCode);
        }
        if BLOCKED_USERNAMES.contains(&username) {
            return Err(LoginValidation::BlockedUser);
        }
        Ok(CodeSubmission {
            username: username.to_string(),
            code: code.to_string(),
            email: email.to_string(),
        })
    }
}

/// Prevents a second code request while one is in flight
#[derive(Debug, Clone, Default)]
pub struct CodeRequestGate {
    busy: Arc<AtomicBool>,
}

/// Held while a code request is in flight; dropping it reopens the gate
#[derive(Debug)]
pub struct CodeRequestPermit {
    busy: Arc<AtomicBool>,
}

impl CodeRequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Result<CodeRequestPermit, LoginValidation> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| CodeRequestPermit {
                busy: Arc::clone(&self.busy),
            })
            .map_err(|_| LoginValidation::CodeRequestInFlight)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for CodeRequestPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_request_validation() {
        assert_eq!(
            LoginForm::new("", "a@b.c", "").code_request(),
            Err(LoginValidation::MissingUsername)
        );
        assert_eq!(
            LoginForm::new("Steve", "  ", "").code_request(),
            Err(LoginValidation::MissingEmail)
        );
        assert_eq!(
            LoginForm::new("Because", "a@b.c", "").code_request(),
            Err(LoginValidation::BlockedUser)
        );
        assert_eq!(
            LoginForm::new("because", "a@b.c", "").code_request(),
            Err(LoginValidation::BlockedUser)
        );

        let request = LoginForm::new(" Steve ", "steve@example.com", "").code_request().unwrap();
        assert_eq!(request.username, "Steve");
    }

    #[test]
    fn test_submission_validation() {
        assert_eq!(
            LoginForm::new("Steve", "steve@example.com", "").submission(),
            Err(LoginValidation::MissingCode)
        );
        assert_eq!(
            LoginForm::new("Steve", "", "1234").submission(),
            Err(LoginValidation::MissingEmail)
        );
        let submission = LoginForm::new("Steve", "steve@example.com", "1234").submission().unwrap();
        assert_eq!(submission.code, "1234");

        let body = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"username": "Steve", "code": "1234", "email": "steve@example.com"})
        );
    }

    #[test]
    fn test_gate_refuses_while_busy() {
        let gate = CodeRequestGate::new();
        let permit = gate.try_begin().unwrap();
        assert!(gate.is_busy());
        assert_eq!(gate.clone().try_begin().unwrap_err(), LoginValidation::CodeRequestInFlight);

        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_ok());
    }
}
