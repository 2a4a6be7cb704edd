//! HTTP client for the log server's JSON endpoints.
//!
//! Every endpoint replies with `{status, msg}` where status 0 means success.
//! `/msg_send` names the text field `message` instead of `msg`.

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use logtail_core::login::{CodeRequest, CodeSubmission};

use crate::error::{ClientError, ClientResult};

pub const SEND_CODE_PATH: &str = "/login_api/send";
pub const REGISTER_PATH: &str = "/login_api/register";
pub const LOGOUT_PATH: &str = "/logout";
pub const MSG_SEND_PATH: &str = "/msg_send";

/// The `{status, msg}` reply envelope
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiReply {
    pub status: i64,
    #[serde(alias = "message", default)]
    pub msg: String,
}

impl ApiReply {
    /// The server's message on success, [`ClientError::Rejected`] otherwise
    pub fn into_result(self) -> ClientResult<String> {
        if self.status == 0 {
            Ok(self.msg)
        } else {
            Err(ClientError::Rejected {
                status: self.status,
                message: self.msg,
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

/// Client for the login, logout and message endpoints.
///
/// Cookies are kept between calls so a successful login authorises later
/// `/msg_send` requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{base_url}: scheme must be http or https"
            )));
        }
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ask the server to email a verification code
    pub async fn send_code(&self, request: &CodeRequest) -> ClientResult<String> {
        info!(username = %request.username, "requesting verification code");
        self.post_json(SEND_CODE_PATH, request).await
    }

    /// Submit the verification code and log in
    pub async fn register(&self, submission: &CodeSubmission) -> ClientResult<String> {
        info!(username = %submission.username, "submitting verification code");
        self.post_json(REGISTER_PATH, submission).await
    }

    /// End the server session
    pub async fn logout(&self) -> ClientResult<()> {
        let url = self.url(LOGOUT_PATH)?;
        let response = self.http.get(url).send().await?;
        check_status(response.status())?;
        info!("logged out");
        Ok(())
    }

    /// Post a chat message as the logged-in user
    pub async fn send_message(&self, text: &str) -> ClientResult<String> {
        debug!(len = text.len(), "sending message");
        self.post_json(MSG_SEND_PATH, &MessageBody { message: text }).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<String> {
        let url = self.url(path)?;
        let response = self.http.post(url).json(body).send().await?;
        check_status(response.status())?;

        let reply: ApiReply = response.json().await?;
        let result = reply.into_result();
        if let Err(e) = &result {
            warn!(path, error = %e, "server rejected request");
        }
        result
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }
}

fn check_status(status: StatusCode) -> ClientResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        warn!(status = status.as_u16(), "http request failed");
        Err(ClientError::Http {
            status: status.as_u16(),
        })
    }
}
