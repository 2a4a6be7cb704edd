//! Message composer

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};

/// Sends chat messages, one at a time
#[derive(Debug, Clone)]
pub struct Composer {
    api: ApiClient,
    sending: Arc<AtomicBool>,
}

struct SendingGuard(Arc<AtomicBool>);

impl Drop for SendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Composer {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            sending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Trim and send. Empty input never reaches the network.
    pub async fn send(&self, text: &str) -> ClientResult<String> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::SendInFlight);
        }
        let _guard = SendingGuard(Arc::clone(&self.sending));
        self.api.send_message(message).await
    }
}
