use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::Notifier;

/// Records every notification it is asked to send
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) {
        self.sent.lock().unwrap().push(text.to_string());
    }
}
