//! 内存EHR传输实现，供测试使用
//!
//! 按URL预置响应并记录每一次调用。

use crate::client::{EhrResponse, EhrTransport};
use async_trait::async_trait;
use ehr_core::{EhrError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// 记录的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Fetch { url: String },
    Submit { url: String, body: Option<Vec<u8>> },
}

impl RecordedCall {
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url } | Self::Submit { url, .. } => url,
        }
    }
}

#[derive(Default)]
pub struct MockTransport {
    fetches: Mutex<HashMap<String, Vec<u8>>>,
    submits: Mutex<HashMap<String, EhrResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置GET响应
    pub fn on_fetch(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> &Self {
        self.fetches
            .lock()
            .expect("mock transport lock poisoned")
            .insert(url.into(), body.into());
        self
    }

    /// 预置POST响应
    pub fn on_submit(&self, url: impl Into<String>, response: EhrResponse) -> &Self {
        self.submits
            .lock()
            .expect("mock transport lock poisoned")
            .insert(url.into(), response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock transport lock poisoned").clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().expect("mock transport lock poisoned").push(call);
    }
}

#[async_trait]
impl EhrTransport for MockTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.record(RecordedCall::Fetch { url: url.to_string() });
        self.fetches
            .lock()
            .expect("mock transport lock poisoned")
            .get(url)
            .cloned()
            .ok_or_else(|| EhrError::Transport(format!("no scripted GET for {}", url)))
    }

    async fn submit(&self, url: &str, body: Option<Vec<u8>>) -> Result<EhrResponse> {
        self.record(RecordedCall::Submit {
            url: url.to_string(),
            body,
        });
        self.submits
            .lock()
            .expect("mock transport lock poisoned")
            .get(url)
            .cloned()
            .ok_or_else(|| EhrError::Transport(format!("no scripted POST for {}", url)))
    }
}
