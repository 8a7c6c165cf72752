//! openEHR HTTP客户端
//!
//! 所有请求都携带Basic认证头，并按配置关闭TLS证书校验。
//! 客户端不做重试，也不设置超时。

use async_trait::async_trait;
use ehr_core::{utils, EhrError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 重复MRN时后端返回的厂商错误码
pub const CONFLICT_STATUS_TEXT: &str = "EHR-2124";
/// 重复MRN时后端返回的HTTP状态码
pub const CONFLICT_STATUS_CODE: u16 = 400;

/// openEHR后端配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenEhrConfig {
    pub base_url: String,
    pub subject_namespace: String,
    pub username: String,
    pub password: String,
    pub accept_invalid_certs: bool,
}

impl Default for OpenEhrConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ehrscape.code-4-health.org/rest/v1/".to_string(),
            subject_namespace: "rnsh.mrn".to_string(),
            username: String::new(),
            password: String::new(),
            accept_invalid_certs: true,
        }
    }
}

impl std::fmt::Debug for OpenEhrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenEhrConfig")
            .field("base_url", &self.base_url)
            .field("subject_namespace", &self.subject_namespace)
            .field("username", &self.username)
            .field("password", &utils::redact(&self.password))
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// POST响应：原始响应体、状态文本和状态码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EhrResponse {
    pub body: Vec<u8>,
    pub status_text: String,
    pub status_code: u16,
}

impl EhrResponse {
    pub fn new(body: impl Into<Vec<u8>>, status_text: impl Into<String>, status_code: u16) -> Self {
        Self {
            body: body.into(),
            status_text: status_text.into(),
            status_code,
        }
    }

    /// 是否为“患者已存在”冲突
    pub fn is_conflict(&self) -> bool {
        self.status_text == CONFLICT_STATUS_TEXT && self.status_code == CONFLICT_STATUS_CODE
    }
}

/// EHR传输接口
#[async_trait]
pub trait EhrTransport: Send + Sync {
    /// 认证GET，返回原始响应体；不解释HTTP状态码
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// 认证POST；仅在提供请求体时设置JSON内容类型
    async fn submit(&self, url: &str, body: Option<Vec<u8>>) -> Result<EhrResponse>;
}

/// 基于reqwest的EHR客户端
pub struct HttpEhrClient {
    client: reqwest::Client,
    username: String,
    password: String,
}

impl HttpEhrClient {
    /// 创建客户端，整个进程生命周期内复用
    pub fn new(config: &OpenEhrConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| EhrError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// 添加认证头
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
    }
}

#[async_trait]
impl EhrTransport for HttpEhrClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| EhrError::Transport(format!("GET {}: {}", url, e)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| EhrError::Transport(format!("GET {}: {}", url, e)))?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(body.to_vec())
    }

    async fn submit(&self, url: &str, body: Option<Vec<u8>>) -> Result<EhrResponse> {
        debug!("POST {} (body: {})", url, body.is_some());

        let mut request = self.authorized(self.client.post(url));
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EhrError::Transport(format!("POST {}: {}", url, e)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| EhrError::Transport(format!("POST {}: {}", url, e)))?
            .to_vec();

        debug!("POST {} -> {}", url, status);
        Ok(EhrResponse {
            status_text: status_text(status, &body),
            status_code: status.as_u16(),
            body,
        })
    }
}

/// 状态文本：优先取响应体中的厂商错误码，否则取标准原因短语
pub fn status_text(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("code")?.as_str().map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_prefers_vendor_code() {
        let body = br#"{"status": 400, "code": "EHR-2124", "userMessage": "exists"}"#;
        assert_eq!(status_text(StatusCode::BAD_REQUEST, body), "EHR-2124");
    }

    #[test]
    fn test_status_text_falls_back_to_reason_phrase() {
        assert_eq!(status_text(StatusCode::CREATED, b""), "Created");
        assert_eq!(status_text(StatusCode::BAD_REQUEST, b"<html/>"), "Bad Request");
        assert_eq!(status_text(StatusCode::BAD_REQUEST, br#"{"code": 7}"#), "Bad Request");
    }

    #[test]
    fn test_conflict_requires_both_text_and_code() {
        assert!(EhrResponse::new(vec![], "EHR-2124", 400).is_conflict());
        assert!(!EhrResponse::new(vec![], "EHR-2124", 409).is_conflict());
        assert!(!EhrResponse::new(vec![], "Bad Request", 400).is_conflict());
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = OpenEhrConfig {
            username: "svc".to_string(),
            password: "hunter2".to_string(),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("svc"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_client_builds_with_invalid_certs_accepted() {
        let config = OpenEhrConfig::default();
        assert!(config.accept_invalid_certs);
        assert!(HttpEhrClient::new(&config).is_ok());
    }
}
