//! 上游openEHR端点

use crate::party::ExtensionKey;
use ehr_core::{utils, EhrError, Result};
use reqwest::Url;

/// 相对于基础URL的上游端点集合
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    subject_namespace: String,
}

impl Endpoints {
    pub fn new(base_url: &str, subject_namespace: &str) -> Result<Self> {
        let base = Url::parse(&utils::normalize_base_url(base_url))
            .map_err(|e| EhrError::Config(format!("invalid openEHR base url {}: {}", base_url, e)))?;

        Ok(Self {
            base,
            subject_namespace: subject_namespace.to_string(),
        })
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| EhrError::Config(format!("invalid endpoint path {}: {}", path, e)))
    }

    /// 通配查询全部Party
    pub fn party_query(&self) -> Result<String> {
        let mut url = self.join("demographics/party/query")?;
        url.query_pairs_mut()
            .append_pair("lastNames", "*")
            .append_pair(ExtensionKey::Mrn.as_str(), "*");
        Ok(url.into())
    }

    pub fn party(&self, id: i64) -> Result<String> {
        Ok(self.join(&format!("demographics/party/{}", id))?.into())
    }

    /// Party注册端点
    pub fn party_collection(&self) -> Result<String> {
        Ok(self.join("demographics/party")?.into())
    }

    /// 按MRN与命名空间查询或创建EHR
    pub fn ehr_by_subject(&self, mrn: &str) -> Result<String> {
        let mut url = self.join("ehr/")?;
        url.query_pairs_mut()
            .append_pair("subjectId", mrn)
            .append_pair("subjectNamespace", &self.subject_namespace);
        Ok(url.into())
    }
}
