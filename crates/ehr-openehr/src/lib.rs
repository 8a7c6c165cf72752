//! # openEHR集成模块
//!
//! 提供与外部openEHR REST后端的集成功能，包括：
//! - 带Basic认证的HTTP客户端
//! - 外部Party记录与内部Patient记录之间的转换
//! - 患者服务：列出、查询、解析EHR标识、创建患者

pub mod client;
pub mod endpoints;
pub mod party;
pub mod service;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{EhrResponse, EhrTransport, HttpEhrClient, OpenEhrConfig};
pub use endpoints::Endpoints;
pub use party::{ExtensionKey, Party, PartyAddress, PartyExtensions, PartyInfo};
pub use service::{CreateStage, PatientService};
