//! 错误定义模块

use thiserror::Error;

/// EHR桥接服务统一错误类型
#[derive(Error, Debug)]
pub enum EhrError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("HTTP传输错误: {0}")]
    Transport(String),

    #[error("消息队列错误: {0}")]
    Queue(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("解码错误: {context}: {message}")]
    Decode { context: String, message: String },

    #[error("未知的RPC方法: {0}")]
    UnknownMethod(String),

    #[error("RPC方法 {0} 缺少参数")]
    MissingParams(String),

    #[error("MRN为 {mrn} 的患者已存在")]
    PatientAlreadyExists { mrn: String },
}

impl EhrError {
    /// 构造带上下文的解码错误
    pub fn decode(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// 是否为重复MRN冲突
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::PatientAlreadyExists { .. })
    }

    /// 错误类别，用于RPC错误回复
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Transport(_) => "transport",
            Self::Queue(_) => "queue",
            Self::Serialization(_) => "serialization",
            Self::Decode { .. } => "decode",
            Self::UnknownMethod(_) => "unknown-method",
            Self::MissingParams(_) => "missing-params",
            Self::PatientAlreadyExists { .. } => "patient-already-exists",
        }
    }
}

/// EHR桥接服务统一结果类型
pub type Result<T> = std::result::Result<T, EhrError>;
