//! # EHR Core
//!
//! EHR桥接服务的核心模块，提供规范患者记录、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod utils;

pub use error::{EhrError, Result};
pub use models::*;
