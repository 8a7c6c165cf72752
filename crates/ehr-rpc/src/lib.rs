//! # RPC模块
//!
//! 通过消息队列接收类型化RPC请求，分派到患者服务，并将结果发布到请求指定的回复队列。
//! - 请求信封与方法表
//! - 每条消息的分派与失败策略
//! - 基于RabbitMQ的单消费者处理循环

pub mod dispatcher;
pub mod envelope;
pub mod worker;

pub use dispatcher::{FailurePolicy, RpcConfig, RpcDispatcher};
pub use envelope::{RpcCall, RpcMethod, RpcRequest};
pub use worker::{
    process_request, BrokerConfig, IncomingRequest, MessageHandler, Reply, ReplyChannel, RpcWorker,
};
