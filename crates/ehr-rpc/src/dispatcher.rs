//! RPC分派器
//!
//! 解码请求、调用患者服务、编码结果，并决定错误时的处理方式。

use crate::envelope::{ErrorReply, GetEhrIdResult, RpcCall};
use crate::worker::{IncomingRequest, MessageHandler, Reply};
use async_trait::async_trait;
use ehr_core::{EhrError, Result};
use ehr_openehr::PatientService;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 消息处理失败时的策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 终止工作进程，消息不确认
    #[default]
    Crash,
    /// 向调用方发送错误回复并确认消息
    Reply,
}

/// RPC配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub failure_policy: FailurePolicy,
}

pub struct RpcDispatcher {
    service: PatientService,
    policy: FailurePolicy,
}

impl RpcDispatcher {
    pub fn new(service: PatientService, policy: FailurePolicy) -> Self {
        Self { service, policy }
    }

    /// 调用对应的患者服务操作并序列化结果
    pub async fn dispatch(&self, call: RpcCall) -> Result<Vec<u8>> {
        let body = match call {
            RpcCall::ListAllPatients => serde_json::to_vec(&self.service.list_patients().await?)?,
            RpcCall::GetPatient(params) => {
                serde_json::to_vec(&self.service.get_patient(params.patient_id).await?)?
            }
            RpcCall::GetEhrId(params) => {
                let ehr_id = self.service.resolve_ehr_id(&params.mrn).await?;
                serde_json::to_vec(&GetEhrIdResult { ehr_id })?
            }
            RpcCall::CreatePatient(patient) => {
                serde_json::to_vec(&self.service.create_patient(&patient).await?)?
            }
        };
        Ok(body)
    }

    async fn process(&self, request: &IncomingRequest) -> Result<Vec<u8>> {
        let call = RpcCall::decode(&request.body)?;
        let method = call.method();
        let correlation_id = request.correlation_id.as_deref().unwrap_or("-");

        info!("[ START ] Handling {} ({})", method, correlation_id);
        let body = self.dispatch(call).await?;
        info!("[  END  ] Handling {} ({})", method, correlation_id);

        Ok(body)
    }

    /// 按失败策略把错误转换为错误回复，或原样返回
    fn recover(&self, err: EhrError) -> Result<Vec<u8>> {
        match self.policy {
            FailurePolicy::Crash => Err(err),
            FailurePolicy::Reply => {
                warn!("Replying with error: {}", err);
                Ok(serde_json::to_vec(&ErrorReply::from(&err))?)
            }
        }
    }
}

#[async_trait]
impl MessageHandler for RpcDispatcher {
    async fn handle_message(&self, request: &IncomingRequest) -> Result<Option<Reply>> {
        let body = match self.process(request).await {
            Ok(body) => body,
            Err(err) => self.recover(err)?,
        };

        match request.reply_to.as_deref() {
            Some(reply_to) if !reply_to.is_empty() => Ok(Some(Reply {
                routing_key: reply_to.to_string(),
                correlation_id: request.correlation_id.clone(),
                body,
            })),
            _ => {
                warn!(
                    "Request {} has no reply_to, dropping result",
                    request.correlation_id.as_deref().unwrap_or("-")
                );
                Ok(None)
            }
        }
    }

    fn name(&self) -> &str {
        "patient-rpc"
    }
}
