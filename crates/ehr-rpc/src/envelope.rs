//! RPC请求与回复信封
//!
//! 参数在方法名确定之后才解码（两阶段解码）。

use ehr_core::{EhrError, Patient, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RPC方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    ListAllPatients,
    GetPatient,
    GetEhrId,
    CreatePatient,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListAllPatients => "list-all-patients",
            Self::GetPatient => "get-patient",
            Self::GetEhrId => "get-ehr-id",
            Self::CreatePatient => "create-patient",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RpcMethod {
    type Err = EhrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "list-all-patients" => Ok(Self::ListAllPatients),
            "get-patient" => Ok(Self::GetPatient),
            "get-ehr-id" => Ok(Self::GetEhrId),
            "create-patient" => Ok(Self::CreatePatient),
            other => Err(EhrError::UnknownMethod(other.to_string())),
        }
    }
}

/// 入站请求信封 `{"method": ..., "params": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPatientParams {
    pub patient_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEhrIdParams {
    pub mrn: String,
}

/// `get-ehr-id` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEhrIdResult {
    pub ehr_id: String,
}

/// 已解码的RPC调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcCall {
    ListAllPatients,
    GetPatient(GetPatientParams),
    GetEhrId(GetEhrIdParams),
    /// 仅使用人口学字段
    CreatePatient(Patient),
}

impl RpcCall {
    /// 从原始消息体解码
    pub fn decode(body: &[u8]) -> Result<Self> {
        let request: RpcRequest =
            serde_json::from_slice(body).map_err(|e| EhrError::decode("rpc request", e))?;
        Self::from_request(request)
    }

    pub fn from_request(request: RpcRequest) -> Result<Self> {
        let method: RpcMethod = request.method.parse()?;
        let params = request.params;

        match method {
            RpcMethod::ListAllPatients => Ok(Self::ListAllPatients),
            RpcMethod::GetPatient => Ok(Self::GetPatient(decode_params(method, params)?)),
            RpcMethod::GetEhrId => Ok(Self::GetEhrId(decode_params(method, params)?)),
            RpcMethod::CreatePatient => Ok(Self::CreatePatient(decode_params(method, params)?)),
        }
    }

    pub fn method(&self) -> RpcMethod {
        match self {
            Self::ListAllPatients => RpcMethod::ListAllPatients,
            Self::GetPatient(_) => RpcMethod::GetPatient,
            Self::GetEhrId(_) => RpcMethod::GetEhrId,
            Self::CreatePatient(_) => RpcMethod::CreatePatient,
        }
    }
}

fn decode_params<T: DeserializeOwned>(
    method: RpcMethod,
    params: Option<serde_json::Value>,
) -> Result<T> {
    let params = params.ok_or_else(|| EhrError::MissingParams(method.to_string()))?;
    serde_json::from_value(params).map_err(|e| EhrError::decode(format!("{} params", method), e))
}

/// 错误回复信封，仅在 `reply` 失败策略下发送
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<&EhrError> for ErrorReply {
    fn from(err: &EhrError) -> Self {
        Self {
            error: ErrorBody {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_list_all_patients_ignores_params() {
        let call = RpcCall::decode(br#"{"method": "list-all-patients"}"#).unwrap();
        assert_eq!(call, RpcCall::ListAllPatients);

        let call = RpcCall::decode(br#"{"method": "list-all-patients", "params": null}"#).unwrap();
        assert_eq!(call.method(), RpcMethod::ListAllPatients);
    }

    #[test]
    fn test_decode_get_patient() {
        let call = RpcCall::decode(br#"{"method": "get-patient", "params": {"patientId": 42}}"#)
            .unwrap();
        assert_eq!(call, RpcCall::GetPatient(GetPatientParams { patient_id: 42 }));
    }

    #[test]
    fn test_decode_get_ehr_id() {
        let call = RpcCall::decode(br#"{"method": "get-ehr-id", "params": {"mrn": "M1"}}"#).unwrap();
        assert_eq!(
            call,
            RpcCall::GetEhrId(GetEhrIdParams {
                mrn: "M1".to_string()
            })
        );
    }

    #[test]
    fn test_decode_create_patient() {
        let body = br#"{"method": "create-patient", "params": {"firstname": "Ada", "mrn": "M1", "tumorType": "X"}}"#;
        match RpcCall::decode(body).unwrap() {
            RpcCall::CreatePatient(patient) => {
                assert_eq!(patient.firstname, "Ada");
                assert_eq!(patient.mrn, "M1");
                assert_eq!(patient.tumor_type, "X");
                assert_eq!(patient.id, "");
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_method() {
        let err = RpcCall::decode(br#"{"method": "delete-patient"}"#).unwrap_err();
        assert_eq!(err.kind(), "unknown-method");
    }

    #[test]
    fn test_missing_and_malformed_params() {
        let err = RpcCall::decode(br#"{"method": "get-patient"}"#).unwrap_err();
        assert_eq!(err.kind(), "missing-params");

        let err = RpcCall::decode(br#"{"method": "get-patient", "params": {"patientId": "42"}}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "decode");
        assert!(err.to_string().contains("get-patient params"));
    }

    #[test]
    fn test_malformed_envelope() {
        let err = RpcCall::decode(b"{not json").unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_ehr_id_result_wire_name() {
        let json = serde_json::to_value(GetEhrIdResult {
            ehr_id: "e1".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"ehrId": "e1"}));
    }
}
