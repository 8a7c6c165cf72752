//! 患者服务
//!
//! 四个领域操作：列出全部患者、查询单个患者、按MRN解析EHR标识、创建患者。
//! 每个操作由一次或多次EHR传输调用加记录转换组成。

use crate::client::{EhrResponse, EhrTransport};
use crate::endpoints::Endpoints;
use crate::party::{CreatedParty, EhrReference, Party, PartyCollection, PartyEnvelope};
use ehr_core::{EhrError, Patient, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 创建流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStage {
    Start,
    EhrRegistered,
    PartySubmitted,
    PartyFetched,
    Done,
}

impl fmt::Display for CreateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::EhrRegistered => "ehr-registered",
            Self::PartySubmitted => "party-submitted",
            Self::PartyFetched => "party-fetched",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// 患者服务
pub struct PatientService {
    transport: Arc<dyn EhrTransport>,
    endpoints: Endpoints,
}

impl PatientService {
    pub fn new(transport: Arc<dyn EhrTransport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// 列出全部患者
    ///
    /// 宽松解码：响应整体形状不符时返回空列表，单个格式错误的条目被静默丢弃。
    pub async fn list_patients(&self) -> Result<Vec<Patient>> {
        let body = self.transport.fetch(&self.endpoints.party_query()?).await?;

        let collection = match serde_json::from_slice::<PartyCollection>(&body) {
            Ok(collection) => collection,
            Err(_) => return Ok(Vec::new()),
        };

        let patients: Vec<Patient> = collection
            .parties
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<Party>(entry).ok())
            .map(Patient::from)
            .collect();

        debug!("Listed {} patients", patients.len());
        Ok(patients)
    }

    /// 按标识查询单个患者
    ///
    /// 不解释HTTP状态码：未找到时后端的错误对象解码为空记录。
    pub async fn get_patient(&self, id: i64) -> Result<Patient> {
        let body = self.transport.fetch(&self.endpoints.party(id)?).await?;
        let envelope: PartyEnvelope = decode(&body, "party response")?;
        Ok(Patient::from(envelope.party))
    }

    /// 按MRN解析EHR标识，未找到时返回空字符串
    pub async fn resolve_ehr_id(&self, mrn: &str) -> Result<String> {
        let body = self
            .transport
            .fetch(&self.endpoints.ehr_by_subject(mrn)?)
            .await?;
        let reference: EhrReference = decode(&body, "ehr lookup response")?;
        Ok(reference.ehr_id)
    }

    /// 创建患者
    ///
    /// 两阶段创建：先注册EHR容器，再注册人口学数据，最后按返回的 `href` 重新获取规范记录。
    /// 任一POST返回冲突状态时立即中止，不再执行后续步骤。
    pub async fn create_patient(&self, patient: &Patient) -> Result<Patient> {
        let mut stage = CreateStage::Start;
        let result = self.run_create(patient, &mut stage).await;
        if let Err(e) = &result {
            error!("create-patient for mrn {} failed at stage {}: {}", patient.mrn, stage, e);
        }
        result
    }

    async fn run_create(&self, patient: &Patient, stage: &mut CreateStage) -> Result<Patient> {
        let party_json = serde_json::to_vec(&Party::for_registration(patient))?;

        let response = self
            .transport
            .submit(&self.endpoints.ehr_by_subject(&patient.mrn)?, None)
            .await?;
        ensure_no_conflict(&response, &patient.mrn)?;
        advance(stage, CreateStage::EhrRegistered);

        let response = self
            .transport
            .submit(&self.endpoints.party_collection()?, Some(party_json))
            .await?;
        ensure_no_conflict(&response, &patient.mrn)?;
        debug!("Party creation response: {}", String::from_utf8_lossy(&response.body));
        advance(stage, CreateStage::PartySubmitted);

        let created: CreatedParty = decode(&response.body, "party creation response")?;
        if created.meta.href.is_empty() {
            return Err(EhrError::decode(
                "party creation response",
                "missing meta.href",
            ));
        }

        let body = self.transport.fetch(&created.meta.href).await?;
        advance(stage, CreateStage::PartyFetched);

        let envelope: PartyEnvelope = decode(&body, "created party")?;
        let created = Patient::from(envelope.party);
        advance(stage, CreateStage::Done);

        info!("Created patient {} (mrn {})", created.id, created.mrn);
        Ok(created)
    }
}

fn advance(stage: &mut CreateStage, next: CreateStage) {
    debug!("create-patient: {} -> {}", stage, next);
    *stage = next;
}

fn ensure_no_conflict(response: &EhrResponse, mrn: &str) -> Result<()> {
    if response.is_conflict() {
        return Err(EhrError::PatientAlreadyExists {
            mrn: mrn.to_string(),
        });
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(body: &[u8], context: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| EhrError::decode(context, e))
}
