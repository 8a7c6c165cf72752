//! 核心数据模型定义

use serde::{Deserialize, Serialize};

/// 患者规范记录
///
/// 所有字段均为纯字符串；`id` 由外部EHR系统分配，创建完成前为空。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Patient {
    pub id: String,
    pub firstname: String,
    pub surname: String,
    pub gender: String,
    pub dob: String, // 出生日期，原样透传，不做格式校验
    pub address: String,
    pub mrn: String, // 病历号
    pub tumor_type: String,
    pub surgical: String,
    pub phone: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_wire_names() {
        let patient = Patient {
            mrn: "M1".to_string(),
            tumor_type: "X".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["mrn"], "M1");
        assert_eq!(json["tumorType"], "X");
        assert_eq!(json["id"], "");
    }

    #[test]
    fn test_patient_missing_fields_default_to_empty() {
        let patient: Patient = serde_json::from_str(r#"{"firstname": "Ada"}"#).unwrap();
        assert_eq!(patient.firstname, "Ada");
        assert_eq!(patient.surname, "");
        assert_eq!(patient.email, "");
    }
}
