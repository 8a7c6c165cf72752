//! Party记录与转换
//!
//! 外部人口学记录（Party）以键值对列表携带领域扩展字段。
//! 此处将该列表建模为固定形状的可选字段记录，只在序列化边界转换为列表形式。

use ehr_core::Patient;
use serde::{Deserialize, Deserializer, Serialize};

/// `null` 与缺省字段一样视为空值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 识别的扩展键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKey {
    Mrn,
    TumorType,
    Surgical,
    Phone,
    Email,
}

impl ExtensionKey {
    /// 创建患者时写出的固定顺序
    pub const ALL: [ExtensionKey; 5] = [
        ExtensionKey::Mrn,
        ExtensionKey::TumorType,
        ExtensionKey::Surgical,
        ExtensionKey::Phone,
        ExtensionKey::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mrn => "rnsh.mrn",
            Self::TumorType => "tumorType",
            Self::Surgical => "surgical",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }

    /// 精确匹配键名，未识别返回 `None`
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// 扩展键值对（线上形式）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

/// Party扩展字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PartyInfo>", into = "Vec<PartyInfo>")]
pub struct PartyExtensions {
    pub mrn: Option<String>,
    pub tumor_type: Option<String>,
    pub surgical: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PartyExtensions {
    fn slot(&mut self, key: ExtensionKey) -> &mut Option<String> {
        match key {
            ExtensionKey::Mrn => &mut self.mrn,
            ExtensionKey::TumorType => &mut self.tumor_type,
            ExtensionKey::Surgical => &mut self.surgical,
            ExtensionKey::Phone => &mut self.phone,
            ExtensionKey::Email => &mut self.email,
        }
    }

    pub fn get(&self, key: ExtensionKey) -> Option<&str> {
        match key {
            ExtensionKey::Mrn => self.mrn.as_deref(),
            ExtensionKey::TumorType => self.tumor_type.as_deref(),
            ExtensionKey::Surgical => self.surgical.as_deref(),
            ExtensionKey::Phone => self.phone.as_deref(),
            ExtensionKey::Email => self.email.as_deref(),
        }
    }
}

impl From<Vec<PartyInfo>> for PartyExtensions {
    fn from(pairs: Vec<PartyInfo>) -> Self {
        let mut extensions = Self::default();
        for pair in pairs {
            // 未识别的键直接丢弃；重复键以最后一个为准
            if let Some(key) = ExtensionKey::from_key(&pair.key) {
                *extensions.slot(key) = Some(pair.value);
            }
        }
        extensions
    }
}

impl From<PartyExtensions> for Vec<PartyInfo> {
    fn from(extensions: PartyExtensions) -> Self {
        ExtensionKey::ALL
            .into_iter()
            .filter_map(|key| {
                extensions.get(key).map(|value| PartyInfo {
                    key: key.as_str().to_string(),
                    value: value.to_string(),
                })
            })
            .collect()
    }
}

/// Party地址
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyAddress {
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
}

/// 外部人口学记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Party {
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_names: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_names: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_of_birth: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: PartyAddress,
    #[serde(rename = "partyAdditionalInfo", deserialize_with = "null_as_default")]
    pub extensions: PartyExtensions,
}

impl Party {
    /// 由患者人口学字段构造待注册的Party，五个扩展键全部写出
    pub fn for_registration(patient: &Patient) -> Self {
        Self {
            id: String::new(),
            first_names: patient.firstname.clone(),
            last_names: patient.surname.clone(),
            gender: patient.gender.clone(),
            date_of_birth: patient.dob.clone(),
            address: PartyAddress {
                id: String::new(),
                address: patient.address.clone(),
            },
            extensions: PartyExtensions {
                mrn: Some(patient.mrn.clone()),
                tumor_type: Some(patient.tumor_type.clone()),
                surgical: Some(patient.surgical.clone()),
                phone: Some(patient.phone.clone()),
                email: Some(patient.email.clone()),
            },
        }
    }
}

impl From<Party> for Patient {
    fn from(party: Party) -> Self {
        let extensions = party.extensions;
        Patient {
            id: party.id,
            firstname: party.first_names,
            surname: party.last_names,
            gender: party.gender,
            dob: party.date_of_birth,
            address: party.address.address,
            mrn: extensions.mrn.unwrap_or_default(),
            tumor_type: extensions.tumor_type.unwrap_or_default(),
            surgical: extensions.surgical.unwrap_or_default(),
            phone: extensions.phone.unwrap_or_default(),
            email: extensions.email.unwrap_or_default(),
        }
    }
}

/// 单个Party响应 `{"party": {...}}`
///
/// 未找到时后端返回不含 `party` 的错误对象，此时得到空记录。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartyEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub party: Party,
}

/// 查询响应，条目延迟解码
#[derive(Debug, Clone, Deserialize)]
pub struct PartyCollection {
    pub parties: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatedPartyMeta {
    pub href: String,
}

/// Party创建响应 `{"meta": {"href": "..."}}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatedParty {
    pub meta: CreatedPartyMeta,
}

/// EHR查询响应，未找到时 `ehr_id` 为空
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EhrReference {
    #[serde(deserialize_with = "null_as_default")]
    pub ehr_id: String,
}
