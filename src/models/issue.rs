use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 検索APIが返す課題レコード
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    pub key: String,
    #[serde(default)]
    pub fields: RawIssueFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawIssueFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,

    // カスタムフィールドは動的に追加
    #[serde(flatten)]
    pub custom_fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RawIssueFields {
    pub fn custom_field(&self, id: &str) -> Option<&serde_json::Value> {
        self.custom_fields.get(id).filter(|value| !value.is_null())
    }
}
