use serde::{Deserialize, Serialize};

/// `/rest/api/3/issue/{key}/worklog` のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorklogPage {
    #[serde(rename = "startAt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default)]
    pub worklogs: Vec<RawWorklog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWorklog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<WorklogAuthor>,
    /// 例: `2025-09-02T09:30:00.000+0800`
    pub started: String,
    #[serde(rename = "timeSpentSeconds")]
    pub time_spent_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorklogAuthor {
    #[serde(rename = "accountId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "displayName")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}
