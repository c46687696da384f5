use serde::{Deserialize, Serialize};

/// `/rest/api/2/project/{key}` のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "projectCategory")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_category: Option<ProjectCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProjectDetails {
    pub fn category_name(&self) -> Option<&str> {
        self.project_category
            .as_ref()
            .and_then(|category| category.name.as_deref())
    }
}
