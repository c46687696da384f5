use serde::{Deserialize, Serialize};

/// `/rest/api/3/user?expand=groups` のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserGroups {
    #[serde(rename = "accountId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "displayName")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub groups: GroupList,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GroupList {
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub items: Vec<GroupItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupItem {
    pub name: String,
}

impl UserGroups {
    pub fn group_names(&self) -> Vec<String> {
        self.groups.items.iter().map(|g| g.name.clone()).collect()
    }
}
