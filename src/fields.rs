use serde::{Deserialize, Serialize};

/// 課題から読み出すカスタムフィールドのID
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMapping {
    /// チーム。`name` を持つオブジェクト
    pub team: String,
    /// ステータス。`value` を持つオブジェクト
    pub status: String,
    /// 親課題キー。そのまま出力する
    pub parent: String,
    /// 作業種別。`value` を持つオブジェクト
    pub worklog_type: String,
}

impl FieldMapping {
    /// 検索APIに要求するフィールド一覧
    pub fn search_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = ["summary", "project", "worklog"]
            .iter()
            .map(|f| f.to_string())
            .collect();
        fields.extend([
            self.team.clone(),
            self.status.clone(),
            self.parent.clone(),
            self.worklog_type.clone(),
        ]);
        fields
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            team: "customfield_10001".to_string(),
            status: "customfield_10035".to_string(),
            parent: "customfield_10142".to_string(),
            worklog_type: "customfield_10139".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_fields_include_custom_fields() {
        let mapping = FieldMapping::default();

        let fields = mapping.search_fields();

        assert_eq!(
            fields.join(","),
            "summary,project,worklog,customfield_10001,customfield_10035,customfield_10142,customfield_10139"
        );
    }
}
