//! 所属グループ名をレポート用の分類ラベルへ対応付ける

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::entities::UserLabel;
use crate::error::{Error, Result};
use crate::table::{FIXED_COLUMNS, ISSUE_COLUMN_PREFIX};

/// 分類カテゴリ (例: 所属部門、職位)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxonomyCategory {
    pub name: String,
    /// 出力CSVの列名。省略時は `worklog_owner_<name>`
    #[serde(default)]
    pub column: Option<String>,
    /// 認識するグループ名。先頭ほど優先
    pub groups: Vec<String>,
}

impl TaxonomyCategory {
    pub fn new(name: &str, column: &str, groups: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            column: Some(column.to_string()),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub fn column_name(&self) -> String {
        match &self.column {
            Some(column) => column.clone(),
            None => format!("worklog_owner_{}", snake_case(&self.name)),
        }
    }

    /// 設定順で最初に一致したグループ名
    pub fn first_match<'a>(&'a self, memberships: &[String]) -> Option<&'a str> {
        self.groups
            .iter()
            .find(|group| memberships.iter().any(|m| m == *group))
            .map(String::as_str)
    }
}

/// 順序付きの分類カテゴリ一覧
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct GroupTaxonomy {
    categories: Vec<TaxonomyCategory>,
}

impl GroupTaxonomy {
    pub fn new(categories: Vec<TaxonomyCategory>) -> Result<Self> {
        let taxonomy = Self { categories };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn categories(&self) -> &[TaxonomyCategory] {
        &self.categories
    }

    /// 出力列名 (カテゴリ順)
    pub fn columns(&self) -> Vec<String> {
        self.categories.iter().map(TaxonomyCategory::column_name).collect()
    }

    /// ユーザーの所属グループからラベルを決める
    ///
    /// カテゴリごとに設定順で最初に一致した名前を採用し、一致しないカテゴリは含めない。
    pub fn label(&self, user_id: &str, memberships: &[String]) -> UserLabel {
        let labels: HashMap<String, String> = self
            .categories
            .iter()
            .filter_map(|category| {
                category
                    .first_match(memberships)
                    .map(|group| (category.name.clone(), group.to_string()))
            })
            .collect();

        UserLabel {
            user_id: user_id.to_string(),
            labels,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let taxonomy: GroupTaxonomy = serde_json::from_str(json)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    fn validate(&self) -> Result<()> {
        let mut seen_names = Vec::new();
        let mut seen_columns = Vec::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(Error::InvalidConfiguration(
                    "taxonomy category name must not be empty".to_string(),
                ));
            }
            let column = category.column_name();
            if FIXED_COLUMNS.contains(&column.as_str()) || column.starts_with(ISSUE_COLUMN_PREFIX) {
                return Err(Error::InvalidConfiguration(format!(
                    "taxonomy category {} uses reserved column {}",
                    category.name, column
                )));
            }
            if seen_names.contains(&category.name) || seen_columns.contains(&column) {
                return Err(Error::InvalidConfiguration(format!(
                    "duplicate taxonomy category: {}",
                    category.name
                )));
            }
            seen_names.push(category.name.clone());
            seen_columns.push(column);
        }
        Ok(())
    }
}

impl Default for GroupTaxonomy {
    fn default() -> Self {
        Self {
            categories: vec![
                TaxonomyCategory::new(
                    "Executive Unit",
                    "worklog_owner_EU",
                    &[
                        "AWS-TW",
                        "AWS-HK",
                        "GCP-TW",
                        "GWS-TW",
                        "Google-HK",
                        "Data",
                        "Multicloud",
                        "MS",
                        "PMO",
                        "專案開發部",
                        "SEA",
                        "產品及解決方案處",
                    ],
                ),
                TaxonomyCategory::new(
                    "Job Level",
                    "worklog_owner_level",
                    &["TWO1", "TWO2", "TWO3", "HKO1"],
                ),
                TaxonomyCategory::new(
                    "Job Title",
                    "worklog_owner_title",
                    &["SA", "PM", "Data Engineer", "SRE", "TAM"],
                ),
            ],
        }
    }
}

fn snake_case(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_label_assigns_one_name_per_category() {
        // Given: 部門と職種のグループに所属するユーザー
        let taxonomy = GroupTaxonomy::default();
        let memberships = groups(&["jira-users", "GCP-TW", "SRE"]);

        // When: ラベル付け
        let label = taxonomy.label("u1", &memberships);

        // Then: 一致したカテゴリだけが入る
        assert_eq!(label.user_id, "u1");
        assert_eq!(label.label("Executive Unit"), Some("GCP-TW"));
        assert_eq!(label.label("Job Title"), Some("SRE"));
        assert!(label.label("Job Level").is_none());
        assert_eq!(label.labels.len(), 2);
    }

    #[test]
    fn test_first_configured_name_wins() {
        // Given: 同じカテゴリの認識名に2つ所属 (所属順は設定順と逆)
        let taxonomy = GroupTaxonomy::default();
        let memberships = groups(&["PMO", "AWS-HK"]);

        let label = taxonomy.label("u2", &memberships);

        // Then: 設定で先に並ぶ AWS-HK が採用される
        assert_eq!(label.label("Executive Unit"), Some("AWS-HK"));
    }

    #[test]
    fn test_no_match_yields_empty_labels() {
        let label = GroupTaxonomy::default().label("bot", &groups(&["site-admins"]));

        assert!(label.labels.is_empty());
    }

    #[test]
    fn test_default_columns_in_order() {
        assert_eq!(
            GroupTaxonomy::default().columns(),
            vec![
                "worklog_owner_EU".to_string(),
                "worklog_owner_level".to_string(),
                "worklog_owner_title".to_string(),
            ]
        );
    }

    #[test]
    fn test_from_json_derives_missing_column() {
        let json = r#"[
            { "name": "Cost Center", "groups": ["CC-100", "CC-200"] },
            { "name": "Job Level", "column": "worklog_owner_level", "groups": ["L1"] }
        ]"#;

        let taxonomy = GroupTaxonomy::from_json(json).unwrap();

        assert_eq!(
            taxonomy.columns(),
            vec![
                "worklog_owner_cost_center".to_string(),
                "worklog_owner_level".to_string(),
            ]
        );
        assert_eq!(taxonomy.categories()[0].groups.len(), 2);
    }

    #[test]
    fn test_duplicate_category_is_rejected() {
        let json = r#"[
            { "name": "Team", "groups": ["A"] },
            { "name": "Team", "groups": ["B"] }
        ]"#;

        let result = GroupTaxonomy::from_json(json);

        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_column_colliding_with_report_columns_is_rejected() {
        // Given: 固定列と同じ列名になるカテゴリ
        let cases = [
            r#"[{ "name": "Id", "groups": ["A"] }]"#,
            r#"[{ "name": "Kind", "column": "Worklog Type", "groups": ["A"] }]"#,
            r#"[{ "name": "Parent", "column": "Parent_Key", "groups": ["A"] }]"#,
            r#"[{ "name": "Epic", "column": "issues_customfield_10142", "groups": ["A"] }]"#,
        ];

        for json in cases {
            // When: JSONから読み込む
            let result = GroupTaxonomy::from_json(json);

            // Then: InvalidConfiguration
            assert!(
                matches!(result, Err(Error::InvalidConfiguration(_))),
                "{} should be rejected",
                json
            );
        }
    }

    #[test]
    fn test_from_file_reads_taxonomy() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("taxonomy.json");
        std::fs::write(&path, r#"[{ "name": "Region", "groups": ["APAC"] }]"#).unwrap();

        let taxonomy = GroupTaxonomy::from_file(&path).unwrap();

        assert_eq!(taxonomy.columns(), vec!["worklog_owner_region".to_string()]);
    }
}
