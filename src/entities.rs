//! 1回の実行の間だけ存在するレポート用エンティティ
//!
//! 課題 → 作業ログ → ユーザーという入れ子構造を明示的な型で表す。
//! 欠損は `Option` で表し、マップのキー欠落には頼らない。

use chrono::NaiveDate;
use std::collections::HashMap;

/// 検索結果から抽出した課題
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub name: Option<String>,
    pub key: String,
    pub team: Option<String>,
    pub status: Option<String>,
    pub parent_key: Option<String>,
    pub worklog_type: Option<String>,
    /// 課題ごとの作業ログ。取得前は空
    pub worklogs: Vec<Worklog>,
}

/// プロジェクトへのグルーピング前の課題
///
/// プロジェクトキーは `Issue` の外に置き、グルーピング時に所有権ごと `Project` へ移す。
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedIssue {
    pub project_key: Option<String>,
    pub issue: Issue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub project_name: Option<String>,
    pub project_key: Option<String>,
    pub project_category: Option<String>,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Worklog {
    pub owner_display_name: Option<String>,
    pub owner_id: Option<String>,
    pub start_date: NaiveDate,
    pub time_spent_hours: f64,
}

/// ユーザーの分類ラベル。一致しなかったカテゴリはキーごと存在しない
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserLabel {
    pub user_id: String,
    pub labels: HashMap<String, String>,
}

impl UserLabel {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            labels: HashMap::new(),
        }
    }

    pub fn label(&self, category: &str) -> Option<&str> {
        self.labels.get(category).map(String::as_str)
    }
}

impl Issue {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            name: None,
            key: key.into(),
            team: None,
            status: None,
            parent_key: None,
            worklog_type: None,
            worklogs: Vec::new(),
        }
    }
}
