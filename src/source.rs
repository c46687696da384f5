use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProjectDetails, SearchPage, SearchParams, UserGroups, WorklogPage};

/// ETLコアが利用する課題管理APIの抽象化トレイト
///
/// 本番では [`crate::JiraClient`] が実装する。テストではメモリ上の実装に差し替える。
#[async_trait]
pub trait TrackerSource: Send + Sync {
    /// 課題検索の1ページを取得
    async fn search_issues(&self, params: &SearchParams) -> Result<SearchPage>;

    /// プロジェクトのメタデータを取得
    async fn get_project(&self, key: &str) -> Result<ProjectDetails>;

    /// 課題に記録された作業ログを取得
    async fn get_worklogs(&self, issue_key: &str) -> Result<WorklogPage>;

    /// ユーザーの所属グループを取得
    async fn get_user_groups(&self, account_id: &str) -> Result<UserGroups>;
}
