//! 作業ログ期間で課題を検索し、ページングしながら必要なフィールドを抽出する

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::entities::{FetchedIssue, Issue};
use crate::error::{Error, Result};
use crate::fields::FieldMapping;
use crate::models::{RawIssue, SearchParams};
use crate::source::TrackerSource;

pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// `[start_date, end_date)` に作業ログがある課題を作成日時の昇順で検索するJQL
pub fn worklog_window_jql(start_date: NaiveDate, end_date: NaiveDate) -> String {
    format!(
        "worklogDate >= \"{}\" AND worklogDate < \"{}\" ORDER BY created ASC",
        start_date.format("%Y-%m-%d"),
        end_date.format("%Y-%m-%d")
    )
}

/// 課題検索の取得結果と欠損フィールドの集計
#[derive(Debug, Clone, Default)]
pub struct IssueFetch {
    pub issues: Vec<FetchedIssue>,
    pub pages: usize,
    pub missing_team: usize,
    pub missing_status: usize,
}

/// 期間内に作業ログがある課題をすべて取得する
///
/// 取得件数がページサイズ未満のページを受け取った時点で終了する。
/// 検索が失敗した場合は途中までの結果を捨てて `SourceUnavailable` を返す。
pub async fn fetch_active_issues(
    source: &dyn TrackerSource,
    fields: &FieldMapping,
    start_date: NaiveDate,
    end_date: NaiveDate,
    page_size: u32,
) -> Result<IssueFetch> {
    if page_size == 0 {
        return Err(Error::InvalidConfiguration(
            "page size must be greater than zero".to_string(),
        ));
    }

    let jql = worklog_window_jql(start_date, end_date);
    let mut fetch = IssueFetch::default();
    let mut start_at = 0u32;

    loop {
        let params = SearchParams::new(jql.clone())
            .start_at(start_at)
            .max_results(page_size)
            .fields(fields.search_fields())
            .expand(vec!["changelog".to_string()]);

        let page = source.search_issues(&params).await.map_err(|err| match err {
            Error::ApiError { status, message } => {
                tracing::error!(status, body = %message, "issue search failed");
                Error::SourceUnavailable {
                    status,
                    body: message,
                }
            }
            other => other,
        })?;

        let received = page.issues.len();
        fetch.pages += 1;
        info!(start_at, received, "fetched issue page");

        for raw in page.issues {
            let fetched = extract_issue(raw, fields);
            if fetched.issue.team.is_none() {
                warn!(issue = %fetched.issue.key, field = %fields.team, "issue has no team");
                fetch.missing_team += 1;
            }
            if fetched.issue.status.is_none() {
                warn!(issue = %fetched.issue.key, field = %fields.status, "issue has no status");
                fetch.missing_status += 1;
            }
            fetch.issues.push(fetched);
        }

        if received < page_size as usize {
            break;
        }
        start_at += page_size;
    }

    info!(
        issues = fetch.issues.len(),
        pages = fetch.pages,
        missing_team = fetch.missing_team,
        missing_status = fetch.missing_status,
        "fetched active issues"
    );
    Ok(fetch)
}

/// 検索結果の課題から必要なフィールドだけを抜き出す
pub fn extract_issue(raw: RawIssue, fields: &FieldMapping) -> FetchedIssue {
    let custom = &raw.fields;

    let issue = Issue {
        name: custom.summary.clone(),
        key: raw.key.clone(),
        team: object_label(custom.custom_field(&fields.team), "name"),
        status: object_label(custom.custom_field(&fields.status), "value"),
        parent_key: custom.custom_field(&fields.parent).map(pass_through),
        worklog_type: object_label(custom.custom_field(&fields.worklog_type), "value"),
        worklogs: Vec::new(),
    };

    FetchedIssue {
        project_key: custom.project.as_ref().and_then(|p| p.key.clone()),
        issue,
    }
}

/// オブジェクト形式のフィールドからラベルを取り出す。形が違えば `None`
fn object_label(value: Option<&Value>, label_key: &str) -> Option<String> {
    match value {
        Some(Value::Object(map)) => map.get(label_key).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }),
        _ => None,
    }
}

fn pass_through(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
