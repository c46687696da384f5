use chrono::{DateTime, NaiveDate};
use tracing::{debug, warn};

use crate::entities::Worklog;
use crate::models::RawWorklog;
use crate::source::TrackerSource;

const STARTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// 作業ログの開始日時 (`2025-09-02T09:30:00.000+0800`) を暦日に変換する
///
/// 日付はエントリ自身のオフセットで判定し、時刻とタイムゾーンは捨てる。
pub fn parse_started_date(started: &str) -> Result<NaiveDate, chrono::ParseError> {
    let started = DateTime::parse_from_str(started, STARTED_FORMAT)?;
    Ok(started.date_naive())
}

pub fn seconds_to_hours(seconds: i64) -> f64 {
    seconds as f64 / 3600.0
}

/// 課題の作業ログを取得する
///
/// 取得に失敗した課題は作業ログなしとして扱い、実行は継続する。
pub async fn fetch_worklogs(source: &dyn TrackerSource, issue_key: &str) -> Vec<Worklog> {
    let page = match source.get_worklogs(issue_key).await {
        Ok(page) => page,
        Err(err) => {
            warn!(issue = %issue_key, error = %err, "worklog fetch failed, treating as empty");
            return Vec::new();
        }
    };

    let worklogs: Vec<Worklog> = page
        .worklogs
        .into_iter()
        .filter_map(|raw| normalize_worklog(issue_key, raw))
        .collect();

    debug!(issue = %issue_key, worklogs = worklogs.len(), "fetched worklogs");
    worklogs
}

fn normalize_worklog(issue_key: &str, raw: RawWorklog) -> Option<Worklog> {
    let start_date = match parse_started_date(&raw.started) {
        Ok(date) => date,
        Err(err) => {
            warn!(issue = %issue_key, started = %raw.started, error = %err, "dropping worklog with unparsable start");
            return None;
        }
    };

    let (owner_display_name, owner_id) = match raw.author {
        Some(author) => (author.display_name, author.account_id),
        None => (None, None),
    };

    Some(Worklog {
        owner_display_name,
        owner_id,
        start_date,
        time_spent_hours: seconds_to_hours(raw.time_spent_seconds),
    })
}
