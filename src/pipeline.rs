use serde::{Deserialize, Serialize};
use tracing::info;

use crate::csv_export::{CSV_CONTENT_TYPE, table_to_csv};
use crate::date_filter::{DateRange, filter_by_date};
use crate::denormalize::flatten;
use crate::enrichment::UserLabelCache;
use crate::entities::Project;
use crate::error::Result;
use crate::fields::FieldMapping;
use crate::issues::{DEFAULT_PAGE_SIZE, fetch_active_issues};
use crate::projects::resolve_projects;
use crate::source::TrackerSource;
use crate::storage::ObjectSink;
use crate::table::Table;
use crate::taxonomy::GroupTaxonomy;
use crate::worklogs::fetch_worklogs;

/// レポート生成の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSettings {
    /// 出力先バケット
    pub bucket: String,
    pub page_size: u32,
    pub fields: FieldMapping,
    pub taxonomy: GroupTaxonomy,
    /// CSVの先頭にUTF-8 BOMを付けるか
    pub csv_bom: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            bucket: "temp-report".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            fields: FieldMapping::default(),
            taxonomy: GroupTaxonomy::default(),
            csv_bom: false,
        }
    }
}

/// 各段階の件数
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunStats {
    pub issues: usize,
    pub missing_team: usize,
    pub missing_status: usize,
    pub projects: usize,
    pub worklogs: usize,
    pub users_resolved: usize,
    pub user_lookup_failures: usize,
    pub rows_before_filter: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportOutcome {
    pub location: String,
    pub object_name: String,
    pub row_count: usize,
    pub stats: RunStats,
}

/// 課題取得から日付絞り込みまでを実行してレポート表を作る
///
/// すべての取得は取得順に1件ずつ待ち合わせる。ユーザーラベルのキャッシュはこの実行の中だけで使う。
pub async fn build_report_table(
    source: &dyn TrackerSource,
    settings: &ReportSettings,
    range: &DateRange,
) -> Result<(Table, RunStats)> {
    range.validate()?;
    let mut stats = RunStats::default();

    // Step 1: 課題
    let fetch = fetch_active_issues(
        source,
        &settings.fields,
        range.start,
        range.end,
        settings.page_size,
    )
    .await?;
    stats.issues = fetch.issues.len();
    stats.missing_team = fetch.missing_team;
    stats.missing_status = fetch.missing_status;

    // Step 2: プロジェクト
    let mut projects = resolve_projects(source, fetch.issues).await;
    stats.projects = projects.len();

    // Step 3: 作業ログとユーザーラベル
    let mut cache = UserLabelCache::new();
    stats.worklogs = attach_worklogs(source, &settings.taxonomy, &mut projects, &mut cache).await;
    stats.users_resolved = cache.len();
    stats.user_lookup_failures = cache.failures();
    info!(
        worklogs = stats.worklogs,
        users = stats.users_resolved,
        "fetched worklogs and user labels"
    );

    // Step 4: 展開と結合
    let table = flatten(projects, &cache, &settings.fields, &settings.taxonomy);
    stats.rows_before_filter = table.len();
    info!(rows = table.len(), "flattened report rows");

    // Step 5: 期間で絞り込み
    let table = filter_by_date(&table, range.start, range.end);
    stats.rows = table.len();
    info!(rows = table.len(), "filtered report rows");

    Ok((table, stats))
}

async fn attach_worklogs(
    source: &dyn TrackerSource,
    taxonomy: &GroupTaxonomy,
    projects: &mut [Project],
    cache: &mut UserLabelCache,
) -> usize {
    let mut total = 0;
    for project in projects.iter_mut() {
        for issue in project.issues.iter_mut() {
            issue.worklogs = fetch_worklogs(source, &issue.key).await;
            total += issue.worklogs.len();
            for worklog in &issue.worklogs {
                if let Some(user_id) = worklog.owner_id.as_deref() {
                    cache.resolve(source, taxonomy, user_id).await;
                }
            }
        }
    }
    total
}

/// レポートを生成して保存先へ書き込む
pub async fn generate_report(
    source: &dyn TrackerSource,
    sink: &dyn ObjectSink,
    settings: &ReportSettings,
    range: &DateRange,
) -> Result<ReportOutcome> {
    let (table, stats) = build_report_table(source, settings, range).await?;

    let content = table_to_csv(&table, settings.csv_bom)?;
    let object_name = range.report_object_name();
    let location = sink
        .store(&settings.bucket, &object_name, content, CSV_CONTENT_TYPE)
        .await?;

    info!(%location, rows = stats.rows, "report stored");
    Ok(ReportOutcome {
        location,
        object_name,
        row_count: stats.rows,
        stats,
    })
}
