//! プロジェクト → 課題 → 作業ログの入れ子構造を作業ログ1件につき1行の表に展開する
//!
//! 各段階は1つの行形状を受け取り次の行形状を返す純粋関数で、
//! `flatten` がそれらを順に適用する。

use crate::enrichment::UserLabelCache;
use crate::entities::{Issue, Project, UserLabel, Worklog};
use crate::fields::FieldMapping;
use crate::table::{
    Cell, PARENT_KEY_COLUMN, Table, WORKLOG_START_DATE_COLUMN, WORKLOG_TYPE_COLUMN, order_columns,
    rename_columns,
};
use crate::taxonomy::GroupTaxonomy;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectColumns {
    pub project_name: Option<String>,
    pub project_key: Option<String>,
    pub project_category: Option<String>,
}

/// 作業ログを除いた課題の列
#[derive(Debug, Clone, PartialEq)]
pub struct IssueColumns {
    pub name: Option<String>,
    pub key: String,
    pub team: Option<String>,
    pub status: Option<String>,
    pub parent_key: Option<String>,
    pub worklog_type: Option<String>,
}

/// 課題単位の行。課題のないプロジェクトは `issue: None` の1行になる
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRow {
    pub project: ProjectColumns,
    pub issue: Option<(IssueColumns, Vec<Worklog>)>,
}

/// 作業ログ単位の行
#[derive(Debug, Clone, PartialEq)]
pub struct WorklogRow {
    pub project: ProjectColumns,
    pub issue: IssueColumns,
    pub worklog: Worklog,
}

/// ユーザーラベルを結合した行
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub row: WorklogRow,
    pub owner_labels: Option<UserLabel>,
}

fn split_issue(issue: Issue) -> (IssueColumns, Vec<Worklog>) {
    let Issue {
        name,
        key,
        team,
        status,
        parent_key,
        worklog_type,
        worklogs,
    } = issue;
    (
        IssueColumns {
            name,
            key,
            team,
            status,
            parent_key,
            worklog_type,
        },
        worklogs,
    )
}

/// プロジェクトの課題リストを課題1件につき1行に展開する
pub fn explode_issues(projects: Vec<Project>) -> Vec<IssueRow> {
    let mut rows = Vec::new();
    for project in projects {
        let columns = ProjectColumns {
            project_name: project.project_name,
            project_key: project.project_key,
            project_category: project.project_category,
        };
        if project.issues.is_empty() {
            rows.push(IssueRow {
                project: columns,
                issue: None,
            });
            continue;
        }
        for issue in project.issues {
            rows.push(IssueRow {
                project: columns.clone(),
                issue: Some(split_issue(issue)),
            });
        }
    }
    rows
}

/// 課題の作業ログを1件につき1行に展開する
///
/// 作業ログのない課題は行を生まない。
pub fn explode_worklogs(rows: Vec<IssueRow>) -> Vec<WorklogRow> {
    let mut exploded = Vec::new();
    for row in rows {
        let Some((issue, worklogs)) = row.issue else {
            continue;
        };
        for worklog in worklogs {
            exploded.push(WorklogRow {
                project: row.project.clone(),
                issue: issue.clone(),
                worklog,
            });
        }
    }
    exploded
}

/// 作業ログ所有者のIDでユーザーラベルを左外部結合する
pub fn join_user_labels(rows: Vec<WorklogRow>, cache: &UserLabelCache) -> Vec<EnrichedRow> {
    rows.into_iter()
        .map(|row| {
            let owner_labels = row
                .worklog
                .owner_id
                .as_deref()
                .and_then(|id| cache.get(id))
                .cloned();
            EnrichedRow { row, owner_labels }
        })
        .collect()
}

/// 入れ子のパスを `_` で連結した列名
pub fn column_path(segments: &[&str]) -> String {
    segments.join("_")
}

/// 行を表に変換する。列は発見順 (プロジェクト, 課題, 作業ログ, ユーザーラベル)
pub fn to_table(rows: Vec<EnrichedRow>, fields: &FieldMapping, taxonomy: &GroupTaxonomy) -> Table {
    let mut columns: Vec<String> = vec![
        "project_name".to_string(),
        "project_key".to_string(),
        "project_category".to_string(),
        column_path(&["issues", "name"]),
        column_path(&["issues", "key"]),
        column_path(&["issues", "team"]),
        column_path(&["issues", "status"]),
        column_path(&["issues", fields.parent.as_str()]),
        column_path(&["issues", fields.worklog_type.as_str(), "value"]),
        column_path(&["worklog", "owner"]),
        column_path(&["worklog", "owner_id"]),
        WORKLOG_START_DATE_COLUMN.to_string(),
        column_path(&["worklog", "time_spent_hr"]),
    ];
    columns.extend(taxonomy.columns());

    let mut table = Table::new(columns);
    for EnrichedRow { row, owner_labels } in rows {
        let WorklogRow {
            project,
            issue,
            worklog,
        } = row;
        let mut cells = vec![
            Cell::from(project.project_name),
            Cell::from(project.project_key),
            Cell::from(project.project_category),
            Cell::from(issue.name),
            Cell::Text(issue.key),
            Cell::from(issue.team),
            Cell::from(issue.status),
            Cell::from(issue.parent_key),
            Cell::from(issue.worklog_type),
            Cell::from(worklog.owner_display_name),
            Cell::from(worklog.owner_id),
            Cell::Date(worklog.start_date),
            Cell::Hours(worklog.time_spent_hours),
        ];
        cells.extend(taxonomy.categories().iter().map(|category| {
            Cell::from(
                owner_labels
                    .as_ref()
                    .and_then(|labels| labels.label(&category.name)),
            )
        }));
        table.push_row(cells);
    }
    table
}

/// 出力スキーマ用の列名変更
pub fn output_renames(fields: &FieldMapping) -> Vec<(String, String)> {
    vec![
        (
            column_path(&["issues", fields.parent.as_str()]),
            PARENT_KEY_COLUMN.to_string(),
        ),
        (
            column_path(&["issues", fields.worklog_type.as_str(), "value"]),
            WORKLOG_TYPE_COLUMN.to_string(),
        ),
    ]
}

/// プロジェクト構造をレポート表に変換する
pub fn flatten(
    projects: Vec<Project>,
    cache: &UserLabelCache,
    fields: &FieldMapping,
    taxonomy: &GroupTaxonomy,
) -> Table {
    let issue_rows = explode_issues(projects);
    let worklog_rows = explode_worklogs(issue_rows);
    let enriched = join_user_labels(worklog_rows, cache);
    let table = to_table(enriched, fields, taxonomy);
    let table = rename_columns(table, &output_renames(fields));
    order_columns(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fake::FakeSource;
    use crate::table::FIXED_COLUMNS;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn worklog(owner_id: Option<&str>, start: &str, hours: f64) -> Worklog {
        Worklog {
            owner_display_name: owner_id.map(|id| format!("User {}", id)),
            owner_id: owner_id.map(str::to_string),
            start_date: date(start),
            time_spent_hours: hours,
        }
    }

    fn issue(key: &str, worklogs: Vec<Worklog>) -> Issue {
        Issue {
            name: Some(format!("Summary of {}", key)),
            parent_key: Some("EPIC-1".to_string()),
            worklog_type: Some("Development".to_string()),
            worklogs,
            ..Issue::new(key)
        }
    }

    fn project(key: &str, issues: Vec<Issue>) -> Project {
        Project {
            project_name: Some(format!("Project {}", key)),
            project_key: Some(key.to_string()),
            project_category: None,
            issues,
        }
    }

    #[test]
    fn test_explode_issues_keeps_empty_project_as_one_row() {
        let rows = explode_issues(vec![
            project("A", vec![issue("A-1", vec![]), issue("A-2", vec![])]),
            project("B", vec![]),
        ]);

        assert_eq!(rows.len(), 3);
        assert!(rows[2].issue.is_none());
        assert_eq!(rows[2].project.project_key.as_deref(), Some("B"));
    }

    #[test]
    fn test_issue_without_worklogs_contributes_no_rows() {
        // Given: Aは作業ログ2件の課題、Bは作業ログなしの課題
        let projects = vec![
            project(
                "A",
                vec![issue(
                    "A-1",
                    vec![
                        worklog(Some("u1"), "2025-09-02", 1.0),
                        worklog(Some("u2"), "2025-09-03", 2.5),
                    ],
                )],
            ),
            project("B", vec![issue("B-1", vec![])]),
        ];

        // When: 展開
        let rows = explode_worklogs(explode_issues(projects));

        // Then: ちょうど2行
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.issue.key == "A-1"));
        assert_eq!(rows[1].worklog.time_spent_hours, 2.5);
    }

    #[test]
    fn test_issue_with_k_worklogs_contributes_k_rows() {
        let worklogs: Vec<Worklog> = (0..7)
            .map(|i| worklog(Some("u1"), &format!("2025-09-{:02}", i + 1), 0.5))
            .collect();

        let rows = explode_worklogs(explode_issues(vec![project("A", vec![issue("A-1", worklogs)])]));

        assert_eq!(rows.len(), 7);
    }

    #[tokio::test]
    async fn test_join_user_labels_is_left_join() {
        // Given: ラベル解決済みのu1と、未解決のシステムアカウント
        let source = FakeSource::new().with_user("u1", &["Data", "SRE"]);
        let taxonomy = GroupTaxonomy::default();
        let mut cache = UserLabelCache::new();
        cache.resolve(&source, &taxonomy, "u1").await;

        let rows = explode_worklogs(explode_issues(vec![project(
            "A",
            vec![issue(
                "A-1",
                vec![
                    worklog(Some("u1"), "2025-09-02", 1.0),
                    worklog(Some("system"), "2025-09-02", 1.0),
                    worklog(None, "2025-09-02", 1.0),
                ],
            )],
        )]));

        // When: 結合
        let joined = join_user_labels(rows, &cache);

        // Then: 行数は変わらず、未解決ユーザーはラベルなし
        assert_eq!(joined.len(), 3);
        assert_eq!(
            joined[0].owner_labels.as_ref().unwrap().label("Job Title"),
            Some("SRE")
        );
        assert!(joined[1].owner_labels.is_none());
        assert!(joined[2].owner_labels.is_none());
    }

    #[tokio::test]
    async fn test_flatten_produces_output_schema() {
        let source = FakeSource::new().with_user("u1", &["PMO", "TWO3"]);
        let taxonomy = GroupTaxonomy::default();
        let mut cache = UserLabelCache::new();
        cache.resolve(&source, &taxonomy, "u1").await;

        let projects = vec![project(
            "A",
            vec![issue("A-1", vec![worklog(Some("u1"), "2025-09-02", 1.5)])],
        )];

        let table = flatten(projects, &cache, &FieldMapping::default(), &taxonomy);

        assert_eq!(
            table.columns,
            vec![
                "project_name",
                "project_key",
                "project_category",
                "issues_name",
                "issues_key",
                "issues_team",
                "issues_status",
                "worklog_owner",
                "worklog_owner_id",
                "worklog_start_date",
                "worklog_time_spent_hr",
                "worklog_owner_EU",
                "worklog_owner_level",
                "worklog_owner_title",
                "Parent_Key",
                "Worklog Type",
            ]
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "issues_key"), Some(&Cell::Text("A-1".to_string())));
        assert_eq!(table.cell(0, "worklog_owner_EU"), Some(&Cell::Text("PMO".to_string())));
        assert_eq!(table.cell(0, "worklog_owner_level"), Some(&Cell::Text("TWO3".to_string())));
        assert_eq!(table.cell(0, "worklog_owner_title"), Some(&Cell::Null));
        assert_eq!(table.cell(0, "Parent_Key"), Some(&Cell::Text("EPIC-1".to_string())));
        assert_eq!(
            table.cell(0, "Worklog Type"),
            Some(&Cell::Text("Development".to_string()))
        );
        assert_eq!(table.cell(0, "worklog_time_spent_hr"), Some(&Cell::Hours(1.5)));
    }

    #[test]
    fn test_flatten_uses_configured_field_ids() {
        let fields = FieldMapping {
            parent: "customfield_20000".to_string(),
            worklog_type: "customfield_20001".to_string(),
            ..FieldMapping::default()
        };

        let table = flatten(
            vec![project("A", vec![issue("A-1", vec![worklog(None, "2025-09-02", 1.0)])])],
            &UserLabelCache::new(),
            &fields,
            &GroupTaxonomy::default(),
        );

        let last_two: Vec<&str> = table.columns[table.columns.len() - 2..]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(last_two, vec!["Parent_Key", "Worklog Type"]);
        assert!(!table.columns.iter().any(|c| c.contains("customfield")));
    }

    #[test]
    fn test_non_label_columns_match_fixed_columns() {
        // Given: 分類カテゴリなし
        let taxonomy = GroupTaxonomy::new(Vec::new()).unwrap();

        let table = flatten(Vec::new(), &UserLabelCache::new(), &FieldMapping::default(), &taxonomy);

        // Then: 分類ラベル検証に使う固定列と一致する
        assert_eq!(table.columns, FIXED_COLUMNS);
    }

    #[test]
    fn test_every_output_column_is_unique() {
        let table = flatten(
            Vec::new(),
            &UserLabelCache::new(),
            &FieldMapping::default(),
            &GroupTaxonomy::default(),
        );

        let mut unique = table.columns.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), table.columns.len());
    }

    #[test]
    fn test_column_path() {
        assert_eq!(
            column_path(&["issues", "customfield_10139", "value"]),
            "issues_customfield_10139_value"
        );
    }
}
