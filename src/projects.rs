use std::collections::HashMap;
use tracing::{info, warn};

use crate::entities::{FetchedIssue, Issue, Project};
use crate::source::TrackerSource;

/// 同じプロジェクトキーを持つ課題のまとまり
#[derive(Debug, Clone, PartialEq)]
pub struct IssueGroup {
    pub project_key: Option<String>,
    pub issues: Vec<Issue>,
}

/// 課題をプロジェクトキーで分割する
///
/// グループは最初に現れた順、各グループ内の課題は元の相対順を保つ。
/// プロジェクトキーはここで課題から取り除かれる。
pub fn group_by_project(issues: Vec<FetchedIssue>) -> Vec<IssueGroup> {
    let mut groups: Vec<IssueGroup> = Vec::new();
    let mut positions: HashMap<Option<String>, usize> = HashMap::new();

    for FetchedIssue { project_key, issue } in issues {
        match positions.get(&project_key) {
            Some(&index) => groups[index].issues.push(issue),
            None => {
                positions.insert(project_key.clone(), groups.len());
                groups.push(IssueGroup {
                    project_key,
                    issues: vec![issue],
                });
            }
        }
    }

    groups
}

/// プロジェクトごとにメタデータを1回だけ取得して課題を紐付ける
pub async fn resolve_projects(source: &dyn TrackerSource, issues: Vec<FetchedIssue>) -> Vec<Project> {
    let groups = group_by_project(issues);
    let mut projects = Vec::with_capacity(groups.len());

    for group in groups {
        let project = match group.project_key {
            Some(key) => resolve_project(source, key, group.issues).await,
            None => {
                warn!(issues = group.issues.len(), "issues without a project key");
                Project {
                    project_name: None,
                    project_key: None,
                    project_category: None,
                    issues: group.issues,
                }
            }
        };
        projects.push(project);
    }

    info!(projects = projects.len(), "resolved projects");
    projects
}

async fn resolve_project(source: &dyn TrackerSource, key: String, issues: Vec<Issue>) -> Project {
    match source.get_project(&key).await {
        Ok(details) => Project {
            project_name: details.name.clone(),
            project_category: details.category_name().map(str::to_string),
            project_key: details.key.or(Some(key)),
            issues,
        },
        Err(err) => {
            warn!(project = %key, error = %err, "project lookup failed");
            Project {
                project_name: None,
                project_key: Some(key),
                project_category: None,
                issues,
            }
        }
    }
}
