//! 環境変数からの設定読み込み

use std::path::PathBuf;

use crate::client::{Auth, JiraConfig};
use crate::error::{Error, Result};
use crate::fields::FieldMapping;
use crate::issues::DEFAULT_PAGE_SIZE;
use crate::pipeline::ReportSettings;
use crate::storage::{GCE_METADATA_TOKEN_URL, GCS_UPLOAD_URL, GcsCredentials};
use crate::taxonomy::GroupTaxonomy;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BUCKET: &str = "temp-report";

/// レポートの保存先
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    Gcs { upload_url: String, credentials: GcsCredentials },
    Local { root: PathBuf },
}

impl StorageConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageConfig::Gcs { .. } => "gcs",
            StorageConfig::Local { .. } => "local",
        }
    }
}

/// サービス全体の設定
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub jira: JiraConfig,
    pub settings: ReportSettings,
    pub storage: StorageConfig,
    pub port: u16,
}

impl ReportConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// キーから値を引く関数で設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                Error::ConfigurationMissing(format!("{} not found in environment", key))
            })
        };

        let base_url = require("JIRA_URL")?;
        let username = require("JIRA_EMAIL")?;
        let api_token = require("JIRA_TOKEN")?;
        let jira = JiraConfig::new(base_url, Auth::Basic { username, api_token })?;

        let defaults = FieldMapping::default();
        let fields = FieldMapping {
            team: get("JIRA_TEAM_FIELD").unwrap_or(defaults.team),
            status: get("JIRA_STATUS_FIELD").unwrap_or(defaults.status),
            parent: get("JIRA_PARENT_FIELD").unwrap_or(defaults.parent),
            worklog_type: get("JIRA_WORKLOG_TYPE_FIELD").unwrap_or(defaults.worklog_type),
        };

        let taxonomy = match get("REPORT_TAXONOMY_FILE") {
            Some(path) => GroupTaxonomy::from_file(&path).map_err(|e| {
                Error::InvalidConfiguration(format!("REPORT_TAXONOMY_FILE {}: {}", path, e))
            })?,
            None => GroupTaxonomy::default(),
        };

        let page_size = match get("REPORT_PAGE_SIZE") {
            Some(raw) => parse_number::<u32>("REPORT_PAGE_SIZE", &raw)
                .and_then(|n| {
                    if n == 0 {
                        Err(Error::InvalidConfiguration(
                            "REPORT_PAGE_SIZE must be greater than zero".to_string(),
                        ))
                    } else {
                        Ok(n)
                    }
                })?,
            None => DEFAULT_PAGE_SIZE,
        };

        let csv_bom = match get("REPORT_CSV_BOM") {
            Some(raw) => parse_flag("REPORT_CSV_BOM", &raw)?,
            None => false,
        };

        let port = match get("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let storage = match get("STORAGE_BACKEND").as_deref().unwrap_or("gcs") {
            "gcs" => StorageConfig::Gcs {
                upload_url: get("GCS_UPLOAD_URL").unwrap_or_else(|| GCS_UPLOAD_URL.to_string()),
                credentials: match get("GCS_ACCESS_TOKEN") {
                    Some(token) => GcsCredentials::Static(token),
                    None => GcsCredentials::Metadata {
                        token_url: get("GCS_METADATA_TOKEN_URL")
                            .unwrap_or_else(|| GCE_METADATA_TOKEN_URL.to_string()),
                    },
                },
            },
            "local" => StorageConfig::Local {
                root: PathBuf::from(get("LOCAL_STORAGE_DIR").unwrap_or_else(|| "./reports".to_string())),
            },
            other => {
                return Err(Error::InvalidConfiguration(format!(
                    "STORAGE_BACKEND must be gcs or local, got {}",
                    other
                )));
            }
        };

        Ok(Self {
            jira,
            settings: ReportSettings {
                bucket: get("BUCKET_NAME").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                page_size,
                fields,
                taxonomy,
                csv_bom,
            },
            storage,
            port,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::InvalidConfiguration(format!("{} must be a number, got {}", key, raw)))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(Error::InvalidConfiguration(format!(
            "{} must be true or false, got {}",
            key, raw
        ))),
    }
}
