use super::RawIssue;
use serde::{Deserialize, Serialize};

/// 課題検索 (`/rest/api/3/search/jql`) のクエリパラメータ
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SearchParams {
    pub jql: String,

    #[serde(rename = "startAt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,

    #[serde(rename = "maxResults")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand: Option<Vec<String>>,
}

/// 検索結果の1ページ
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<RawIssue>,

    #[serde(rename = "startAt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,

    #[serde(rename = "maxResults")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

impl SearchParams {
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            ..Self::default()
        }
    }

    pub fn start_at(mut self, start_at: u32) -> Self {
        self.start_at = Some(start_at);
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn expand(mut self, expand: Vec<String>) -> Self {
        self.expand = Some(expand);
        self
    }

    /// GETリクエスト用のクエリ文字列ペアに変換する。リストはカンマ区切り
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("jql", self.jql.clone())];
        if let Some(start_at) = self.start_at {
            pairs.push(("startAt", start_at.to_string()));
        }
        if let Some(max_results) = self.max_results {
            pairs.push(("maxResults", max_results.to_string()));
        }
        if let Some(fields) = &self.fields {
            pairs.push(("fields", fields.join(",")));
        }
        if let Some(expand) = &self.expand {
            pairs.push(("expand", expand.join(",")));
        }
        pairs
    }
}
