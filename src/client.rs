use crate::error::Result;
use crate::models::{ProjectDetails, SearchPage, SearchParams, UserGroups, WorklogPage};
use crate::source::TrackerSource;
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, header};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone)]
pub enum Auth {
    Basic { username: String, api_token: String },
    Bearer { token: String },
}

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub auth: Auth,
}

impl JiraConfig {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let base_url = base_url.into();

        // Validate URL
        let _ = Url::parse(&base_url)
            .map_err(|_| crate::error::Error::InvalidConfiguration("Invalid base URL".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }
}

#[derive(Debug, Clone)]
pub struct JiraClient {
    pub(crate) client: Client,
    pub(crate) config: Arc<JiraConfig>,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        // 認証ヘッダーを追加
        match &config.auth {
            Auth::Basic { username, api_token } => {
                let auth_value = format!("{}:{}", username, api_token);
                let encoded = base64::engine::general_purpose::STANDARD.encode(auth_value.as_bytes());
                headers.insert(
                    header::AUTHORIZATION,
                    header::HeaderValue::from_str(&format!("Basic {}", encoded))
                        .map_err(|_| crate::error::Error::InvalidConfiguration("Invalid auth header".to_string()))?,
                );
            }
            Auth::Bearer { token } => {
                headers.insert(
                    header::AUTHORIZATION,
                    header::HeaderValue::from_str(&format!("Bearer {}", token))
                        .map_err(|_| crate::error::Error::InvalidConfiguration("Invalid auth header".to_string()))?,
                );
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| crate::error::Error::InvalidConfiguration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    pub(crate) async fn get<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, endpoint);

        let response = self.client
            .get(&url)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(crate::error::Error::ApiError { status, message });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}

#[async_trait]
impl TrackerSource for JiraClient {
    async fn search_issues(&self, params: &SearchParams) -> Result<SearchPage> {
        self.get("/rest/api/3/search/jql", &params.to_query_pairs()).await
    }

    async fn get_project(&self, key: &str) -> Result<ProjectDetails> {
        let endpoint = format!("/rest/api/2/project/{}", urlencoding::encode(key));
        self.get(&endpoint, &[]).await
    }

    async fn get_worklogs(&self, issue_key: &str) -> Result<WorklogPage> {
        let endpoint = format!("/rest/api/3/issue/{}/worklog", urlencoding::encode(issue_key));
        self.get(&endpoint, &[]).await
    }

    async fn get_user_groups(&self, account_id: &str) -> Result<UserGroups> {
        let query = [
            ("accountId", account_id.to_string()),
            ("expand", "groups".to_string()),
        ];
        self.get("/rest/api/3/user", &query).await
    }
}
