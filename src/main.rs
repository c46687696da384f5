use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use dotenv::dotenv;
use tracing::{error, info};

use jira_worklog_report::logging::init_logging;
use jira_worklog_report::{
    AppState, GcsSink, JiraClient, LocalDirSink, ObjectSink, ReportConfig, StorageConfig, app,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    if let Err(e) = run().await {
        error!(error = %e, "service stopped");
        process::exit(1);
    }
}

async fn run() -> jira_worklog_report::Result<()> {
    let config = ReportConfig::from_env()?;

    let client = JiraClient::new(config.jira.clone())?;
    let sink: Arc<dyn ObjectSink> = match &config.storage {
        StorageConfig::Gcs {
            upload_url,
            credentials,
        } => Arc::new(GcsSink::with_upload_url(upload_url.clone(), credentials.clone())?),
        StorageConfig::Local { root } => Arc::new(LocalDirSink::new(root)),
    };
    info!(
        jira = %config.jira.base_url,
        bucket = %config.settings.bucket,
        storage = config.storage.kind(),
        "configuration loaded"
    );

    let state = AppState::new(Arc::new(client), sink, config.settings);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Report service listening on {addr}");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
