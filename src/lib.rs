pub mod client;
pub mod config;
pub mod csv_export;
pub mod date_filter;
pub mod denormalize;
pub mod enrichment;
pub mod entities;
pub mod error;
pub mod fields;
pub mod issues;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod projects;
pub mod server;
pub mod source;
pub mod storage;
pub mod table;
pub mod taxonomy;
pub mod worklogs;

pub use client::{Auth, JiraClient, JiraConfig};
pub use error::{Error, Result};
pub use models::*;
pub use source::TrackerSource;

// Pipeline re-exports
pub use date_filter::{DateRange, filter_by_date};
pub use entities::{FetchedIssue, Issue, Project, UserLabel, Worklog};
pub use fields::FieldMapping;
pub use pipeline::{ReportOutcome, ReportSettings, RunStats, build_report_table, generate_report};
pub use table::{Cell, Table};
pub use taxonomy::{GroupTaxonomy, TaxonomyCategory};

// Storage re-exports
pub use storage::{GcsCredentials, GcsSink, LocalDirSink, ObjectSink};

// Service re-exports
pub use config::{ReportConfig, StorageConfig};
pub use server::{AppState, app};
