//! Application state for sync-server

use aws_sdk_sesv2::Client as SesClient;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::auth::ApiCredentials;
use crate::config::{Config, DeleteFlags};
use crate::db::BoxError;
use crate::db::SyncDb;
use crate::db::audit::{AuditSink, PgAuditSink};
use crate::db::pg::PgSyncDb;
use crate::notify::{LogNotifier, Notifier, SesNotifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Source of bulk-call transactions
    pub db: Arc<dyn SyncDb>,
    /// Per-record audit log
    pub audit: Arc<dyn AuditSink>,
    /// Failure notifications
    pub notifier: Arc<dyn Notifier>,
    /// Accepted API account
    pub credentials: ApiCredentials,
    /// Default chunk size
    pub batch_size: usize,
    pub delete_flags: DeleteFlags,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and pick the notifier
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let notifier: Arc<dyn Notifier> = match &config.notify_email_to {
            Some(to) => {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
                    let ses_config = aws_config
                        .to_builder()
                        .region(aws_config::Region::new(ses_region))
                        .build();
                    SesClient::new(&ses_config)
                } else {
                    SesClient::new(&aws_config)
                };
                tracing::info!(to = %to, "Failure notifications go to SES");
                Arc::new(SesNotifier::new(ses, &config.notify_email_from, to))
            }
            None => {
                tracing::info!("NOTIFY_EMAIL_TO not set, failure notifications are logged only");
                Arc::new(LogNotifier)
            }
        };

        Ok(Self {
            db: Arc::new(PgSyncDb::new(pool.clone())),
            audit: Arc::new(PgAuditSink::new(pool)),
            notifier,
            credentials: ApiCredentials {
                username: config.api_username.clone(),
                password_hash: config.api_password_hash.clone(),
            },
            batch_size: config.batch_size,
            delete_flags: config.delete_flags,
        })
    }
}
