//! MongoDB-backed request log
//!
//! The client is created on first write and reused for the life of the
//! process. A failed connection attempt leaves the cell empty, so the next
//! write tries again.

use super::{LogError, LogRecord, LogSink};
use crate::config::RequestLogConfig;
use async_trait::async_trait;
use mongodb::Client;
use mongodb::options::ClientOptions;
use std::time::Duration;
use tokio::sync::OnceCell;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request log store writing to a MongoDB collection
pub struct MongoLogStore {
    uri: String,
    database: String,
    collection: String,
    client: OnceCell<Client>,
}

impl MongoLogStore {
    /// Create a store; no connection is made until the first write
    pub fn new(uri: String, settings: &RequestLogConfig) -> Self {
        Self {
            uri,
            database: settings.database().to_string(),
            collection: settings.collection().to_string(),
            client: OnceCell::new(),
        }
    }

    /// Whether a client has been created yet
    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    async fn client(&self) -> Result<&Client, LogError> {
        self.client
            .get_or_try_init(|| async {
                let mut options = ClientOptions::parse(self.uri.as_str())
                    .await
                    .map_err(|e| LogError::Connect {
                        reason: e.to_string(),
                    })?;
                options.app_name = Some("tripnavi".to_string());
                options.connect_timeout = Some(CONNECT_TIMEOUT);
                options.server_selection_timeout = Some(CONNECT_TIMEOUT);

                let client = Client::with_options(options).map_err(|e| LogError::Connect {
                    reason: e.to_string(),
                })?;

                tracing::info!(
                    database = %self.database,
                    collection = %self.collection,
                    "Request log store client created"
                );
                Ok(client)
            })
            .await
    }
}

#[async_trait]
impl LogSink for MongoLogStore {
    async fn write(&self, record: LogRecord) -> Result<(), LogError> {
        let client = self.client().await?;
        client
            .database(&self.database)
            .collection::<LogRecord>(&self.collection)
            .insert_one(&record)
            .await
            .map_err(|e| LogError::Write {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mongodb"
    }
}
