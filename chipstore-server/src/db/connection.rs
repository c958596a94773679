//! Lazy MongoDB connection management
//!
//! The manager owns at most one client. `ensure_connected` is the only
//! path to it: the first caller dials, concurrent callers wait on that
//! same attempt, and later callers get the cached handle back. A failed
//! attempt leaves the manager disconnected so the next request retries
//! from scratch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use super::repos::ensure_session_ttl_index;

/// Fallback database name when neither MONGODB_DB nor the URI names one.
const DEFAULT_DATABASE: &str = "chipstore";

/// How long server selection may take before an attempt fails.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Idle time after which pooled connections are dropped.
const MAX_IDLE_TIME: Duration = Duration::from_secs(45);

/// Upper bound on pooled connections per client.
const MAX_POOL_SIZE: u32 = 10;

/// Errors from establishing or reusing the database connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No connection string was configured at startup.
    #[error("MONGODB_URI is not configured")]
    MissingUri,

    /// The driver failed to parse the URI or reach the deployment.
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Coarse connection state reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }
}

/// Dials a MongoDB deployment, verifies it, and prepares the named
/// application database (indexes).
///
/// The manager is generic over this seam so tests can swap in connectors
/// that never touch the network.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn establish(&self, uri: &str, database: &str) -> Result<Client, ConnectionError>;
}

/// Production connector backed by the MongoDB driver.
pub struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    async fn establish(&self, uri: &str, database: &str) -> Result<Client, ConnectionError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        options.max_idle_time = Some(MAX_IDLE_TIME);
        options.max_pool_size = Some(MAX_POOL_SIZE);

        let client = Client::with_options(options)?;

        // Client construction is lazy; ping so a bad deployment surfaces
        // here instead of inside the first query.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        ensure_session_ttl_index(&client.database(database)).await?;

        Ok(client)
    }
}

/// Shared, lazily-connecting handle to the application database.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct ConnectionManager {
    uri: Option<String>,
    database: String,
    connector: Box<dyn Connector>,
    client: Mutex<Option<Client>>,
    connected: AtomicBool,
}

impl ConnectionManager {
    /// Create a manager that dials with the real MongoDB driver.
    ///
    /// The database name is taken from `database_override` when set,
    /// falling back to the path component of the URI, then to
    /// `chipstore`.
    pub fn new(uri: Option<String>, database_override: Option<String>) -> Self {
        Self::with_connector(uri, database_override, Box::new(MongoConnector))
    }

    /// Create a manager with a custom connector.
    pub fn with_connector(
        uri: Option<String>,
        database_override: Option<String>,
        connector: Box<dyn Connector>,
    ) -> Self {
        let database = database_override
            .or_else(|| uri.as_deref().and_then(database_name_in_uri))
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        Self {
            uri,
            database,
            connector,
            client: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// Return the application database, connecting on first use.
    ///
    /// Holding the lock across the dial is what collapses concurrent
    /// callers into a single attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::MissingUri`] when no connection string
    /// is configured, or the underlying driver error when the dial fails.
    pub async fn ensure_connected(&self) -> Result<Database, ConnectionError> {
        let uri = self.uri.as_deref().ok_or(ConnectionError::MissingUri)?;

        let mut client = self.client.lock().await;
        if let Some(existing) = client.as_ref() {
            return Ok(existing.database(&self.database));
        }

        info!(database = %self.database, "connecting to MongoDB");
        match self.connector.establish(uri, &self.database).await {
            Ok(fresh) => {
                let db = fresh.database(&self.database);
                *client = Some(fresh);
                self.connected.store(true, Ordering::SeqCst);
                info!("MongoDB connection established");
                Ok(db)
            }
            Err(err) => {
                self.connected.store(false, Ordering::SeqCst);
                error!(error = %err, "MongoDB connection failed");
                Err(err)
            }
        }
    }

    /// Current state without touching the network.
    ///
    /// Reads a flag rather than the client slot, so health checks answer
    /// immediately even while a dial is in flight.
    pub fn status(&self) -> ConnectionStatus {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }

    /// Name of the database this manager serves.
    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// Shut down the client if one was established.
    ///
    /// Safe to call when never connected; the next `ensure_connected`
    /// after a close dials again.
    pub async fn close(&self) {
        let mut client = self.client.lock().await;
        if let Some(client) = client.take() {
            self.connected.store(false, Ordering::SeqCst);
            client.shutdown().await;
            info!("MongoDB connection closed");
        }
    }
}

/// Extract the database name from a MongoDB connection string, if any.
///
/// `mongodb://host/chips?retryWrites=true` names `chips`; a URI with no
/// path component names nothing.
pub fn database_name_in_uri(uri: &str) -> Option<String> {
    let after_scheme = uri.split_once("://").map(|(_, rest)| rest)?;
    let path = after_scheme.split_once('/').map(|(_, path)| path)?;
    let name = path.split(['?', '/']).next()?;

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Client that parses but never dials; construction does no I/O.
    async fn stub_client() -> Client {
        let options = ClientOptions::parse("mongodb://stub.invalid:27017")
            .await
            .expect("stub options parse");
        Client::with_options(options).expect("stub client")
    }

    struct CountingConnector {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn establish(&self, _uri: &str, _database: &str) -> Result<Client, ConnectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(stub_client().await)
        }
    }

    struct SlowConnector {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Connector for SlowConnector {
        async fn establish(&self, _uri: &str, _database: &str) -> Result<Client, ConnectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(stub_client().await)
        }
    }

    struct FlakyConnector {
        calls: Arc<AtomicUsize>,
        failures: usize,
    }

    #[async_trait]
    impl Connector for FlakyConnector {
        async fn establish(&self, _uri: &str, _database: &str) -> Result<Client, ConnectionError> {
            let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                return Err(mongodb::error::Error::custom("simulated dial failure").into());
            }
            Ok(stub_client().await)
        }
    }

    struct RecordingConnector {
        database_seen: Arc<std::sync::Mutex<Option<String>>>,
    }

    #[async_trait]
    impl Connector for RecordingConnector {
        async fn establish(&self, _uri: &str, database: &str) -> Result<Client, ConnectionError> {
            *self.database_seen.lock().unwrap() = Some(database.to_owned());
            Ok(stub_client().await)
        }
    }

    fn manager_with(connector: Box<dyn Connector>) -> ConnectionManager {
        ConnectionManager::with_connector(
            Some("mongodb://stub.invalid:27017/chips".into()),
            None,
            connector,
        )
    }

    #[tokio::test]
    async fn missing_uri_is_rejected_without_dialing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = ConnectionManager::with_connector(
            None,
            None,
            Box::new(CountingConnector {
                calls: Arc::clone(&calls),
            }),
        );

        let err = manager.ensure_connected().await.unwrap_err();
        assert!(matches!(err, ConnectionError::MissingUri));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn second_call_reuses_the_client() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = manager_with(Box::new(CountingConnector {
            calls: Arc::clone(&calls),
        }));

        manager.ensure_connected().await.expect("first connect");
        manager.ensure_connected().await.expect("second connect");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = Arc::new(manager_with(Box::new(SlowConnector {
            calls: Arc::clone(&calls),
        })));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.ensure_connected().await })
            })
            .collect();

        for handle in handles {
            handle
                .await
                .expect("task panicked")
                .expect("connect failed");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_attempt_retries_on_next_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = manager_with(Box::new(FlakyConnector {
            calls: Arc::clone(&calls),
            failures: 1,
        }));

        assert!(manager.ensure_connected().await.is_err());
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);

        manager.ensure_connected().await.expect("retry connect");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(manager.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn close_disconnects_and_allows_reconnect() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = manager_with(Box::new(CountingConnector {
            calls: Arc::clone(&calls),
        }));

        manager.ensure_connected().await.expect("connect");
        manager.close().await;
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);

        manager.ensure_connected().await.expect("reconnect");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn close_before_connect_is_a_no_op() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = manager_with(Box::new(CountingConnector {
            calls: Arc::clone(&calls),
        }));

        manager.close().await;
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn database_name_parses_from_uri_path() {
        assert_eq!(
            database_name_in_uri("mongodb://host:27017/chips"),
            Some("chips".to_string())
        );
        assert_eq!(
            database_name_in_uri("mongodb://host/chips?retryWrites=true&w=majority"),
            Some("chips".to_string())
        );
        assert_eq!(
            database_name_in_uri("mongodb+srv://user:pw@cluster.example.net/store"),
            Some("store".to_string())
        );
        assert_eq!(database_name_in_uri("mongodb://host:27017"), None);
        assert_eq!(database_name_in_uri("mongodb://host:27017/"), None);
        assert_eq!(database_name_in_uri("mongodb://host/?w=majority"), None);
        assert_eq!(database_name_in_uri("not a uri"), None);
    }

    #[tokio::test]
    async fn connector_receives_the_resolved_database_name() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let manager = ConnectionManager::with_connector(
            Some("mongodb://host/from_uri".into()),
            Some("explicit".into()),
            Box::new(RecordingConnector {
                database_seen: Arc::clone(&seen),
            }),
        );

        manager.ensure_connected().await.expect("connect");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("explicit"));
    }

    #[test]
    fn database_name_resolution_order() {
        let explicit = ConnectionManager::new(
            Some("mongodb://host/from_uri".into()),
            Some("explicit".into()),
        );
        assert_eq!(explicit.database_name(), "explicit");

        let from_uri = ConnectionManager::new(Some("mongodb://host/from_uri".into()), None);
        assert_eq!(from_uri.database_name(), "from_uri");

        let fallback = ConnectionManager::new(Some("mongodb://host".into()), None);
        assert_eq!(fallback.database_name(), DEFAULT_DATABASE);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn real_connector_reaches_deployment() {
        // Run with: MONGODB_URI=mongodb://... cargo test -p chipstore-server -- --ignored
        let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI required");
        let manager = ConnectionManager::new(Some(uri), None);

        manager.ensure_connected().await.expect("connect failed");
        assert_eq!(manager.status(), ConnectionStatus::Connected);
        manager.close().await;
    }
}
