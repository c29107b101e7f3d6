//! Redis backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cacheman_backend::{Backend, BackendError, BackendResult, ConnectionConfig, DeleteStatus};
use redis::{Client, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::trace;
use url::Url;

use crate::error::Error;

/// Default entry lifetime when none is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

const SCAN_BATCH: usize = 500;

/// Redis cache backend based on redis-rs crate.
///
/// This struct provides Redis as a storage [`Backend`] for cacheman.
/// It uses a [`ConnectionManager`] for asynchronous network interaction.
/// The connection is opened on first use, so building a backend for an
/// unreachable server succeeds and the failure surfaces as a cache miss.
///
/// [`ConnectionManager`]: redis::aio::ConnectionManager
/// [`Backend`]: cacheman_backend::Backend
#[derive(Clone)]
pub struct RedisBackend {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    prefix: String,
    ttl: Duration,
    label: String,
}

impl RedisBackend {
    /// Creates new RedisBackend builder with default settings.
    #[must_use]
    pub fn builder() -> RedisBackendBuilder {
        RedisBackendBuilder::default()
    }

    /// Create lazy connection to redis via [`ConnectionManager`]
    pub async fn connection(&self) -> Result<&ConnectionManager, BackendError> {
        trace!("Get connection manager");
        let manager = self
            .connection
            .get_or_try_init(|| {
                trace!("Initialize new redis connection manager");
                self.client.get_connection_manager()
            })
            .await
            .map_err(Error::from)?;
        Ok(manager)
    }

    /// Namespace prepended to every key.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

/// Part of builder pattern implementation for RedisBackend.
pub struct RedisBackendBuilder {
    server: String,
    password: Option<String>,
    database: Option<i64>,
    prefix: String,
    ttl: Duration,
    label: String,
}

impl Default for RedisBackendBuilder {
    fn default() -> Self {
        Self {
            server: "127.0.0.1:6379".to_owned(),
            password: None,
            database: None,
            prefix: String::new(),
            ttl: DEFAULT_TTL,
            label: "redis".to_owned(),
        }
    }
}

impl RedisBackendBuilder {
    /// Set server address, either `host:port` or a full `redis://` URL.
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Set the password used to authenticate.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Select a logical database.
    pub fn database(mut self, database: i64) -> Self {
        self.database = Some(database);
        self
    }

    /// Set the namespace prefix. A non-empty prefix also scopes [`Backend::reset`].
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Apply every field present in a [`ConnectionConfig`], leaving the rest untouched.
    pub fn connection(mut self, config: &ConnectionConfig) -> Self {
        if let Some(server) = &config.server {
            self.server = server.clone();
        }
        if config.password.is_some() {
            self.password = config.password.clone();
        }
        if config.database.is_some() {
            self.database = config.database;
        }
        if let Some(prefix) = &config.prefix {
            self.prefix = prefix.clone();
        }
        self
    }

    /// Set the lifetime of every stored entry.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the label reported as the backend type.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn connection_url(&self) -> Result<Url, Error> {
        let base = if self.server.contains("://") {
            self.server.clone()
        } else {
            format!("redis://{}", self.server)
        };
        let mut url = Url::parse(&base).map_err(|source| Error::InvalidServer {
            server: self.server.clone(),
            source,
        })?;
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|()| Error::CredentialsNotSupported(self.server.clone()))?;
        }
        if let Some(database) = self.database {
            url.set_path(&format!("/{database}"));
        }
        Ok(url)
    }

    /// Create new instance of Redis backend with passed settings.
    pub fn build(self) -> Result<RedisBackend, Error> {
        let url = self.connection_url()?;
        Ok(RedisBackend {
            client: Client::open(url.as_str())?,
            connection: OnceCell::new(),
            prefix: self.prefix,
            ttl: self.ttl,
            label: self.label,
        })
    }
}

fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `PX` argument for a TTL, `None` when entries should not expire.
fn expiry_millis(ttl: Duration) -> Option<u64> {
    match ttl.as_millis() {
        0 => None,
        millis => Some(u64::try_from(millis).unwrap_or(u64::MAX)),
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        let mut con = self.connection().await?.clone();
        let data: Option<Vec<u8>> = redis::cmd("GET")
            .arg(self.namespaced(key))
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(data.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes) -> BackendResult<()> {
        let mut con = self.connection().await?.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.namespaced(key)).arg(value.as_ref());
        if let Some(ttl_ms) = expiry_millis(self.ttl) {
            cmd.arg("PX").arg(ttl_ms);
        }
        cmd.query_async::<()>(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<DeleteStatus> {
        let mut con = self.connection().await?.clone();
        let deleted: i32 = redis::cmd("DEL")
            .arg(self.namespaced(key))
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;

        if deleted > 0 {
            Ok(DeleteStatus::Deleted(deleted as u32))
        } else {
            Ok(DeleteStatus::Missing)
        }
    }

    async fn reset(&self) -> BackendResult<()> {
        let mut con = self.connection().await?.clone();

        if self.prefix.is_empty() {
            redis::cmd("FLUSHDB")
                .query_async::<()>(&mut con)
                .await
                .map_err(Error::from)?;
            return Ok(());
        }

        let pattern = format!("{}*", escape_glob(&self.prefix));
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<Vec<u8>>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut con)
                .await
                .map_err(Error::from)?;
            trace!(count = keys.len(), "Deleting namespaced keys");
            if !keys.is_empty() {
                redis::cmd("DEL")
                    .arg(&keys)
                    .query_async::<()>(&mut con)
                    .await
                    .map_err(Error::from)?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(())
    }

    fn type_name(&self) -> &str {
        &self.label
    }
}
