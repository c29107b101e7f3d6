use serde::{Deserialize, Serialize};

/// Where a remote backend lives and how to reach it.
///
/// Every field is optional. In-process backends ignore this section.
///
/// ```yaml
/// connection:
///   server: 127.0.0.1:6379
///   password: secret
///   database: 2
///   prefix: "cacheman:"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionConfig {
    /// `host:port` or a full URL.
    pub server: Option<String>,
    /// Authentication secret.
    pub password: Option<String>,
    /// Logical database index.
    pub database: Option<i64>,
    /// Namespace prepended to every key.
    pub prefix: Option<String>,
}
