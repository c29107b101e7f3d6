//! Wire format of stored responses.
//!
//! An entry is a JSON document:
//!
//! ```json
//! {"status":200,"headers":{"content-type":["text/plain"]},"content":"b2s="}
//! ```
//!
//! Header values keep their order, body bytes are standard base64 with
//! padding. Values that are not valid UTF-8 are stored lossily.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::interceptor::CapturedResponse;

/// Serialized form of a [`CapturedResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Numeric status code.
    pub status: u16,
    /// Header name to every value, in order.
    #[serde(default)]
    pub headers: IndexMap<String, Vec<String>>,
    /// Base64 encoded body.
    #[serde(default)]
    pub content: String,
}

impl From<&CapturedResponse> for CachedEntry {
    fn from(response: &CapturedResponse) -> Self {
        let mut headers: IndexMap<String, Vec<String>> = IndexMap::new();
        for (name, value) in &response.headers {
            headers
                .entry(name.as_str().to_owned())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        Self {
            status: response.status.as_u16(),
            headers,
            content: STANDARD.encode(&response.body),
        }
    }
}

impl TryFrom<CachedEntry> for CapturedResponse {
    type Error = CodecError;

    fn try_from(entry: CachedEntry) -> Result<Self, Self::Error> {
        let status =
            StatusCode::from_u16(entry.status).map_err(|_| CodecError::Status(entry.status))?;
        let mut headers = HeaderMap::with_capacity(entry.headers.len());
        for (name, values) in entry.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| CodecError::HeaderName(name.clone()))?;
            for value in values {
                let header_value = HeaderValue::from_str(&value)
                    .map_err(|_| CodecError::HeaderValue(name.clone()))?;
                headers.append(header_name.clone(), header_value);
            }
        }
        let body = STANDARD.decode(entry.content.as_bytes())?;
        Ok(Self {
            status,
            headers,
            body: Bytes::from(body),
        })
    }
}

/// Serialize a captured response into cache bytes.
pub fn encode(response: &CapturedResponse) -> Result<Bytes, CodecError> {
    let entry = CachedEntry::from(response);
    Ok(Bytes::from(serde_json::to_vec(&entry)?))
}

/// Parse cache bytes back into a response.
pub fn decode(data: &[u8]) -> Result<CapturedResponse, CodecError> {
    let entry: CachedEntry = serde_json::from_slice(data)?;
    CapturedResponse::try_from(entry)
}
