//! Request DTOs for the region API
//!
//! Every body names its key with `key` plus an optional `tenant`. Omitted
//! transaction timestamps default to the region's current timestamp.

use serde::Deserialize;
use serde_json::Value;

use crate::access::SoftLock;
use crate::cache::{CacheKey, MAX_KEY_LENGTH};

// == Key Reference ==
/// Key fields shared by every request body.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRef {
    pub key: String,
    #[serde(default)]
    pub tenant: Option<String>,
}

impl KeyRef {
    /// Returns an error message if the key is unusable, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        None
    }

    pub fn cache_key(&self) -> CacheKey {
        match &self.tenant {
            Some(tenant) => CacheKey::with_tenant(self.key.clone(), tenant.clone()),
            None => CacheKey::new(self.key.clone()),
        }
    }
}

/// Body of `remove` and `evict`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRequest {
    #[serde(flatten)]
    pub key: KeyRef,
}

/// Body of `get`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetRequest {
    #[serde(flatten)]
    pub key: KeyRef,
    #[serde(default)]
    pub tx_timestamp: Option<u64>,
}

/// Body of `put_from_load`.
#[derive(Debug, Clone, Deserialize)]
pub struct PutFromLoadRequest {
    #[serde(flatten)]
    pub key: KeyRef,
    pub value: Value,
    #[serde(default)]
    pub tx_timestamp: Option<u64>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub minimal_put_override: bool,
}

/// Body of `insert`.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertRequest {
    #[serde(flatten)]
    pub key: KeyRef,
    pub value: Value,
    #[serde(default)]
    pub version: Option<u64>,
}

/// Body of `update`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    #[serde(flatten)]
    pub key: KeyRef,
    pub value: Value,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub previous_version: Option<u64>,
}

/// Body of `lock`.
#[derive(Debug, Clone, Deserialize)]
pub struct LockRequest {
    #[serde(flatten)]
    pub key: KeyRef,
    #[serde(default)]
    pub version: Option<u64>,
}

/// Body of `unlock`. `lock` is the token `lock` returned, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockRequest {
    #[serde(flatten)]
    pub key: KeyRef,
    #[serde(default)]
    pub lock: Option<SoftLock>,
}

/// Body of `after_insert` and `after_update`.
#[derive(Debug, Clone, Deserialize)]
pub struct AfterWriteRequest {
    #[serde(flatten)]
    pub key: KeyRef,
    pub value: Value,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub lock: Option<SoftLock>,
    #[serde(default = "committed_by_default")]
    pub committed: bool,
}

fn committed_by_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request_deserialize() {
        let req: GetRequest = serde_json::from_str(r#"{"key": "user#1"}"#).unwrap();
        assert_eq!(req.key.key, "user#1");
        assert!(req.key.tenant.is_none());
        assert!(req.tx_timestamp.is_none());
    }

    #[test]
    fn test_tenant_scopes_key() {
        let req: KeyRequest =
            serde_json::from_str(r#"{"key": "user#1", "tenant": "acme"}"#).unwrap();
        assert_eq!(req.key.cache_key(), CacheKey::with_tenant("user#1", "acme"));
    }

    #[test]
    fn test_put_from_load_defaults() {
        let req: PutFromLoadRequest =
            serde_json::from_str(r#"{"key": "k", "value": {"name": "alice"}}"#).unwrap();
        assert_eq!(req.value["name"], "alice");
        assert!(req.version.is_none());
        assert!(!req.minimal_put_override);
    }

    #[test]
    fn test_after_write_committed_by_default() {
        let req: AfterWriteRequest =
            serde_json::from_str(r#"{"key": "k", "value": 1, "version": 2}"#).unwrap();
        assert!(req.committed);
        assert!(req.lock.is_none());

        let req: AfterWriteRequest =
            serde_json::from_str(r#"{"key": "k", "value": 1, "committed": false}"#).unwrap();
        assert!(!req.committed);
    }

    #[test]
    fn test_validate_key() {
        let empty = KeyRef {
            key: String::new(),
            tenant: None,
        };
        assert!(empty.validate().is_some());

        let long = KeyRef {
            key: "x".repeat(MAX_KEY_LENGTH + 1),
            tenant: None,
        };
        assert!(long.validate().is_some());

        let valid = KeyRef {
            key: "valid_key".to_string(),
            tenant: Some("acme".to_string()),
        };
        assert!(valid.validate().is_none());
    }
}
