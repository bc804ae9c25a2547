//! Cache Key Module
//!
//! Identifies a cached record inside a region.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Cache Key ==
/// Opaque identifier of a cached record (entity id, collection owner id or
/// query signature) with an optional tenant discriminator.
///
/// Two keys with the same id but different tenants never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tenant: Option<String>,
}

impl CacheKey {
    /// Creates a key with no tenant.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tenant: None,
        }
    }

    /// Creates a tenant-scoped key.
    pub fn with_tenant(id: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tenant: Some(tenant.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tenant {
            Some(tenant) => write!(f, "{}/{}", tenant, self.id),
            None => f.write_str(&self.id),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(id: &str) -> Self {
        CacheKey::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tenant_discriminates_keys() {
        let plain = CacheKey::new("user#1");
        let acme = CacheKey::with_tenant("user#1", "acme");
        let globex = CacheKey::with_tenant("user#1", "globex");

        let set: HashSet<_> = [plain.clone(), acme.clone(), globex].into_iter().collect();
        assert_eq!(set.len(), 3);
        assert_ne!(plain, acme);
    }

    #[test]
    fn test_display() {
        assert_eq!(CacheKey::new("user#1").to_string(), "user#1");
        assert_eq!(CacheKey::with_tenant("user#1", "acme").to_string(), "acme/user#1");
    }

    #[test]
    fn test_deserialize_without_tenant() {
        let key: CacheKey = serde_json::from_str(r#"{"id":"order#9"}"#).unwrap();
        assert_eq!(key.id(), "order#9");
        assert!(key.tenant().is_none());
    }
}
