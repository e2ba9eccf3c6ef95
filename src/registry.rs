//! Canonical operation allowlist.
//!
//! The registry is the authorization boundary: any operation name absent from
//! it is rejected before any other processing. Default-deny: adding a new
//! canonical operation requires an explicit entry here.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Query,
    Mutation,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationDefinition {
    pub name: &'static str,
    pub kind: OperationKind,
    pub requires_auth: bool,
    /// Policy data only; counter storage is an external collaborator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_minute: Option<u32>,
}

/// Immutable table of allowed canonical operations, built once at startup.
#[derive(Debug)]
pub struct OperationRegistry {
    operations: IndexMap<&'static str, OperationDefinition>,
}

impl OperationRegistry {
    /// The complete canonical operation set.
    pub fn with_defaults() -> Self {
        use OperationKind::{Mutation, Query};

        let mut operations = IndexMap::new();
        let entries = [
            ("GetProduct", Query, false, None),
            ("GetProducts", Query, false, Some(120)),
            ("GetCategories", Query, false, None),
            ("GetCategory", Query, false, None),
            ("ProductsByCategory", Query, false, Some(120)),
            ("GetCart", Query, false, None),
            ("GetCustomer", Query, true, None),
            ("GetOrders", Query, true, Some(30)),
            ("GetOrder", Query, true, Some(30)),
            ("AddToCart", Mutation, false, Some(60)),
            ("UpdateCartItem", Mutation, false, Some(60)),
            ("RemoveCartItem", Mutation, false, Some(60)),
            ("ApplyCoupon", Mutation, false, Some(20)),
            ("RemoveCoupon", Mutation, false, Some(20)),
            ("SetShippingAddress", Mutation, false, Some(30)),
            ("SetShippingMethod", Mutation, false, Some(30)),
            ("SetPaymentMethod", Mutation, false, Some(30)),
            ("PlaceOrder", Mutation, false, Some(10)),
            ("MergeCarts", Mutation, true, Some(10)),
        ];
        for (name, kind, requires_auth, rate_limit_per_minute) in entries {
            operations.insert(
                name,
                OperationDefinition {
                    name,
                    kind,
                    requires_auth,
                    rate_limit_per_minute,
                },
            );
        }
        Self { operations }
    }

    /// Override rate-limit hints from configuration. Unknown names ignore.
    pub fn apply_rate_limits(&mut self, limits: &HashMap<String, u32>) {
        for (name, limit) in limits {
            if let Some(def) = self.operations.get_mut(name.as_str()) {
                def.rate_limit_per_minute = Some(*limit);
            }
        }
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations.get(name)
    }

    pub fn all_names(&self) -> Vec<&'static str> {
        self.operations.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_deny() {
        let registry = OperationRegistry::with_defaults();
        assert!(registry.is_allowed("GetProduct"));
        assert!(!registry.is_allowed("getProduct"));
        assert!(!registry.is_allowed("DropAllCarts"));
        assert!(registry.get("__schema").is_none());
    }

    #[test]
    fn auth_flags() {
        let registry = OperationRegistry::with_defaults();
        assert!(registry.get("GetCustomer").unwrap().requires_auth);
        assert!(registry.get("GetOrders").unwrap().requires_auth);
        assert!(!registry.get("AddToCart").unwrap().requires_auth);
    }

    #[test]
    fn rate_limit_overrides_apply() {
        let mut registry = OperationRegistry::with_defaults();
        let mut limits = HashMap::new();
        limits.insert("PlaceOrder".to_string(), 5);
        limits.insert("NoSuchOperation".to_string(), 1);
        registry.apply_rate_limits(&limits);
        assert_eq!(
            registry.get("PlaceOrder").unwrap().rate_limit_per_minute,
            Some(5)
        );
        assert!(!registry.is_allowed("NoSuchOperation"));
    }

    #[test]
    fn names_are_stable_ordered() {
        let registry = OperationRegistry::with_defaults();
        let names = registry.all_names();
        assert_eq!(names.first(), Some(&"GetProduct"));
        assert_eq!(names.len(), registry.len());
    }
}
