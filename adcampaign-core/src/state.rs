//! Typed access to the well-known session keys.
//!
//! Each stage owns the key(s) it writes; later stages read them through
//! [`require`], which turns absence into a fatal missing-dependency error.

use crate::types::{Ads, InfluencerProfile, ProductInfo, SocialMetrics};
use crate::{CampaignError, Result, SessionStore};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

pub struct StateKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StateKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, _marker: PhantomData }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for StateKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StateKey<T> {}

impl<T> std::fmt::Debug for StateKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StateKey").field(&self.name).finish()
    }
}

pub const PRODUCT_INFO: StateKey<ProductInfo> = StateKey::new("product_info");
pub const SOCIAL_METRICS: StateKey<SocialMetrics> = StateKey::new("social_metrics");
pub const INFLUENCERS: StateKey<Vec<InfluencerProfile>> = StateKey::new("influencers");
pub const ADS: StateKey<Ads> = StateKey::new("ads");

/// Reads a typed value. `Ok(None)` when the key is absent.
pub fn read<T: DeserializeOwned>(store: &dyn SessionStore, key: StateKey<T>) -> Result<Option<T>> {
    match store.get(key.name()) {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| CampaignError::CorruptState { key: key.name().to_string(), source }),
        None => Ok(None),
    }
}

/// Reads a typed value a stage depends on.
pub fn require<T: DeserializeOwned>(
    store: &dyn SessionStore,
    stage: &str,
    key: StateKey<T>,
) -> Result<T> {
    read(store, key)?.ok_or_else(|| CampaignError::missing_dependency(stage, key.name()))
}

pub fn write<T: Serialize>(store: &dyn SessionStore, key: StateKey<T>, value: &T) -> Result<()> {
    store.set(key.name(), serde_json::to_value(value)?);
    Ok(())
}

/// Fails on the first key in `keys` that is absent from `store`.
pub fn ensure_present(store: &dyn SessionStore, stage: &str, keys: &[&str]) -> Result<()> {
    match keys.iter().find(|key| !store.contains(key)) {
        Some(missing) => Err(CampaignError::missing_dependency(stage, *missing)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use serde_json::json;

    fn product() -> ProductInfo {
        ProductInfo {
            name: "EcoBottle".into(),
            description: "reusable water bottle".into(),
            features: vec!["insulated".into()],
            target_audience: "eco-conscious millennials".into(),
        }
    }

    #[test]
    fn test_write_then_require() {
        let store = InMemoryStore::new();
        write(&store, PRODUCT_INFO, &product()).unwrap();
        let read_back = require(&store, "social_metrics_agent", PRODUCT_INFO).unwrap();
        assert_eq!(read_back, product());
    }

    #[test]
    fn test_require_missing_names_key() {
        let store = InMemoryStore::new();
        let err = require(&store, "influencer_discovery_agent", SOCIAL_METRICS).unwrap_err();
        match err {
            CampaignError::MissingDependency { stage, key } => {
                assert_eq!(stage, "influencer_discovery_agent");
                assert_eq!(key, "social_metrics");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_corrupt_value() {
        let store = InMemoryStore::new();
        store.set("product_info", json!("not an object"));
        let err = read(&store, PRODUCT_INFO).unwrap_err();
        assert!(matches!(err, CampaignError::CorruptState { .. }));
    }

    #[test]
    fn test_ensure_present_reports_first_missing() {
        let store = InMemoryStore::new();
        store.set("product_info", json!({}));
        let err = ensure_present(&store, "ad_content_generator", &["product_info", "influencers"])
            .unwrap_err();
        assert!(err.to_string().contains("'influencers'"));
        assert!(ensure_present(&store, "x", &["product_info"]).is_ok());
    }
}
