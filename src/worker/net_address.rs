//! Cluster-facing identity of a worker.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const TIER_NODE: &str = "node";
pub const TIER_RACK: &str = "rack";

/// One level of a worker's locality, e.g. `node=worker-3` or `rack=r12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalityTier {
    pub tier_name: String,
    /// `None` when the locality at this level is unknown.
    pub value: Option<String>,
}

impl LocalityTier {
    pub fn new(tier_name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            tier_name: tier_name.into(),
            value,
        }
    }
}

/// The information the master needs to route requests to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerNetAddress {
    pub host: String,
    pub rpc_port: u16,
    pub data_port: u16,
    pub web_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_socket_path: Option<String>,
    /// Locality tiers, most specific first.
    #[serde(default)]
    pub tiered_identity: Vec<LocalityTier>,
}

impl WorkerNetAddress {
    /// Create an address with the default `node`/`rack` tiers.
    pub fn new(host: impl Into<String>, rpc_port: u16, data_port: u16, web_port: u16) -> Self {
        let host = host.into();
        Self {
            tiered_identity: vec![
                LocalityTier::new(TIER_NODE, Some(host.clone())),
                LocalityTier::new(TIER_RACK, None),
            ],
            host,
            rpc_port,
            data_port,
            web_port,
            domain_socket_path: None,
        }
    }

    pub fn with_domain_socket_path(mut self, path: Option<String>) -> Self {
        self.domain_socket_path = path;
        self
    }

    /// Set the value of a locality tier, appending the tier if absent.
    pub fn with_tier(mut self, tier_name: &str, value: Option<String>) -> Self {
        match self
            .tiered_identity
            .iter_mut()
            .find(|t| t.tier_name == tier_name)
        {
            Some(tier) => tier.value = value,
            None => self.tiered_identity.push(LocalityTier::new(tier_name, value)),
        }
        self
    }

    /// Value of the named locality tier, if set.
    pub fn tier(&self, tier_name: &str) -> Option<&str> {
        self.tiered_identity
            .iter()
            .find(|t| t.tier_name == tier_name)
            .and_then(|t| t.value.as_deref())
    }
}

impl fmt::Display for WorkerNetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} (data={}, web={})",
            self.host, self.rpc_port, self.data_port, self.web_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let addr = WorkerNetAddress::new("w1", 1, 2, 3);
        assert_eq!(addr.tier(TIER_NODE), Some("w1"));
        assert_eq!(addr.tier(TIER_RACK), None);
        assert_eq!(addr.to_string(), "w1:1 (data=2, web=3)");
    }

    #[test]
    fn test_with_tier_replaces_and_appends() {
        let addr = WorkerNetAddress::new("w1", 1, 2, 3)
            .with_tier(TIER_RACK, Some("r7".into()))
            .with_tier("zone", Some("us-east-1a".into()));
        assert_eq!(addr.tier(TIER_RACK), Some("r7"));
        assert_eq!(addr.tier("zone"), Some("us-east-1a"));
        assert_eq!(addr.tiered_identity.len(), 3);
    }

    #[test]
    fn test_json_shape() {
        let addr = WorkerNetAddress::new("w1", 29998, 29999, 30000);
        let json = serde_json::to_value(&addr).unwrap();
        assert_eq!(json["host"], "w1");
        assert_eq!(json["rpc_port"], 29998);
        assert!(json.get("domain_socket_path").is_none());
        assert_eq!(json["tiered_identity"][0]["tier_name"], "node");

        let back: WorkerNetAddress = serde_json::from_value(json).unwrap();
        assert_eq!(back, addr);
    }
}
