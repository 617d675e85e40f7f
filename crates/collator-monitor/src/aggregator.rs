use log::debug;
use std::collections::BTreeMap;

use crate::chain::{CollatorSnapshot, CollatorSource};
use crate::checks::{check_collator, detect_unknown, CollatorLocation};
use crate::config::{ChainDescriptor, ChainNetwork, ChainsConfig};
use crate::console::Console;
use crate::registry::AddressRegistry;
use crate::report;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundRecord {
    pub operator_name: String,
    pub chain_name: String,
    pub address: String,
    pub location: CollatorLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRecord {
    pub operator_name: String,
    pub chain_name: String,
    pub rpc_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub chain_name: String,
    pub rpc_url: String,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCollators {
    pub chain_name: String,
    pub addresses: Vec<String>,
}

/// Outcome of one pass over every configured chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Chains whose collator sets were read successfully.
    pub chains_checked: usize,
    pub found: Vec<FoundRecord>,
    /// Missing placements grouped by operator name.
    pub missing: BTreeMap<String, Vec<MissingRecord>>,
    pub errors: Vec<ErrorRecord>,
    pub unknown: Vec<UnknownCollators>,
}

impl RunReport {
    pub fn missing_count(&self) -> usize {
        self.missing.values().map(Vec::len).sum()
    }

    pub fn has_missing(&self) -> bool {
        self.missing.values().any(|records| !records.is_empty())
    }

    /// Whether this run warrants an alert.
    pub fn has_alerts(&self) -> bool {
        self.has_missing() || !self.errors.is_empty()
    }

    fn record_found(
        &mut self,
        operator: &str,
        chain: &ChainDescriptor,
        address: &str,
        location: CollatorLocation,
    ) {
        self.found.push(FoundRecord {
            operator_name: operator.to_string(),
            chain_name: chain.name.clone(),
            address: address.to_string(),
            location,
        });
    }

    fn record_missing(&mut self, operator: &str, chain: &ChainDescriptor) {
        self.missing
            .entry(operator.to_string())
            .or_default()
            .push(MissingRecord {
                operator_name: operator.to_string(),
                chain_name: chain.name.clone(),
                rpc_url: chain.rpc_url.clone(),
            });
    }

    fn record_error(&mut self, chain: &ChainDescriptor, error_message: String) {
        self.errors.push(ErrorRecord {
            chain_name: chain.name.clone(),
            rpc_url: chain.rpc_url.clone(),
            error_message,
        });
    }
}

/// Walks the chain list in order and collects found, missing and error records.
pub struct Aggregator {
    source: Box<dyn CollatorSource>,
    targets: Vec<String>,
}

impl Aggregator {
    pub fn new(source: Box<dyn CollatorSource>, targets: Vec<String>) -> Self {
        Self { source, targets }
    }

    pub async fn run(&self, config: &ChainsConfig) -> RunReport {
        let mut report = RunReport::default();
        let groups = [
            (ChainNetwork::Polkadot, &config.polkadot_chains),
            (ChainNetwork::Kusama, &config.kusama_chains),
        ];
        for (network, chains) in groups {
            Console::section(&format!("{network} CHAINS"));
            for chain in chains {
                self.check_chain(chain, &mut report).await;
            }
        }
        report
    }

    /// Checks one chain; failures are recorded and never propagate.
    pub async fn check_chain(&self, chain: &ChainDescriptor, report: &mut RunReport) {
        report::print_chain_header(chain);

        let registry = match AddressRegistry::load(&chain.registry_file) {
            Ok(registry) => registry,
            Err(e) => {
                Console::user_error(&format!("Error loading registry for {}: {e}", chain.name));
                report.record_error(chain, e.to_string());
                return;
            }
        };
        debug!("{}: {} known collators", chain.name, registry.len());

        let snapshot = match self.source.fetch_snapshot(chain).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                Console::user_error(&format!("Error checking {}: {e}", chain.name));
                report.record_error(chain, e.to_string());
                return;
            }
        };
        report.chains_checked += 1;

        report::print_snapshot(chain, &snapshot, &registry);
        self.check_targets(chain, &snapshot, &registry, report);

        let unknown = detect_unknown(&snapshot, &registry);
        report::print_unknown(chain, &unknown);
        if !unknown.is_empty() {
            report.unknown.push(UnknownCollators {
                chain_name: chain.name.clone(),
                addresses: unknown,
            });
        }
    }

    fn check_targets(
        &self,
        chain: &ChainDescriptor,
        snapshot: &CollatorSnapshot,
        registry: &AddressRegistry,
        report: &mut RunReport,
    ) {
        for target in &self.targets {
            let membership = check_collator(target, snapshot, registry);
            report::print_membership(target, &membership);
            match (membership.location(), membership.address()) {
                (Some(location), Some(address)) => {
                    report.record_found(target, chain, address, location)
                }
                _ => report.record_missing(target, chain),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    /// Serves canned snapshots by chain name; unknown chains fail to connect.
    #[derive(Default)]
    struct MockSource {
        snapshots: HashMap<String, CollatorSnapshot>,
    }

    impl MockSource {
        fn with(mut self, chain: &str, invulnerables: &[&str], candidates: &[&str]) -> Self {
            self.snapshots.insert(
                chain.to_string(),
                CollatorSnapshot {
                    invulnerables: invulnerables.iter().map(|a| a.to_string()).collect(),
                    candidates: candidates.iter().map(|a| a.to_string()).collect(),
                    ..Default::default()
                },
            );
            self
        }
    }

    #[async_trait]
    impl CollatorSource for MockSource {
        async fn fetch_snapshot(
            &self,
            chain: &ChainDescriptor,
        ) -> Result<CollatorSnapshot, ChainError> {
            self.snapshots.get(&chain.name).cloned().ok_or_else(|| {
                ChainError::InvalidResponse(format!("connection refused by {}", chain.rpc_url))
            })
        }
    }

    fn chain(name: &str, registry_file: &Path, network: ChainNetwork) -> ChainDescriptor {
        ChainDescriptor {
            name: name.to_string(),
            rpc_url: format!("wss://{}.example.io", name.to_lowercase().replace(' ', "-")),
            registry_file: registry_file.to_path_buf(),
            network,
            webhook_url: None,
            ss58_prefix: network.default_ss58_prefix(),
            token_symbol: network.default_token_symbol().to_string(),
            token_decimals: network.default_token_decimals(),
        }
    }

    fn registry_file(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("collators.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_found_invulnerable() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_file(&dir, r#"{"ADDR1": "PARANODES.IO"}"#);
        let config = ChainsConfig {
            polkadot_chains: vec![chain("AssetHub", &registry, ChainNetwork::Polkadot)],
            kusama_chains: vec![],
        };
        let source = MockSource::default().with("AssetHub", &["ADDR1"], &[]);

        let report = Aggregator::new(Box::new(source), vec!["PARANODES.IO".to_string()])
            .run(&config)
            .await;

        assert_eq!(report.found.len(), 1);
        assert_eq!(report.found[0].location, CollatorLocation::Invulnerable);
        assert_eq!(report.found[0].address, "ADDR1");
        assert!(!report.has_alerts());
    }

    #[tokio::test]
    async fn test_empty_snapshot_adds_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_file(&dir, r#"{"ADDR1": "PARANODES.IO"}"#);
        let asset_hub = chain("AssetHub", &registry, ChainNetwork::Polkadot);
        let config = ChainsConfig {
            polkadot_chains: vec![asset_hub.clone()],
            kusama_chains: vec![],
        };
        let source = MockSource::default().with("AssetHub", &[], &[]);

        let report = Aggregator::new(Box::new(source), vec!["PARANODES.IO".to_string()])
            .run(&config)
            .await;

        assert_eq!(
            report.missing.get("PARANODES.IO"),
            Some(&vec![MissingRecord {
                operator_name: "PARANODES.IO".to_string(),
                chain_name: "AssetHub".to_string(),
                rpc_url: asset_hub.rpc_url,
            }])
        );
        assert!(report.found.is_empty());
        assert!(report.has_alerts());
    }

    #[tokio::test]
    async fn test_chain_failure_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_file(&dir, r#"{"ADDR1": "PARANODES.IO", "ADDR2": "STAKEWORLD.IO"}"#);
        let config = ChainsConfig {
            polkadot_chains: vec![
                chain("Broken", &registry, ChainNetwork::Polkadot),
                chain("AssetHub", &registry, ChainNetwork::Polkadot),
            ],
            kusama_chains: vec![chain("BridgeHub", &registry, ChainNetwork::Kusama)],
        };
        let source = MockSource::default()
            .with("AssetHub", &["ADDR1"], &["ADDR9"])
            .with("BridgeHub", &[], &["ADDR2"]);

        let report = Aggregator::new(
            Box::new(source),
            vec!["PARANODES.IO".to_string(), "STAKEWORLD".to_string()],
        )
        .run(&config)
        .await;

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].chain_name, "Broken");
        assert!(report.errors[0].error_message.contains("connection refused"));
        assert!(report
            .missing
            .values()
            .flatten()
            .all(|record| record.chain_name != "Broken"));

        // every (successful chain x target) pair lands in exactly one bucket
        assert_eq!(report.chains_checked, 2);
        assert_eq!(report.found.len() + report.missing_count(), 2 * 2);
        assert_eq!(report.found.len(), 2);
        assert_eq!(report.missing["STAKEWORLD"][0].chain_name, "AssetHub");
        assert_eq!(report.missing["PARANODES.IO"][0].chain_name, "BridgeHub");

        assert_eq!(
            report.unknown,
            vec![UnknownCollators {
                chain_name: "AssetHub".to_string(),
                addresses: vec!["ADDR9".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn test_chains_run_polkadot_group_first() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_file(&dir, "{}");
        let config = ChainsConfig {
            polkadot_chains: vec![
                chain("P1", &registry, ChainNetwork::Polkadot),
                chain("P2", &registry, ChainNetwork::Polkadot),
            ],
            kusama_chains: vec![chain("K1", &registry, ChainNetwork::Kusama)],
        };
        let source = MockSource::default();
        let aggregator = Aggregator::new(Box::new(source), vec![]);

        let report = aggregator.run(&config).await;
        assert_eq!(report.errors.len(), 3);
        let order: Vec<&str> = report.errors.iter().map(|e| e.chain_name.as_str()).collect();
        assert_eq!(order, vec!["P1", "P2", "K1"]);
    }

    #[tokio::test]
    async fn test_registry_failure_skips_chain_without_querying() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChainsConfig {
            polkadot_chains: vec![chain(
                "AssetHub",
                &dir.path().join("missing.json"),
                ChainNetwork::Polkadot,
            )],
            kusama_chains: vec![],
        };
        let source = MockSource::default().with("AssetHub", &["ADDR1"], &[]);
        let aggregator = Aggregator::new(Box::new(source), vec!["PARANODES.IO".to_string()]);

        let mut report = RunReport::default();
        aggregator
            .check_chain(&config.polkadot_chains[0], &mut report)
            .await;

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.chains_checked, 0);
        assert!(report.missing.is_empty());
    }

    #[tokio::test]
    async fn test_empty_chain_list_produces_no_alert() {
        let report = Aggregator::new(
            Box::new(MockSource::default()),
            vec!["PARANODES.IO".to_string()],
        )
        .run(&ChainsConfig::default())
        .await;

        assert_eq!(report, RunReport::default());
        assert!(!report.has_alerts());
    }
}
