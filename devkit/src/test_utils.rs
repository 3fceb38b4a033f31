/*!
Test Harness pour le poller bdbwatch

Facilite l'écriture de tests d'intégration avec:
- Démarrage automatique d'un `MockCluster`
- Publication d'un scénario standard (licence + inventaire + métriques)
- Variables de configuration pointant vers le faux cluster
*/

use crate::fixtures::{bdb_record, license_payload, ExpositionBuilder, MB};
use crate::mock_cluster::{MockCluster, BDBS_PATH, LICENSE_PATH, METRICS_PATH};
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;

/// Identifiant envoyé par le harness dans `AUTHORIZATION`
pub const TEST_AUTHORIZATION: &str = "Basic dGVzdDp0ZXN0";

/// Harness de test complet autour d'un faux cluster
pub struct TestHarness {
    pub cluster: MockCluster,
    env: HashMap<String, String>,
}

impl TestHarness {
    /// Démarre un cluster vide et prépare la configuration associée
    pub async fn start() -> Result<Self> {
        env_logger::try_init().ok(); // Init logging pour tests

        let cluster = MockCluster::start().await?;
        let env = HashMap::from([
            ("API_BASE_URL".to_string(), cluster.base_url()),
            ("METRICS_URL".to_string(), cluster.url(METRICS_PATH)),
            ("AUTHORIZATION".to_string(), TEST_AUTHORIZATION.to_string()),
            ("REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
        ]);

        Ok(Self { cluster, env })
    }

    /// Scénario de référence : une base `mydb` à 50 MB sur 100 MB, 1000 clés
    pub async fn with_demo_cluster() -> Result<Self> {
        let harness = Self::start().await?;
        harness.publish_license(&license_payload("demo-cluster", 100, 10, 0));
        harness.publish_bdbs(&[bdb_record(1, "mydb", 2)]);
        harness.publish_metrics(
            &ExpositionBuilder::new()
                .cluster("demo-cluster")
                .gauge_type("bdb_used_memory")
                .bdb("bdb_used_memory", 1, 50.0 * MB)
                .gauge_type("bdb_memory_limit")
                .bdb("bdb_memory_limit", 1, 100.0 * MB)
                .bdb("redis_db_keys", 1, 1000.0)
                .build(),
        );
        log::info!("🧪 Demo cluster published at {}", harness.cluster.base_url());
        Ok(harness)
    }

    pub fn publish_license(&self, license: &Value) {
        self.cluster.serve_json(LICENSE_PATH, license);
    }

    pub fn publish_bdbs(&self, records: &[Value]) {
        self.cluster.serve_json(BDBS_PATH, &Value::Array(records.to_vec()));
    }

    pub fn publish_metrics(&self, text: &str) {
        self.cluster.serve_text(METRICS_PATH, text);
    }

    /// Surcharge (ou ajoute) une entrée de configuration
    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Entrées de configuration, à passer à `WatchConfig::from_lookup`
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }
}
