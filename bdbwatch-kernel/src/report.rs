use crate::inventory::InventoryIndex;
use crate::license::LicenseSummary;
use crate::metrics::MetricTable;
use crate::models::Reported;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::info;

pub const USED_MEMORY_METRIC: &str = "bdb_used_memory";
pub const MEMORY_LIMIT_METRIC: &str = "bdb_memory_limit";
pub const TOTAL_KEYS_METRIC: &str = "redis_db_keys";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// Limite supposée (octets) pour une base absente de bdb_memory_limit
const MISSING_MEMORY_LIMIT_BYTES: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseReportEntry {
    pub database_id: String,
    pub bdb_name: Reported<Value>,
    pub shards_count: Reported<u64>,
    pub memory_used_mb: f64,
    pub total_memory_mb: f64,
    pub memory_usage_percentage: f64,
    pub total_keys: i64,
}

impl DatabaseReportEntry {
    pub fn log(&self) {
        info!("------------------------------------------------");
        info!("Database ID: {}", self.database_id);
        info!("BDB Name: {}", self.bdb_name.display_text());
        info!("Shards Count: {}", self.shards_count);
        info!("Memory Used: {:.2} MB", self.memory_used_mb);
        info!("Total Memory: {:.2} MB", self.total_memory_mb);
        info!("Memory Usage Percentage: {:.2}%", self.memory_usage_percentage);
        info!("Total Keys: {}", self.total_keys);
        info!("------------------------------------------------");
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub license: LicenseSummary,
    pub databases: Vec<DatabaseReportEntry>,
}

impl Report {
    pub fn build(
        license: LicenseSummary,
        inventory: &InventoryIndex,
        used_memory: &MetricTable,
        memory_limit: &MetricTable,
        total_keys: &MetricTable,
    ) -> Self {
        let mut ids: Vec<&str> = used_memory.entity_ids().collect();
        ids.sort_by(|a, b| compare_entity_ids(a, b));

        let databases = ids
            .into_iter()
            .map(|id| {
                let memory_used_mb = used_memory.get_or(id, 0.0) / BYTES_PER_MB;
                let total_memory_mb =
                    memory_limit.get_or(id, MISSING_MEMORY_LIMIT_BYTES) / BYTES_PER_MB;

                DatabaseReportEntry {
                    database_id: id.to_string(),
                    bdb_name: inventory.name_of(id),
                    shards_count: inventory.shard_count_of(id),
                    memory_used_mb,
                    total_memory_mb,
                    memory_usage_percentage: usage_percentage(memory_used_mb, total_memory_mb),
                    total_keys: total_keys.get_or(id, 0.0).trunc() as i64,
                }
            })
            .collect();

        Self { license, databases }
    }

    /// JSON indenté sur 4 espaces (sortie standard)
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

// Ratio non fini (dépassement) => 0.0, jamais `null` dans le JSON
fn usage_percentage(used_mb: f64, total_mb: f64) -> f64 {
    if total_mb <= 0.0 {
        return 0.0;
    }
    let pct = round2(used_mb / total_mb * 100.0);
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Tri numérique des ids, zéros de tête départagés lexicalement
fn compare_entity_ids(a: &str, b: &str) -> Ordering {
    let trimmed_a = a.trim_start_matches('0');
    let trimmed_b = b.trim_start_matches('0');
    trimmed_a
        .len()
        .cmp(&trimmed_b.len())
        .then_with(|| trimmed_a.cmp(trimmed_b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demo_license() -> LicenseSummary {
        LicenseSummary::summarize(&json!({
            "cluster_name": "demo-cluster",
            "activation_date": "2024-01-01",
            "expiration_date": "2025-01-01",
            "expired": false,
            "shards_limit": 100,
            "ram_shards_in_use": 10,
            "flash_shards_in_use": 0
        }))
    }

    fn demo_inventory() -> InventoryIndex {
        InventoryIndex::build(&[json!({"uid": 1, "name": "mydb", "shards_count": 2})])
    }

    #[test]
    fn test_single_database_entry() {
        let report = Report::build(
            demo_license(),
            &demo_inventory(),
            &MetricTable::from([("1", 52428800.0)]),
            &MetricTable::from([("1", 104857600.0)]),
            &MetricTable::from([("1", 1000.0)]),
        );
        assert_eq!(
            serde_json::to_value(&report.databases[0]).unwrap(),
            json!({
                "database_id": "1",
                "bdb_name": "mydb",
                "shards_count": 2,
                "memory_used_mb": 50.0,
                "total_memory_mb": 100.0,
                "memory_usage_percentage": 50.0,
                "total_keys": 1000
            })
        );
    }

    #[test]
    fn test_used_memory_drives_membership() {
        let inventory = InventoryIndex::build(&[
            json!({"uid": 1, "name": "a"}),
            json!({"uid": 2, "name": "b"}),
            json!({"uid": 3, "name": "c"}),
        ]);
        let report = Report::build(
            demo_license(),
            &inventory,
            &MetricTable::from([("1", 10.0)]),
            &MetricTable::from([("1", 20.0), ("2", 20.0)]),
            &MetricTable::from([("3", 5.0)]),
        );
        let ids: Vec<_> = report.databases.iter().map(|d| d.database_id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_missing_limit_defaults_to_one_byte() {
        let report = Report::build(
            demo_license(),
            &InventoryIndex::default(),
            &MetricTable::from([("4", 2.0)]),
            &MetricTable::new(),
            &MetricTable::new(),
        );
        let entry = &report.databases[0];
        assert_eq!(entry.bdb_name, Reported::NotAvailable);
        assert_eq!(entry.shards_count, Reported::NotAvailable);
        assert_eq!(entry.total_memory_mb, 1.0 / BYTES_PER_MB);
        assert_eq!(entry.memory_usage_percentage, 200.0);
        assert_eq!(entry.total_keys, 0);
    }

    #[test]
    fn test_zero_limit_yields_zero_percentage() {
        let report = Report::build(
            demo_license(),
            &demo_inventory(),
            &MetricTable::from([("1", 1048576.0)]),
            &MetricTable::from([("1", 0.0)]),
            &MetricTable::from([("1", 12.9)]),
        );
        let entry = &report.databases[0];
        assert_eq!(entry.total_memory_mb, 0.0);
        assert_eq!(entry.memory_usage_percentage, 0.0);
        assert_eq!(entry.total_keys, 12);
    }

    #[test]
    fn test_overflowing_ratio_is_reported_as_zero() {
        let report = Report::build(
            demo_license(),
            &InventoryIndex::default(),
            &MetricTable::from([("1", 1e307)]),
            &MetricTable::new(),
            &MetricTable::new(),
        );
        let entry = &report.databases[0];
        assert_eq!(entry.memory_usage_percentage, 0.0);

        let json = report.to_pretty_json().unwrap();
        assert!(json.contains("\"memory_usage_percentage\": 0.0"));
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_non_string_inventory_name_is_kept() {
        let inventory = InventoryIndex::build(&[json!({"uid": 1, "name": 1234})]);
        let report = Report::build(
            demo_license(),
            &inventory,
            &MetricTable::from([("1", 1.0)]),
            &MetricTable::from([("1", 2.0)]),
            &MetricTable::new(),
        );
        assert_eq!(serde_json::to_value(&report.databases[0]).unwrap()["bdb_name"], json!(1234));
    }

    #[test]
    fn test_percentage_rounded_to_two_decimals() {
        let report = Report::build(
            demo_license(),
            &demo_inventory(),
            &MetricTable::from([("1", 1.0)]),
            &MetricTable::from([("1", 3.0)]),
            &MetricTable::new(),
        );
        assert_eq!(report.databases[0].memory_usage_percentage, 33.33);
    }

    #[test]
    fn test_databases_sorted_numerically() {
        let report = Report::build(
            demo_license(),
            &InventoryIndex::default(),
            &MetricTable::from([("10", 1.0), ("2", 1.0), ("1", 1.0), ("33", 1.0)]),
            &MetricTable::new(),
            &MetricTable::new(),
        );
        let ids: Vec<_> = report.databases.iter().map(|d| d.database_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "10", "33"]);
    }

    #[test]
    fn test_pretty_json_layout() {
        let report = Report::build(
            demo_license(),
            &demo_inventory(),
            &MetricTable::from([("1", 52428800.0)]),
            &MetricTable::from([("1", 104857600.0)]),
            &MetricTable::from([("1", 1000.0)]),
        );
        let expected = r#"{
    "cluster_name": "demo-cluster",
    "activation_date": "2024-01-01",
    "expiration_date": "2025-01-01",
    "expired": false,
    "shards_limit": 100,
    "ram_shards_in_use": 10,
    "flash_shards_in_use": 0,
    "percentage_shards_used": 10.0,
    "databases": [
        {
            "database_id": "1",
            "bdb_name": "mydb",
            "shards_count": 2,
            "memory_used_mb": 50.0,
            "total_memory_mb": 100.0,
            "memory_usage_percentage": 50.0,
            "total_keys": 1000
        }
    ]
}"#;
        assert_eq!(report.to_pretty_json().unwrap(), expected);
    }

    #[test]
    fn test_build_is_deterministic() {
        let used = MetricTable::from([("3", 7.0), ("1", 5.0), ("2", 6.0)]);
        let build = || {
            Report::build(demo_license(), &demo_inventory(), &used, &MetricTable::new(), &MetricTable::new())
                .to_pretty_json()
                .unwrap()
        };
        assert_eq!(build(), build());
    }
}
