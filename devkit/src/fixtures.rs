/*!
Fixtures pour les payloads du cluster

- `ExpositionBuilder` : construit un corps `/metrics` au format d'exposition
- `license_payload` / `bdb_record` : objets JSON type API de management
*/

use serde_json::{json, Value};

pub const MB: f64 = 1024.0 * 1024.0;

/// Construit un texte d'exposition ligne par ligne
#[derive(Debug, Clone, Default)]
pub struct ExpositionBuilder {
    cluster: Option<String>,
    lines: Vec<String>,
}

impl ExpositionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute `cluster="<name>"` en tête des labels de chaque échantillon BDB
    pub fn cluster(mut self, name: &str) -> Self {
        self.cluster = Some(name.to_string());
        self
    }

    pub fn help(mut self, metric: &str, text: &str) -> Self {
        self.lines.push(format!("# HELP {} {}", metric, text));
        self
    }

    pub fn gauge_type(mut self, metric: &str) -> Self {
        self.lines.push(format!("# TYPE {} gauge", metric));
        self
    }

    /// Échantillon avec labels explicites, dans l'ordre donné
    pub fn sample(mut self, metric: &str, labels: &[(&str, &str)], value: &str) -> Self {
        let labels: Vec<String> = labels
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect();
        self.lines.push(format!("{}{{{}}} {}", metric, labels.join(","), value));
        self
    }

    /// Échantillon `metric{cluster=..,bdb="<id>"} value`
    pub fn bdb(self, metric: &str, bdb: u64, value: f64) -> Self {
        let id = bdb.to_string();
        let cluster = self.cluster.clone();
        let mut labels: Vec<(&str, &str)> = Vec::new();
        if let Some(name) = cluster.as_deref() {
            labels.push(("cluster", name));
        }
        labels.push(("bdb", &id));
        self.sample(metric, &labels, &format_value(value))
    }

    /// Ligne brute (lignes malformées, familles voisines...)
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// `1e6` style for large values, the way exporters commonly print gauges
fn format_value(value: f64) -> String {
    if value.abs() >= 1e6 {
        format!("{:e}", value)
    } else {
        value.to_string()
    }
}

fn escape_label(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Objet licence complet
pub fn license_payload(cluster_name: &str, shards_limit: u64, ram_shards: u64, flash_shards: u64) -> Value {
    json!({
        "cluster_name": cluster_name,
        "activation_date": "2024-01-01",
        "expiration_date": "2025-01-01",
        "expired": false,
        "shards_limit": shards_limit,
        "ram_shards_in_use": ram_shards,
        "flash_shards_in_use": flash_shards,
        "features": ["bigstore"],
        "owner": "Redis Demo"
    })
}

/// Entrée de `/v1/bdbs`
pub fn bdb_record(uid: u64, name: &str, shards_count: u64) -> Value {
    json!({
        "uid": uid,
        "name": name,
        "shards_count": shards_count,
        "type": "redis",
        "status": "active"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_output() {
        let text = ExpositionBuilder::new()
            .cluster("demo")
            .help("bdb_used_memory", "Used memory")
            .gauge_type("bdb_used_memory")
            .bdb("bdb_used_memory", 1, 50.0 * MB)
            .bdb("redis_db_keys", 1, 1000.0)
            .raw("garbage")
            .build();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# HELP bdb_used_memory Used memory");
        assert_eq!(lines[1], "# TYPE bdb_used_memory gauge");
        assert_eq!(lines[2], "bdb_used_memory{cluster=\"demo\",bdb=\"1\"} 5.24288e7");
        assert_eq!(lines[3], "redis_db_keys{cluster=\"demo\",bdb=\"1\"} 1000");
        assert_eq!(lines[4], "garbage");
    }

    #[test]
    fn test_label_escaping() {
        let text = ExpositionBuilder::new()
            .sample("m", &[("path", "a\"b"), ("bdb", "2")], "1")
            .build();
        assert_eq!(text, "m{path=\"a\\\"b\",bdb=\"2\"} 1\n");
    }
}
