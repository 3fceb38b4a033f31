use crate::models::Reported;
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenseSummary {
    pub cluster_name: Reported<Value>,
    pub activation_date: Reported<Value>,
    pub expiration_date: Reported<Value>,
    pub expired: Reported<Value>,
    pub shards_limit: Number,
    pub ram_shards_in_use: Number,
    pub flash_shards_in_use: Number,
    pub percentage_shards_used: Reported<f64>,
}

impl LicenseSummary {
    pub fn summarize(license: &Value) -> Self {
        let shards_limit = count_field(license, "shards_limit");
        let ram_shards_in_use = count_field(license, "ram_shards_in_use");
        let flash_shards_in_use = count_field(license, "flash_shards_in_use");
        let in_use = add_counts(&ram_shards_in_use, &flash_shards_in_use);

        Self {
            cluster_name: passthrough_field(license, "cluster_name"),
            activation_date: passthrough_field(license, "activation_date"),
            expiration_date: passthrough_field(license, "expiration_date"),
            expired: passthrough_field(license, "expired"),
            percentage_shards_used: shard_usage_percentage(&in_use, &shards_limit),
            shards_limit,
            ram_shards_in_use,
            flash_shards_in_use,
        }
    }

    pub fn total_shards_in_use(&self) -> Number {
        add_counts(&self.ram_shards_in_use, &self.flash_shards_in_use)
    }

    pub fn log(&self) {
        info!("Cluster Name: {}", self.cluster_name.display_text());
        info!("Activation Date: {}", self.activation_date.display_text());
        info!("Expiration Date: {}", self.expiration_date.display_text());
        info!("Expired: {}", self.expired.display_text());
        info!("Shards Limit: {}", self.shards_limit);
        info!("RAM Shards In Use: {}", self.ram_shards_in_use);
        info!("Flash Shards In Use: {}", self.flash_shards_in_use);
        match self.percentage_shards_used {
            Reported::Value(pct) => info!("Percentage of Shards Used: {pct:.2}%"),
            Reported::NotAvailable => info!("Percentage of Shards Used: N/A"),
        }
    }
}

// Pas de limite positive => pas de pourcentage
fn shard_usage_percentage(in_use: &Number, limit: &Number) -> Reported<f64> {
    let limit = number_as_f64(limit);
    if limit <= 0.0 {
        return Reported::NotAvailable;
    }
    let pct = number_as_f64(in_use) / limit * 100.0;
    if pct.is_finite() {
        Reported::Value(pct)
    } else {
        Reported::NotAvailable
    }
}

/// Absent ou `null` -> `"N/A"`, le reste tel quel.
fn passthrough_field(license: &Value, key: &str) -> Reported<Value> {
    license.get(key).filter(|v| !v.is_null()).cloned().into()
}

/// N'importe quel nombre JSON, tel quel; sinon `0`.
fn count_field(license: &Value, key: &str) -> Number {
    match license.get(key) {
        Some(Value::Number(n)) => n.clone(),
        _ => Number::from(0u64),
    }
}

fn add_counts(a: &Number, b: &Number) -> Number {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return sum.into();
        }
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        if let Some(sum) = x.checked_add(y) {
            return sum.into();
        }
    }
    Number::from_f64(number_as_f64(a) + number_as_f64(b)).unwrap_or_else(|| Number::from(0u64))
}

fn number_as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(0.0)
}
