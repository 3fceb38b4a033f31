use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Literal emitted in the report when a value cannot be derived.
pub const NOT_AVAILABLE: &str = "N/A";

/// A report field that is either a real value or the `"N/A"` sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Reported<T> {
    Value(T),
    NotAvailable,
}

impl<T> From<Option<T>> for Reported<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reported::NotAvailable, Reported::Value)
    }
}

impl Reported<Value> {
    /// Texte pour les logs : chaînes sans guillemets, le reste en JSON.
    pub fn display_text(&self) -> String {
        match self {
            Reported::Value(Value::String(s)) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl<T: Serialize> Serialize for Reported<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reported::Value(v) => v.serialize(serializer),
            Reported::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Reported<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reported::Value(v) => v.fmt(f),
            Reported::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_serializes_as_string() {
        let missing: Reported<u64> = Reported::NotAvailable;
        assert_eq!(serde_json::to_string(&missing).unwrap(), "\"N/A\"");
        assert_eq!(serde_json::to_string(&Reported::Value(2u64)).unwrap(), "2");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Reported::from(Some("mydb")), Reported::Value("mydb"));
        assert_eq!(Reported::<&str>::from(None), Reported::NotAvailable);
        assert_eq!(Reported::<f64>::NotAvailable.to_string(), "N/A");
    }

    #[test]
    fn test_display_text_unquotes_strings() {
        assert_eq!(Reported::Value(Value::from("mydb")).display_text(), "mydb");
        assert_eq!(Reported::Value(Value::from(false)).display_text(), "false");
        assert_eq!(Reported::<Value>::NotAvailable.display_text(), "N/A");
    }
}
