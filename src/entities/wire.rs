//! Lenient deserializers for values the backend does not type consistently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text form of an id or other scalar: numbers and strings become strings.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Required id that may be a JSON number or string.
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_text(value).ok_or_else(|| serde::de::Error::custom("id cannot be null"))
}

/// Optional scalar that may be a JSON number or string (ids, `year`).
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// `null` deserializes to the type's default instead of failing.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "id")]
        id: String,
        #[serde(default, deserialize_with = "opt_text")]
        year: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        count: i64,
    }

    #[test]
    fn test_numeric_and_string_ids() {
        let row: Row = serde_json::from_str(r#"{"id": 42, "year": 3, "count": null}"#).unwrap();
        assert_eq!(row.id, "42");
        assert_eq!(row.year.as_deref(), Some("3"));
        assert_eq!(row.count, 0);

        let row: Row = serde_json::from_str(r#"{"id": "a-b"}"#).unwrap();
        assert_eq!(row.id, "a-b");
        assert_eq!(row.year, None);
    }

    #[test]
    fn test_null_id_is_rejected() {
        assert!(serde_json::from_str::<Row>(r#"{"id": null}"#).is_err());
    }
}
