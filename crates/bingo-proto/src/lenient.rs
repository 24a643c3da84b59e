use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads an integer that may arrive as a JSON number or a numeric string.
/// `null`, `""` and anything non-numeric decode as `None`.
pub(crate) fn opt_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_of))
}

/// Reads a list of integers, skipping entries that are not numeric. `null` is empty.
pub(crate) fn numbers<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .iter()
        .filter_map(number_of)
        .collect())
}

/// Like [`numbers`] but keeps "absent" distinct from "empty".
pub(crate) fn opt_numbers<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value.map(|items| items.iter().filter_map(number_of).collect()))
}

/// Reads an opaque identifier or version token. Strings pass through, numbers are
/// rendered in their JSON form, empty strings collapse to `None`.
pub(crate) fn opt_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Reads a list that the backend may send as `null`.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a display string. `null` is empty and numbers keep their JSON form.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_token(deserializer)?.unwrap_or_default())
}

/// Reads a rank from a number or numeric string. Unreadable ranks are 0.
pub(crate) fn rank<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_of)
        .and_then(|rank| u32::try_from(rank).ok())
        .unwrap_or_default())
}

pub(crate) fn number_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
