//! Exact JSON encoding for [`Decimal`] money and odds values.
//!
//! Values travel as plain JSON numbers. With serde_json's
//! `arbitrary_precision` feature the digits are carried verbatim in both
//! directions, so `2.10` never becomes `2.1000000000000001`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

fn to_number<E: serde::ser::Error>(value: &Decimal) -> Result<serde_json::Number, E> {
    serde_json::Number::from_str(&value.to_string()).map_err(E::custom)
}

fn from_number<E: serde::de::Error>(num: &serde_json::Number) -> Result<Decimal, E> {
    let text = num.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(E::custom)
}

pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    to_number::<S::Error>(value)?.serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let num = serde_json::Number::deserialize(deserializer)?;
    from_number(&num)
}

pub mod option {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&super::to_number::<S::Error>(d)?),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<serde_json::Number>::deserialize(deserializer)?;
        opt.map(|num| super::from_number(&num)).transpose()
    }
}

/// Keyed decimal maps such as an outcome-to-odds table.
pub mod map {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize)]
    struct Exact(#[serde(with = "super")] Decimal);

    pub fn serialize<K, S>(value: &BTreeMap<K, Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize + Ord,
        S: Serializer,
    {
        serializer.collect_map(value.iter().map(|(k, v)| (k, Exact(*v))))
    }

    pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, Decimal>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<K, Exact>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|(k, Exact(v))| (k, v)).collect())
    }
}
