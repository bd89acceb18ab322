//! Keyed collections that keep document order.
//!
//! Upstream payloads encode ordered collections as JSON objects keyed by id
//! (`{"list-a": {...}, "list-b": {...}}`), and the object order is the display
//! order. Reading them into a `HashMap` or `BTreeMap` would lose that, so they
//! are read into a `Vec` instead. Use with `#[serde(with = "crate::ordered")]`.

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// An entry that knows the key it is stored under.
pub trait Keyed {
    fn key(&self) -> &str;

    /// Called with the object key when the entry does not carry its own.
    fn assign_key(&mut self, key: String);
}

#[allow(clippy::ptr_arg)]
pub fn serialize<T, S>(items: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Keyed + Serialize,
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(items.len()))?;
    for item in items {
        map.serialize_entry(item.key(), item)?;
    }
    map.end()
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    T: Keyed + Deserialize<'de>,
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(KeyedVisitor(PhantomData))
}

struct KeyedVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for KeyedVisitor<T>
where
    T: Keyed + Deserialize<'de>,
{
    type Value = Vec<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map keyed by id or a sequence of keyed entries")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, mut item)) = access.next_entry::<String, T>()? {
            if item.key().is_empty() {
                item.assign_key(key);
            }
            upsert(&mut items, item);
        }
        Ok(items)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<T>()? {
            upsert(&mut items, item);
        }
        Ok(items)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }
}

/// A repeated key replaces the earlier entry but keeps its position.
pub fn upsert<T: Keyed>(items: &mut Vec<T>, item: T) {
    match items.iter().position(|existing| existing.key() == item.key()) {
        Some(pos) => items[pos] = item,
        None => items.push(item),
    }
}
