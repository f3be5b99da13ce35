use crate::vector::Vector;
use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Stable entity identifier
///
/// Ordering is total: integers sort before strings, integers numerically,
/// strings lexicographically. Ranking uses it as the tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Integer(u64),
    String(String),
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Integer(i) => write!(f, "{}", i),
            EntityId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId::String(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::String(s.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(i: u64) -> Self {
        EntityId::Integer(i)
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    Numeric(f64),
    Categorical(String),
    SetOfStrings(BTreeSet<String>),
    FreeText(String),
    Vector(Vector),
}

impl AttributeValue {
    /// Short kind name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Numeric(_) => "numeric",
            AttributeValue::Categorical(_) => "categorical",
            AttributeValue::SetOfStrings(_) => "set",
            AttributeValue::FreeText(_) => "text",
            AttributeValue::Vector(_) => "vector",
        }
    }

    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeValue::SetOfStrings(items.into_iter().map(Into::into).collect())
    }
}

/// Lookup result for a named field on an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Present(&'a AttributeValue),
    Absent,
}

impl<'a> Field<'a> {
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    #[inline]
    pub fn value(&self) -> Option<&'a AttributeValue> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }
}

/// A boat record: an id plus named, typed attributes
///
/// In JSON an attribute is absent when its key is missing or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(
        default,
        serialize_with = "serialize_attributes",
        deserialize_with = "deserialize_attributes"
    )]
    attributes: AHashMap<String, AttributeValue>,
}

impl Entity {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            attributes: AHashMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_numeric(self, name: impl Into<String>, value: f64) -> Self {
        self.with(name, AttributeValue::Numeric(value))
    }

    #[must_use]
    pub fn with_categorical(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, AttributeValue::Categorical(value.into()))
    }

    #[must_use]
    pub fn with_set<I, S>(self, name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(name, AttributeValue::set(items))
    }

    #[must_use]
    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, AttributeValue::FreeText(value.into()))
    }

    #[must_use]
    pub fn with_vector(self, name: impl Into<String>, vector: Vector) -> Self {
        self.with(name, AttributeValue::Vector(vector))
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeValue> {
        self.attributes.remove(name)
    }

    /// Look up a field, making absence explicit
    #[inline]
    pub fn field(&self, name: &str) -> Field<'_> {
        match self.attributes.get(name) {
            Some(value) => Field::Present(value),
            None => Field::Absent,
        }
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}

fn serialize_attributes<S>(
    attributes: &AHashMap<String, AttributeValue>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // Sorted output keeps serialized entities stable across runs
    let sorted: BTreeMap<&String, &AttributeValue> = attributes.iter().collect();
    sorted.serialize(serializer)
}

fn deserialize_attributes<'de, D>(
    deserializer: D,
) -> std::result::Result<AHashMap<String, AttributeValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, Option<AttributeValue>> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_builder() {
        let boat = Entity::new("b1")
            .with_categorical("type", "Yacht")
            .with_numeric("length", 42.0)
            .with_set("features", ["GPS", "Radar"]);

        assert_eq!(boat.id, EntityId::String("b1".to_string()));
        assert_eq!(boat.attribute_count(), 3);
        assert!(boat.field("type").is_present());
        assert_eq!(boat.field("year"), Field::Absent);
    }

    #[test]
    fn test_null_attribute_is_absent() {
        let boat: Entity = serde_json::from_value(json!({
            "id": 7,
            "attributes": {
                "length": null,
                "type": {"categorical": "Sailboat"}
            }
        }))
        .unwrap();

        assert_eq!(boat.id, EntityId::Integer(7));
        assert_eq!(boat.field("length"), Field::Absent);
        assert_eq!(
            boat.field("type").value(),
            Some(&AttributeValue::Categorical("Sailboat".to_string()))
        );
    }

    #[test]
    fn test_zero_is_not_absent() {
        let boat: Entity = serde_json::from_value(json!({
            "id": "b1",
            "attributes": {"engine_hours": {"numeric": 0.0}}
        }))
        .unwrap();

        assert_eq!(
            boat.field("engine_hours").value(),
            Some(&AttributeValue::Numeric(0.0))
        );
    }

    #[test]
    fn test_missing_attributes_key() {
        let boat: Entity = serde_json::from_value(json!({"id": "bare"})).unwrap();
        assert_eq!(boat.attribute_count(), 0);
    }

    #[test]
    fn test_entity_id_ordering() {
        let mut ids = vec![
            EntityId::from("b"),
            EntityId::from(10u64),
            EntityId::from("a"),
            EntityId::from(2u64),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                EntityId::from(2u64),
                EntityId::from(10u64),
                EntityId::from("a"),
                EntityId::from("b"),
            ]
        );
    }

    #[test]
    fn test_vector_attribute_serde() {
        let boat = Entity::new(1u64).with_vector("image", Vector::new(vec![0.5, 0.5]));
        let value = serde_json::to_value(&boat).unwrap();
        assert_eq!(value["attributes"]["image"], json!({"vector": [0.5, 0.5]}));

        let parsed: Entity = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, boat);
    }
}
