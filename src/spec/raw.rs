//! Loss-tolerant YAML document tree
//!
//! `serde_yaml::Value` rejects duplicate mapping keys and does not keep
//! non-string keys apart from their textual form, both of which RAML documents
//! rely on. [`RawNode`] is deserialized through serde's visitor API instead:
//! keys are stringified (`200` → `"200"`), a repeated key overwrites the value
//! in place of its first occurrence, and local tags (`!include`, `!type`) are
//! kept as [`RawNode::Tagged`] for the include resolver.

use serde::de::{
    self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use serde_json::{Number, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawNode {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Seq(Vec<RawNode>),
    Map(Vec<(String, RawNode)>),
    /// Local tag without its leading `!`, and the tagged node
    Tagged(String, Box<RawNode>),
}

impl RawNode {
    /// Human-readable node kind used in format errors
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            RawNode::Null => "null",
            RawNode::Bool(_) => "boolean",
            RawNode::Number(_) => "number",
            RawNode::String(_) => "string",
            RawNode::Seq(_) => "sequence",
            RawNode::Map(_) => "mapping",
            RawNode::Tagged(..) => "tagged value",
        }
    }

    /// Text used when this node appears as a mapping key
    fn into_key(self) -> String {
        match self {
            RawNode::Null => "null".to_string(),
            RawNode::Bool(b) => b.to_string(),
            RawNode::Number(n) => n.to_string(),
            RawNode::String(s) => s,
            RawNode::Tagged(_, inner) => inner.into_key(),
            other => other.into_plain_json().to_string(),
        }
    }

    /// Converts to JSON with every tag unwrapped and no include resolution
    fn into_plain_json(self) -> Value {
        match self {
            RawNode::Null => Value::Null,
            RawNode::Bool(b) => Value::Bool(b),
            RawNode::Number(n) => Value::Number(n),
            RawNode::String(s) => Value::String(s),
            RawNode::Seq(items) => {
                Value::Array(items.into_iter().map(RawNode::into_plain_json).collect())
            }
            RawNode::Map(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_plain_json()))
                    .collect(),
            ),
            RawNode::Tagged(_, inner) => inner.into_plain_json(),
        }
    }
}

struct RawNodeVisitor;

impl<'de> Visitor<'de> for RawNodeVisitor {
    type Value = RawNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawNode, E> {
        Ok(RawNode::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawNode, E> {
        Ok(RawNode::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RawNode, D::Error> {
        RawNode::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RawNode, E> {
        Ok(RawNode::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawNode, E> {
        Ok(RawNode::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawNode, E> {
        Ok(RawNode::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawNode, E> {
        // .inf and .nan have no JSON number form
        Ok(Number::from_f64(v)
            .map(RawNode::Number)
            .unwrap_or_else(|| RawNode::String(v.to_string())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawNode, E> {
        Ok(RawNode::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawNode, E> {
        Ok(RawNode::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawNode, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<RawNode>()? {
            items.push(item);
        }
        Ok(RawNode::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawNode, A::Error> {
        let mut entries: Vec<(String, RawNode)> = Vec::new();
        while let Some(key) = map.next_key::<RawNode>()? {
            let value = map.next_value::<RawNode>()?;
            let key = key.into_key();
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(RawNode::Map(entries))
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<RawNode, A::Error> {
        let (tag, contents): (String, A::Variant) = data.variant()?;
        let value = contents.newtype_variant::<RawNode>()?;
        Ok(RawNode::Tagged(
            tag.trim_start_matches('!').to_string(),
            Box::new(value),
        ))
    }
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawNodeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> RawNode {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_numeric_keys_are_stringified() {
        let node = load("200: ok\n404: missing\n");
        let RawNode::Map(entries) = node else {
            panic!("expected mapping");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["200", "404"]);
    }

    #[test]
    fn test_duplicate_key_overwrites_in_first_position() {
        let node = load("a: 1\nb: 2\na: 3\n");
        let RawNode::Map(entries) = node else {
            panic!("expected mapping");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "a");
        assert_eq!(entries[0].1, RawNode::Number(3.into()));
        assert_eq!(entries[1].0, "b");
    }

    #[test]
    fn test_local_tag_is_kept() {
        let node = load("User: !include user.raml\n");
        let RawNode::Map(entries) = node else {
            panic!("expected mapping");
        };
        assert_eq!(
            entries[0].1,
            RawNode::Tagged(
                "include".to_string(),
                Box::new(RawNode::String("user.raml".to_string()))
            )
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(load("~").kind(), "null");
        assert_eq!(load("- a\n- b\n").kind(), "sequence");
        assert_eq!(load("just text").kind(), "string");
    }
}
