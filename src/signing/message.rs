//! Signable messages
//!
//! A flat field -> value map keyed by the camelCase names the schema
//! declares. Numeric fields are carried as base-10 strings so that
//! `uint128` values never pass through a float or a narrower integer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::schema::Field;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageValue {
    Bool(bool),
    Uint(u64),
    Str(String),
}

impl From<&str> for MessageValue {
    fn from(value: &str) -> Self {
        MessageValue::Str(value.to_string())
    }
}

impl From<String> for MessageValue {
    fn from(value: String) -> Self {
        MessageValue::Str(value)
    }
}

impl From<bool> for MessageValue {
    fn from(value: bool) -> Self {
        MessageValue::Bool(value)
    }
}

impl From<u64> for MessageValue {
    fn from(value: u64) -> Self {
        MessageValue::Uint(value)
    }
}

impl std::fmt::Display for MessageValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageValue::Bool(b) => write!(f, "{}", b),
            MessageValue::Uint(n) => write!(f, "{}", n),
            MessageValue::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignableMessage {
    fields: BTreeMap<String, MessageValue>,
}

impl SignableMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<MessageValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<MessageValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<MessageValue> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&MessageValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Values in schema order; fails unless keys equal the schema's field set
    pub fn ordered_values<'a>(
        &'a self,
        type_name: &str,
        schema: &'static [Field],
    ) -> ClientResult<Vec<(&'static Field, &'a MessageValue)>> {
        if let Some(extra) = self
            .fields
            .keys()
            .find(|key| !schema.iter().any(|f| f.name == key.as_str()))
        {
            return Err(ClientError::schema_mismatch(
                type_name,
                format!("unexpected field `{}`", extra),
            ));
        }

        schema
            .iter()
            .map(|f| {
                self.fields.get(f.name).map(|v| (f, v)).ok_or_else(|| {
                    ClientError::schema_mismatch(type_name, format!("missing field `{}`", f.name))
                })
            })
            .collect()
    }
}
