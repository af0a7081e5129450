//! Dynamic values manipulated by the benchmark workloads.
//!
//! The workloads model the operations of a dynamically typed script
//! (`arr[j] = j * j`, `obj.foo[0].bar = j`), so the containers here are owned
//! and mutated in place rather than shared behind `Arc`.

use std::fmt;
use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::util::fast_map::{FastHashMap, fast_hash_map_new};

#[cfg(test)]
mod val_test;

#[derive(Debug, Clone, Default)]
pub enum Val {
    #[default]
    Nil,
    Int(i64), // Since most arch are 64 bit, we can use i64 for int
    Float(f64),
    /// String type, wrapped in Arc<str> for efficient cloning
    Str(Arc<str>),
    List(Vec<Val>),
    /// Keys use Arc<str> to reduce key-string cloning and allocations
    Map(FastHashMap<Arc<str>, Val>),
}

impl Val {
    pub fn empty_list() -> Self {
        Val::List(Vec::new())
    }

    pub fn empty_map() -> Self {
        Val::Map(fast_hash_map_new())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Nil => "Nil",
            Val::Int(_) => "Int",
            Val::Float(_) => "Float",
            Val::Str(_) => "String",
            Val::List(_) => "List",
            Val::Map(_) => "Map",
        }
    }

    /// Number of elements for containers, byte length for strings.
    pub fn len(&self) -> Option<usize> {
        match self {
            Val::Str(s) => Some(s.len()),
            Val::List(items) => Some(items.len()),
            Val::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Val::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Val]> {
        match self {
            Val::List(items) => Some(items),
            _ => None,
        }
    }

    /// `self[key]` for maps.
    pub fn field(&self, key: &str) -> Result<&Val> {
        match self {
            Val::Map(map) => map.get(key).ok_or_else(|| anyhow!("field '{}' not found", key)),
            other => bail!("cannot access field '{}' on {}", key, other.type_name()),
        }
    }

    pub fn field_mut(&mut self, key: &str) -> Result<&mut Val> {
        match self {
            Val::Map(map) => map.get_mut(key).ok_or_else(|| anyhow!("field '{}' not found", key)),
            other => bail!("cannot access field '{}' on {}", key, other.type_name()),
        }
    }

    /// `self.key = value`, inserting the key when absent.
    pub fn set_field(&mut self, key: &str, value: Val) -> Result<()> {
        match self {
            Val::Map(map) => {
                if let Some(slot) = map.get_mut(key) {
                    *slot = value;
                } else {
                    map.insert(Arc::from(key), value);
                }
                Ok(())
            }
            other => bail!("cannot set field '{}' on {}", key, other.type_name()),
        }
    }

    pub fn index(&self, idx: usize) -> Result<&Val> {
        match self {
            Val::List(items) => items
                .get(idx)
                .ok_or_else(|| anyhow!("index {} out of bounds for list of length {}", idx, items.len())),
            other => bail!("cannot index {} with {}", other.type_name(), idx),
        }
    }

    pub fn index_mut(&mut self, idx: usize) -> Result<&mut Val> {
        match self {
            Val::List(items) => {
                let len = items.len();
                items
                    .get_mut(idx)
                    .ok_or_else(|| anyhow!("index {} out of bounds for list of length {}", idx, len))
            }
            other => bail!("cannot index {} with {}", other.type_name(), idx),
        }
    }

    /// `self[idx] = value`. Assigning one past the end appends, like a script array.
    pub fn set_index(&mut self, idx: usize, value: Val) -> Result<()> {
        match self {
            Val::List(items) => {
                if idx < items.len() {
                    items[idx] = value;
                } else if idx == items.len() {
                    items.push(value);
                } else {
                    bail!("index {} out of bounds for list of length {}", idx, items.len());
                }
                Ok(())
            }
            other => bail!("cannot index {} with {}", other.type_name(), idx),
        }
    }

    pub fn concat_strings(a: &str, b: &str) -> Val {
        if a.is_empty() {
            return Val::Str(Arc::from(b));
        }
        if b.is_empty() {
            return Val::Str(Arc::from(a));
        }
        let mut joined = String::with_capacity(a.len() + b.len());
        joined.push_str(a);
        joined.push_str(b);
        Val::Str(Arc::from(joined))
    }

    /// Script-level `+` for the value kinds the workloads produce.
    pub fn add(&self, other: &Val) -> Result<Val> {
        match (self, other) {
            (Val::Int(a), Val::Int(b)) => Ok(Val::Int(a.wrapping_add(*b))),
            (Val::Float(a), Val::Float(b)) => Ok(Val::Float(a + b)),
            (Val::Float(a), Val::Int(b)) => Ok(Val::Float(a + *b as f64)),
            (Val::Int(a), Val::Float(b)) => Ok(Val::Float(*a as f64 + b)),
            (Val::Str(a), Val::Str(b)) => Ok(Val::concat_strings(a, b)),
            (Val::Str(a), Val::Int(b)) => {
                let mut buf = itoa::Buffer::new();
                Ok(Val::concat_strings(a, buf.format(*b)))
            }
            (Val::Str(a), Val::Float(b)) => {
                let mut buf = ryu::Buffer::new();
                Ok(Val::concat_strings(a, buf.format(*b)))
            }
            (l, r) => bail!("unsupported operation: {} + {}", l.type_name(), r.type_name()),
        }
    }

    pub fn mul(&self, other: &Val) -> Result<Val> {
        match (self, other) {
            (Val::Int(a), Val::Int(b)) => Ok(Val::Int(a.wrapping_mul(*b))),
            (Val::Float(a), Val::Float(b)) => Ok(Val::Float(a * b)),
            (Val::Float(a), Val::Int(b)) => Ok(Val::Float(a * *b as f64)),
            (Val::Int(a), Val::Float(b)) => Ok(Val::Float(*a as f64 * b)),
            (l, r) => bail!("unsupported operation: {} * {}", l.type_name(), r.type_name()),
        }
    }
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Nil, Val::Nil) => true,
            (Val::Int(a), Val::Int(b)) => a == b,
            (Val::Float(a), Val::Float(b)) => a == b,
            (Val::Int(a), Val::Float(b)) | (Val::Float(b), Val::Int(a)) => (*a as f64) == *b,
            (Val::Str(a), Val::Str(b)) => a == b,
            (Val::List(a), Val::List(b)) => a == b,
            (Val::Map(a), Val::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Val {
    fn from(v: i64) -> Self {
        Val::Int(v)
    }
}

impl From<f64> for Val {
    fn from(v: f64) -> Self {
        Val::Float(v)
    }
}

impl From<&str> for Val {
    fn from(v: &str) -> Self {
        Val::Str(Arc::from(v))
    }
}

impl<T: Into<Val>> From<Vec<T>> for Val {
    fn from(items: Vec<T>) -> Self {
        Val::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Nil => write!(f, "nil"),
            Val::Int(v) => {
                let mut buf = itoa::Buffer::new();
                f.write_str(buf.format(*v))
            }
            Val::Float(v) => {
                let mut buf = ryu::Buffer::new();
                f.write_str(buf.format(*v))
            }
            Val::Str(s) => f.write_str(s),
            Val::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Val::Map(map) => {
                // Sorted so output is stable regardless of hash order
                let mut keys: Vec<&Arc<str>> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, map[key])?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for Val {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Val::Nil => serializer.serialize_unit(),
            Val::Int(v) => serializer.serialize_i64(*v),
            Val::Float(v) => serializer.serialize_f64(*v),
            Val::Str(s) => serializer.serialize_str(s),
            Val::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Val::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k.as_ref(), v)?;
                }
                out.end()
            }
        }
    }
}
