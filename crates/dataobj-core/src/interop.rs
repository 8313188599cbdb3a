//! Bridge between the tree and serde / `serde_json::Value`.
//!
//! Objects serialize as maps in child order, arrays as sequences, scalars
//! natively. `serde_json` is built with `preserve_order`, so converting a
//! `Value` into a tree keeps the document's key order.

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{DataObjectError, Result};
use crate::handle::Handle;
use crate::object::DataObject;
use crate::types::{DataType, Scalar};

impl Serialize for DataObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match (self.kind, &self.scalar) {
            (DataType::Uninitialized, _) => Err(S::Error::custom(format!(
                "cannot serialize uninitialized node '{}'",
                self.key
            ))),
            (DataType::Null, _) => serializer.serialize_unit(),
            (DataType::Bool, Scalar::Bool(b)) => serializer.serialize_bool(*b),
            (DataType::Integer, Scalar::Integer(i)) => serializer.serialize_i64(*i),
            (DataType::String, Scalar::String(s)) => serializer.serialize_str(s),
            (DataType::Bool, _) => serializer.serialize_bool(false),
            (DataType::Integer, _) => serializer.serialize_i64(0),
            (DataType::String, _) => serializer.serialize_str(""),
            (DataType::Array, _) => {
                let mut seq = serializer.serialize_seq(Some(self.children.len()))?;
                for child in &self.children {
                    seq.serialize_element(&**child)?;
                }
                seq.end()
            }
            (DataType::Object, _) => {
                let mut map = serializer.serialize_map(Some(self.children.len()))?;
                for child in &self.children {
                    map.serialize_entry(child.key(), &**child)?;
                }
                map.end()
            }
        }
    }
}

impl DataObject {
    /// Convert to a `serde_json::Value`. Fails on `Uninitialized` nodes.
    pub fn to_json_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| DataObjectError::Unrepresentable(e.to_string()))
    }
}

impl TryFrom<&Value> for DataObject {
    type Error = DataObjectError;

    fn try_from(value: &Value) -> Result<Self> {
        Ok(match value {
            Value::Null => DataObject::with_type(DataType::Null),
            Value::Bool(b) => DataObject::from(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DataObject::from(i),
                None => {
                    return Err(DataObjectError::Unrepresentable(format!(
                        "number {n} is not an i64 integer"
                    )))
                }
            },
            Value::String(s) => DataObject::from(s.as_str()),
            Value::Array(items) => {
                let mut node = DataObject::with_type(DataType::Array);
                for item in items {
                    node.add_array_element(Handle::new(DataObject::try_from(item)?))?;
                }
                node
            }
            Value::Object(map) => {
                let mut node = DataObject::with_type(DataType::Object);
                for (key, item) in map {
                    if key.is_empty() {
                        return Err(DataObjectError::Unrepresentable(
                            "empty object key".to_string(),
                        ));
                    }
                    node.add_child_keyed(key.as_str(), Handle::new(DataObject::try_from(item)?))?;
                }
                node
            }
        })
    }
}

impl TryFrom<Value> for DataObject {
    type Error = DataObjectError;

    fn try_from(value: Value) -> Result<Self> {
        DataObject::try_from(&value)
    }
}
