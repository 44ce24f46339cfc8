//! `serde_json` bridge for live values
//!
//! Request bodies usually arrive as JSON. Converting them into [`Value`]s lets
//! the engine validate them directly. JSON objects carry no runtime type, so a
//! `"$type"` discriminator property (the usual polymorphic-JSON convention)
//! names it; without one the object is tagged [`TypeName::anonymous`].
//!
//! ```rust
//! use serde_json::json;
//! use tessera_validator::foundation::Value;
//!
//! let value = Value::from(json!({ "$type": "Customer", "name": "Ada" }));
//! let customer = value.as_object().unwrap();
//! assert_eq!(customer.type_name().as_str(), "Customer");
//! assert!(!customer.contains("$type"));
//! ```

use super::value::{Object, TypeName, Value};

/// Property naming the runtime type of a JSON object.
pub const TYPE_DISCRIMINATOR: &str = "$type";

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(mut map) => {
                let type_name = match map.remove(TYPE_DISCRIMINATOR) {
                    Some(serde_json::Value::String(name)) => TypeName::from(name),
                    _ => TypeName::anonymous(),
                };
                let object = Object::new(type_name);
                for (key, value) in map {
                    object.set(key, Self::from(value));
                }
                Self::Object(object)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_prefer_integers() {
        assert!(matches!(Value::from(json!(-1)), Value::Int(-1)));
        assert!(matches!(Value::from(json!(1.5)), Value::Float(f) if f == 1.5));
        assert!(matches!(Value::from(json!(u64::MAX)), Value::Float(_)));
    }

    #[test]
    fn test_untyped_object_is_anonymous() {
        let value = Value::from(json!({ "tags": ["ok", ""] }));
        let obj = value.as_object().unwrap();
        assert!(obj.type_name().is_anonymous());
        assert_eq!(obj.get("tags").as_list().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_non_string_discriminator_is_ignored() {
        let value = Value::from(json!({ "$type": 7, "a": 1 }));
        let obj = value.as_object().unwrap();
        assert!(obj.type_name().is_anonymous());
        assert!(!obj.contains("$type"));
    }
}
