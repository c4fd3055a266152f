use crate::reference::Reference;
use indexmap::IndexMap;
use std::fmt;

/// An ordered parameter mapping, as passed to `add_step`.
pub type ParamMap = IndexMap<String, Param>;

/// A parameter value in a step definition.
///
/// Literals mirror JSON. `Ref` leaves are symbolic references that the
/// compiler replaces with their `{{path}}` template string.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    String(String),
    Array(Vec<Param>),
    Object(ParamMap),
    Ref(Reference),
}

impl Param {
    /// Collects every embedded reference in walk order.
    pub fn references(&self) -> Vec<&Reference> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<&'a Reference>) {
        match self {
            Param::Ref(reference) => found.push(reference),
            Param::Array(items) => items.iter().for_each(|item| item.collect_references(found)),
            Param::Object(map) => map.values().for_each(|value| value.collect_references(found)),
            Param::Null
            | Param::Bool(_)
            | Param::Integer(_)
            | Param::Unsigned(_)
            | Param::Float(_)
            | Param::String(_) => {}
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Null => write!(f, "null"),
            Param::Bool(b) => write!(f, "{}", b),
            Param::Integer(n) => write!(f, "{}", n),
            Param::Unsigned(n) => write!(f, "{}", n),
            Param::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Param::String(s) => write!(f, "{:?}", s),
            Param::Array(items) => write!(f, "[{} items]", items.len()),
            Param::Object(map) => write!(f, "{{{} keys}}", map.len()),
            Param::Ref(reference) => write!(f, "{}", reference.to_template_string()),
        }
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

macro_rules! impl_from_integer {
    ($($int:ty),* $(,)?) => {
        $(
            impl From<$int> for Param {
                fn from(value: $int) -> Self {
                    Param::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Param {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Param::Integer)
            .unwrap_or(Param::Unsigned(value))
    }
}

impl From<usize> for Param {
    fn from(value: usize) -> Self {
        Param::from(value as u64)
    }
}

impl From<f32> for Param {
    fn from(value: f32) -> Self {
        Param::Float(f64::from(value))
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::String(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::String(value)
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::String(value.clone())
    }
}

impl From<Reference> for Param {
    fn from(value: Reference) -> Self {
        Param::Ref(value)
    }
}

impl From<&Reference> for Param {
    fn from(value: &Reference) -> Self {
        Param::Ref(value.clone())
    }
}

impl<T: Into<Param>> From<Vec<T>> for Param {
    fn from(values: Vec<T>) -> Self {
        Param::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

impl From<ParamMap> for Param {
    fn from(map: ParamMap) -> Self {
        Param::Object(map)
    }
}

impl From<serde_json::Value> for Param {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Param::Null,
            Value::Bool(b) => Param::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Param::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Param::Unsigned(u)
                } else {
                    Param::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Param::String(s),
            Value::Array(items) => Param::Array(items.into_iter().map(Param::from).collect()),
            Value::Object(map) => {
                Param::Object(map.into_iter().map(|(k, v)| (k, Param::from(v))).collect())
            }
        }
    }
}
