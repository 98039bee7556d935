use std::fmt;

/// A runtime value produced by evaluating an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Null,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Integer(_) => ValueType::Integer,
            Value::Decimal(_) => ValueType::Decimal,
            Value::Boolean(_) => ValueType::Boolean,
            // Null carries no type information of its own; the binder uses a
            // generic "any" type for it when resolving overloads (spec §4.6).
            Value::Null => ValueType::Any,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Null => write!(f, ""),
        }
    }
}

/// The type side of an argument/parameter used for overload resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Decimal,
    Boolean,
    /// Accepts any argument type — the generic object type a null argument
    /// is assigned, and a parameter type that accepts anything.
    Any,
}

impl ValueType {
    /// Is a value of `from` assignable to a parameter declared `self`?
    ///
    /// A parameter typed `Any` accepts anything, and `Integer` widens to
    /// `Decimal`. Note a null argument's runtime type is `Any` but that does
    /// *not* make it assignable into a concrete-typed parameter — binding a
    /// null argument only succeeds against a candidate that itself declares
    /// an `Any` parameter. Any other failure to bind a null argument is left
    /// to the caller to turn into silent-null-propagation (spec §4.5).
    pub fn is_assignable_from(self, from: ValueType) -> bool {
        if self == ValueType::Any {
            return true;
        }
        if self == from {
            return true;
        }
        matches!((self, from), (ValueType::Decimal, ValueType::Integer))
    }
}
