use super::binder::{FunctionBinder, FunctionCandidate};
use super::value::{Value, ValueType};

fn candidate(name: &str, params: Vec<ValueType>, call: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> FunctionCandidate {
    FunctionCandidate {
        name: name.to_string(),
        params,
        call: Box::new(call),
    }
}

fn as_str(v: &Value) -> String {
    v.to_string()
}

fn as_decimal(v: &Value) -> f64 {
    match v {
        Value::Integer(i) => *i as f64,
        Value::Decimal(d) => *d,
        _ => 0.0,
    }
}

/// Registers the standard host function library (spec §4.6). Kept modest —
/// enough to drive decoration expressions end to end, including one
/// deliberately overloaded pair (`add`) to exercise exact-vs-assignable
/// resolution.
pub fn register_builtins(binder: &mut FunctionBinder) {
    binder.register(candidate("concat", vec![ValueType::String, ValueType::String], |args| {
        Value::String(format!("{}{}", as_str(&args[0]), as_str(&args[1])))
    }));

    binder.register(candidate("to_upper", vec![ValueType::String], |args| {
        Value::String(as_str(&args[0]).to_uppercase())
    }));

    binder.register(candidate("to_lower", vec![ValueType::String], |args| {
        Value::String(as_str(&args[0]).to_lowercase())
    }));

    binder.register(candidate(
        "substr",
        vec![ValueType::String, ValueType::Integer, ValueType::Integer],
        |args| {
            let s = as_str(&args[0]);
            let start = match &args[1] {
                Value::Integer(i) => (*i).max(0) as usize,
                _ => 0,
            };
            let len = match &args[2] {
                Value::Integer(i) => (*i).max(0) as usize,
                _ => 0,
            };
            let chars: Vec<char> = s.chars().collect();
            let end = (start + len).min(chars.len());
            if start >= chars.len() || start >= end {
                Value::String(String::new())
            } else {
                Value::String(chars[start..end].iter().collect())
            }
        },
    ));

    binder.register(candidate("len", vec![ValueType::String], |args| {
        Value::Integer(as_str(&args[0]).chars().count() as i64)
    }));

    binder.register(candidate("env", vec![ValueType::String], |args| {
        match std::env::var(as_str(&args[0])) {
            Ok(value) => Value::String(value),
            Err(_) => Value::Null,
        }
    }));

    // Overloaded on purpose: exact `Integer, Integer` wins over the
    // `Decimal, Decimal` candidate whenever both arguments are integers.
    binder.register(candidate("add", vec![ValueType::Integer, ValueType::Integer], |args| {
        let (Value::Integer(a), Value::Integer(b)) = (&args[0], &args[1]) else {
            return Value::Null;
        };
        Value::Integer(a + b)
    }));
    binder.register(candidate("add", vec![ValueType::Decimal, ValueType::Decimal], |args| {
        Value::Decimal(as_decimal(&args[0]) + as_decimal(&args[1]))
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_joins_two_strings() {
        let mut binder = FunctionBinder::new();
        register_builtins(&mut binder);
        let result = binder
            .invoke("concat", &[Value::String("a".into()), Value::String("b".into())])
            .unwrap();
        assert_eq!(result, Value::String("ab".into()));
    }

    #[test]
    fn add_prefers_integer_overload_for_integer_args() {
        let mut binder = FunctionBinder::new();
        register_builtins(&mut binder);
        let result = binder.invoke("add", &[Value::Integer(2), Value::Integer(3)]).unwrap();
        assert_eq!(result, Value::Integer(5));
    }

    #[test]
    fn add_falls_back_to_decimal_overload_for_mixed_args() {
        let mut binder = FunctionBinder::new();
        register_builtins(&mut binder);
        let result = binder.invoke("add", &[Value::Integer(2), Value::Decimal(0.5)]).unwrap();
        assert_eq!(result, Value::Decimal(2.5));
    }

    #[test]
    fn env_returns_null_for_missing_variable() {
        let mut binder = FunctionBinder::new();
        register_builtins(&mut binder);
        let result = binder
            .invoke("env", &[Value::String("TAPLINE_DEFINITELY_UNSET_VAR".into())])
            .unwrap();
        assert_eq!(result, Value::Null);
    }
}
