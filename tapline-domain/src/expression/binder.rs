use std::fmt;

use super::value::{Value, ValueType};

/// A registered host function: a name, its declared parameter types, and the
/// Rust closure that implements it. Candidates are tried in registration
/// order (spec §4.6) so the first exact match wins ties.
pub struct FunctionCandidate {
    pub name: String,
    pub params: Vec<ValueType>,
    pub call: Box<dyn Fn(&[Value]) -> Value + Send + Sync>,
}

impl fmt::Debug for FunctionCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCandidate")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Resolves overloaded host functions by name and runtime argument types.
///
/// Binding (spec §4.6):
/// 1. Gather candidates sharing `name` and arity.
/// 2. Zero candidates is an error the caller reports as an argument error.
/// 3. Prefer a candidate whose parameter types equal the argument types
///    exactly, in registration order.
/// 4. Otherwise prefer a candidate whose parameter types are each
///    assignable from the argument types, in registration order.
/// 5. Otherwise resolution is unresolved — the caller decides whether that
///    propagates a null or is a reportable error.
#[derive(Default)]
pub struct FunctionBinder {
    candidates: Vec<FunctionCandidate>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum BindError {
    /// No function with this name and arity is registered at all.
    NoSuchFunction,
    /// Candidates exist but none accept these argument types.
    Unresolved,
}

impl FunctionBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, candidate: FunctionCandidate) {
        self.candidates.push(candidate);
    }

    fn candidates_for<'a>(
        &'a self,
        name: &str,
        arity: usize,
    ) -> impl Iterator<Item = &'a FunctionCandidate> + use<'a> {
        let name = name.to_owned();
        self.candidates
            .iter()
            .filter(move |c| c.name.eq_ignore_ascii_case(&name) && c.params.len() == arity)
    }

    pub fn bind(&self, name: &str, arg_types: &[ValueType]) -> Result<&FunctionCandidate, BindError> {
        let mut found_any = false;
        for candidate in self.candidates_for(name, arg_types.len()) {
            found_any = true;
            if candidate.params.iter().zip(arg_types).all(|(p, a)| *p == *a) {
                return Ok(candidate);
            }
        }
        if !found_any {
            return Err(BindError::NoSuchFunction);
        }
        for candidate in self.candidates_for(name, arg_types.len()) {
            if candidate
                .params
                .iter()
                .zip(arg_types)
                .all(|(p, a)| p.is_assignable_from(*a))
            {
                return Ok(candidate);
            }
        }
        Err(BindError::Unresolved)
    }

    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, BindError> {
        let arg_types: Vec<ValueType> = args.iter().map(Value::value_type).collect();
        let candidate = self.bind(name, &arg_types)?;
        Ok((candidate.call)(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, params: Vec<ValueType>, call: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> FunctionCandidate {
        FunctionCandidate {
            name: name.to_string(),
            params,
            call: Box::new(call),
        }
    }

    #[test]
    fn exact_match_wins_over_assignable_match() {
        let mut binder = FunctionBinder::new();
        binder.register(candidate("add", vec![ValueType::Decimal, ValueType::Decimal], |_| {
            Value::String("decimal".into())
        }));
        binder.register(candidate("add", vec![ValueType::Integer, ValueType::Integer], |_| {
            Value::String("integer".into())
        }));
        let result = binder
            .invoke("add", &[Value::Integer(1), Value::Integer(2)])
            .unwrap();
        assert_eq!(result, Value::String("integer".into()));
    }

    #[test]
    fn assignable_match_is_used_when_no_exact_candidate() {
        let mut binder = FunctionBinder::new();
        binder.register(candidate("add", vec![ValueType::Decimal, ValueType::Decimal], |_| {
            Value::String("decimal".into())
        }));
        let result = binder
            .invoke("add", &[Value::Integer(1), Value::Integer(2)])
            .unwrap();
        assert_eq!(result, Value::String("decimal".into()));
    }

    #[test]
    fn unknown_function_name_is_no_such_function() {
        let binder = FunctionBinder::new();
        assert!(matches!(binder.bind("missing", &[]), Err(BindError::NoSuchFunction)));
    }

    #[test]
    fn null_argument_does_not_bind_a_concrete_parameter() {
        let mut binder = FunctionBinder::new();
        binder.register(candidate("f", vec![ValueType::String], |_| Value::Null));
        let err = binder.bind("f", &[ValueType::Any]).unwrap_err();
        assert_eq!(err, BindError::Unresolved);
    }

    #[test]
    fn any_parameter_accepts_a_null_argument() {
        let mut binder = FunctionBinder::new();
        binder.register(candidate("f", vec![ValueType::Any], |_| Value::Boolean(true)));
        let result = binder.invoke("f", &[Value::Null]).unwrap();
        assert_eq!(result, Value::Boolean(true));
    }
}
