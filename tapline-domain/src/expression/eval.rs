use std::collections::HashMap;

use super::ast::Node;
use super::binder::{BindError, FunctionBinder};
use super::value::Value;

/// The field scopes and function table an expression tree evaluates
/// against (spec §3/§4.5).
///
/// Identifier resolution follows one rule, checked in order:
/// - a name prefixed with `$` or `_` is a local (record) field lookup (the
///   prefix is stripped before the lookup);
/// - a name that case-insensitively equals `"timestamp"` resolves to the
///   record's timestamp rather than a field lookup;
/// - anything else is a global field lookup.
///
/// An identifier that resolves to nothing yields `Value::Null`, same as any
/// other missing value — there is no separate "undefined" state.
pub struct EvaluationContext<'a> {
    pub local_fields: HashMap<String, Value>,
    pub global_fields: HashMap<String, Value>,
    pub timestamp: Value,
    pub binder: &'a FunctionBinder,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(binder: &'a FunctionBinder) -> Self {
        Self {
            local_fields: HashMap::new(),
            global_fields: HashMap::new(),
            timestamp: Value::Null,
            binder,
        }
    }

    fn resolve_identifier(&self, name: &str) -> Value {
        if let Some(rest) = name.strip_prefix('$').or_else(|| name.strip_prefix('_')) {
            if rest.eq_ignore_ascii_case("timestamp") {
                return self.timestamp.clone();
            }
            return self.local_fields.get(rest).cloned().unwrap_or(Value::Null);
        }
        if name.eq_ignore_ascii_case("timestamp") {
            return self.timestamp.clone();
        }
        self.global_fields.get(name).cloned().unwrap_or(Value::Null)
    }
}

/// Evaluates a parsed expression tree against `ctx` (spec §4.5), walking it
/// post-order: children are evaluated before the node that contains them.
pub fn evaluate(node: &Node, ctx: &EvaluationContext<'_>) -> Value {
    match node {
        Node::Literal(literal) => match &literal.value {
            super::ast::LiteralValue::String(s) => Value::String(s.clone()),
            super::ast::LiteralValue::Integer(i) => Value::Integer(*i),
            super::ast::LiteralValue::Decimal(d) => Value::Decimal(*d),
            super::ast::LiteralValue::Boolean(b) => Value::Boolean(*b),
            super::ast::LiteralValue::Null => Value::Null,
        },
        Node::Identifier(identifier) => ctx.resolve_identifier(&identifier.name),
        Node::List(list) => {
            let rendered: String = list.items.iter().map(|item| evaluate(item, ctx).to_string()).collect();
            Value::String(rendered)
        }
        Node::Invocation(invocation) => {
            let args: Vec<Value> = invocation.args.iter().map(|arg| evaluate(arg, ctx)).collect();
            match ctx.binder.invoke(&invocation.name, &args) {
                Ok(value) => value,
                Err(BindError::Unresolved) | Err(BindError::NoSuchFunction) => {
                    if args.iter().any(Value::is_null) {
                        // Null propagation: an unresolved overload with a
                        // null argument is the expected no-value case, not
                        // an error worth logging.
                        Value::Null
                    } else {
                        tracing::warn!(
                            function = %invocation.name,
                            arity = invocation.args.len(),
                            "could not resolve function call; evaluating to null"
                        );
                        Value::Null
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::functions::register_builtins;
    use crate::expression::parser::parse_expression;

    fn binder_with_builtins() -> FunctionBinder {
        let mut binder = FunctionBinder::new();
        register_builtins(&mut binder);
        binder
    }

    #[test]
    fn resolves_global_field_by_bare_name() {
        let binder = binder_with_builtins();
        let mut ctx = EvaluationContext::new(&binder);
        ctx.global_fields.insert("host".to_string(), Value::String("web-1".into()));
        let node = parse_expression("host").unwrap();
        assert_eq!(evaluate(&node, &ctx), Value::String("web-1".into()));
    }

    #[test]
    fn resolves_local_field_through_dollar_prefix() {
        let binder = binder_with_builtins();
        let mut ctx = EvaluationContext::new(&binder);
        ctx.local_fields.insert("Region".to_string(), Value::String("us-east-1".into()));
        let node = parse_expression("$Region").unwrap();
        assert_eq!(evaluate(&node, &ctx), Value::String("us-east-1".into()));
    }

    #[test]
    fn resolves_local_field_through_underscore_prefix() {
        let binder = binder_with_builtins();
        let mut ctx = EvaluationContext::new(&binder);
        ctx.local_fields.insert("Env".to_string(), Value::String("prod".into()));
        let node = parse_expression("_Env").unwrap();
        assert_eq!(evaluate(&node, &ctx), Value::String("prod".into()));
    }

    #[test]
    fn timestamp_identifier_is_case_insensitive_and_bypasses_field_lookup() {
        let binder = binder_with_builtins();
        let mut ctx = EvaluationContext::new(&binder);
        ctx.timestamp = Value::String("2026-07-31T00:00:00Z".into());
        let node = parse_expression("TimeStamp").unwrap();
        assert_eq!(evaluate(&node, &ctx), Value::String("2026-07-31T00:00:00Z".into()));
    }

    #[test]
    fn missing_identifier_evaluates_to_null() {
        let binder = binder_with_builtins();
        let ctx = EvaluationContext::new(&binder);
        let node = parse_expression("nonexistent").unwrap();
        assert_eq!(evaluate(&node, &ctx), Value::Null);
    }

    #[test]
    fn unresolved_invocation_with_null_argument_propagates_null_silently() {
        let binder = binder_with_builtins();
        let ctx = EvaluationContext::new(&binder);
        let node = parse_expression("to_upper(missing_field)").unwrap();
        assert_eq!(evaluate(&node, &ctx), Value::Null);
    }

    #[test]
    fn node_list_concatenates_rendered_children() {
        let binder = binder_with_builtins();
        let mut ctx = EvaluationContext::new(&binder);
        ctx.global_fields.insert("id".to_string(), Value::Integer(42));
        let node = crate::expression::parse_decoration(&[("k".to_string(), "instance-${id}".to_string())]).unwrap();
        let crate::expression::Node::List(list) = &node[0].value else {
            panic!("expected list");
        };
        let rendered: String = list.items.iter().map(|item| evaluate(item, &ctx).to_string()).collect();
        assert_eq!(rendered, "instance-42");
    }
}
