mod ast;
mod binder;
mod eval;
mod functions;
mod parser;
mod value;

pub use ast::{IdentifierNode, InvocationNode, KeyValuePairNode, LiteralNode, LiteralValue, Location, Node, NodeList};
pub use binder::{FunctionBinder, FunctionCandidate};
pub use eval::{evaluate, EvaluationContext};
pub use functions::register_builtins;
pub use parser::{parse_decoration, parse_expression};
pub use value::{Value, ValueType};
