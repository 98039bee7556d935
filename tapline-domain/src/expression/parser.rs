use crate::error::{AgentError, AgentResult};

use super::ast::{IdentifierNode, InvocationNode, KeyValuePairNode, LiteralNode, LiteralValue, Location, Node, NodeList};

/// Parses a single expression (spec §3/§4.5). Grammar:
///
/// ```text
/// expression  := literal | invocation | identifier
/// literal     := string | integer | decimal | "true" | "false" | "null"
/// string      := '"' (escaped-char | char)* '"'
/// identifier  := bare-identifier | quoted-identifier
/// quoted-identifier := '`' (escaped-char | char)* '`'
/// invocation  := identifier '(' (expression (',' expression)*)? ')'
/// ```
///
/// Backtick-quoted identifiers let a field name contain characters a bare
/// identifier can't (spaces, punctuation); both forms resolve the same way
/// at evaluation time.
pub fn parse_expression(input: &str) -> AgentResult<Node> {
    let mut parser = Parser::new(input);
    let node = parser.parse_expr()?;
    parser.skip_whitespace();
    if parser.pos != parser.chars.len() {
        return Err(AgentError::ParseError {
            source_path: String::new(),
            line: 0,
            message: format!("trailing input at offset {}", parser.pos),
        });
    }
    Ok(node)
}

/// Parses a decoration template map into key → `NodeList` pairs (spec §4.5).
/// Each template is plain text interleaved with `${expr}` placeholders; the
/// plain-text runs become `Literal` nodes and the placeholders become
/// whatever node `parse_expression` produces, all concatenated into one
/// `NodeList` per key, in source order.
pub fn parse_decoration(entries: &[(String, String)]) -> AgentResult<Vec<KeyValuePairNode>> {
    entries
        .iter()
        .map(|(key, template)| {
            let items = parse_template(template)?;
            Ok(KeyValuePairNode {
                key: key.clone(),
                value: Node::List(NodeList {
                    location: Location::new(0, template.len()),
                    items,
                }),
            })
        })
        .collect()
}

fn parse_template(template: &str) -> AgentResult<Vec<Node>> {
    let mut items = Vec::new();
    let mut literal_start = 0;
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '$' && chars.get(i + 1) == Some(&'{') {
            if i > literal_start {
                let text: String = chars[literal_start..i].iter().collect();
                items.push(Node::Literal(LiteralNode {
                    location: Location::new(literal_start, i),
                    value: LiteralValue::String(text),
                }));
            }
            let expr_start = i + 2;
            let mut depth = 1;
            let mut j = expr_start;
            while j < chars.len() && depth > 0 {
                match chars[j] {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                if depth == 0 {
                    break;
                }
                j += 1;
            }
            if depth != 0 {
                return Err(AgentError::ParseError {
                    source_path: String::new(),
                    line: 0,
                    message: "unterminated ${...} placeholder".to_string(),
                });
            }
            let expr_text: String = chars[expr_start..j].iter().collect();
            items.push(parse_expression(&expr_text)?);
            i = j + 1;
            literal_start = i;
        } else {
            i += 1;
        }
    }
    if literal_start < chars.len() {
        let text: String = chars[literal_start..].iter().collect();
        items.push(Node::Literal(LiteralNode {
            location: Location::new(literal_start, chars.len()),
            value: LiteralValue::String(text),
        }));
    }
    Ok(items)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_expr(&mut self) -> AgentResult<Node> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') => self.parse_string_literal(),
            Some('`') => self.parse_quoted_identifier_or_invocation(),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number_literal(),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => self.parse_bareword_or_invocation(),
            _ => Err(self.error("expected an expression")),
        }
    }

    fn error(&self, message: &str) -> AgentError {
        AgentError::ParseError {
            source_path: String::new(),
            line: 0,
            message: format!("{message} at offset {}", self.pos),
        }
    }

    fn parse_string_literal(&mut self) -> AgentResult<Node> {
        let start = self.pos;
        let text = self.consume_quoted('"')?;
        Ok(Node::Literal(LiteralNode {
            location: Location::new(start, self.pos),
            value: LiteralValue::String(text),
        }))
    }

    /// Strips the surrounding quote and unescapes `\x` to a literal `x`,
    /// which is the only escaping rule the grammar defines — there is no
    /// special meaning for `\n`, `\t`, etc.
    fn consume_quoted(&mut self, quote: char) -> AgentResult<String> {
        if self.peek() != Some(quote) {
            return Err(self.error("expected opening quote"));
        }
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated quoted text")),
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(escaped) => {
                            out.push(escaped);
                            self.pos += 1;
                        }
                        None => return Err(self.error("dangling escape at end of input")),
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        Ok(out)
    }

    fn parse_quoted_identifier_or_invocation(&mut self) -> AgentResult<Node> {
        let start = self.pos;
        let name = self.consume_quoted('`')?;
        self.parse_identifier_tail(name, start)
    }

    fn parse_number_literal(&mut self) -> AgentResult<Node> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_decimal = false;
        if self.peek() == Some('.') {
            is_decimal = true;
            self.pos += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let value = if is_decimal {
            LiteralValue::Decimal(text.parse().map_err(|_| self.error("invalid decimal literal"))?)
        } else {
            LiteralValue::Integer(text.parse().map_err(|_| self.error("invalid integer literal"))?)
        };
        Ok(Node::Literal(LiteralNode {
            location: Location::new(start, self.pos),
            value,
        }))
    }

    fn parse_bareword_or_invocation(&mut self) -> AgentResult<Node> {
        let start = self.pos;
        if self.peek() == Some('$') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "true" => {
                return Ok(Node::Literal(LiteralNode {
                    location: Location::new(start, self.pos),
                    value: LiteralValue::Boolean(true),
                }))
            }
            "false" => {
                return Ok(Node::Literal(LiteralNode {
                    location: Location::new(start, self.pos),
                    value: LiteralValue::Boolean(false),
                }))
            }
            "null" => {
                return Ok(Node::Literal(LiteralNode {
                    location: Location::new(start, self.pos),
                    value: LiteralValue::Null,
                }))
            }
            _ => {}
        }
        self.parse_identifier_tail(word, start)
    }

    fn parse_identifier_tail(&mut self, name: String, start: usize) -> AgentResult<Node> {
        self.skip_whitespace();
        if self.peek() == Some('(') {
            self.pos += 1;
            let mut args = Vec::new();
            self.skip_whitespace();
            if self.peek() != Some(')') {
                loop {
                    args.push(self.parse_expr()?);
                    self.skip_whitespace();
                    match self.peek() {
                        Some(',') => {
                            self.pos += 1;
                        }
                        Some(')') => break,
                        _ => return Err(self.error("expected ',' or ')' in argument list")),
                    }
                }
            }
            self.skip_whitespace();
            if self.peek() != Some(')') {
                return Err(self.error("unterminated argument list"));
            }
            self.pos += 1;
            return Ok(Node::Invocation(InvocationNode {
                location: Location::new(start, self.pos),
                name,
                args,
            }));
        }
        Ok(Node::Identifier(IdentifierNode {
            location: Location::new(start, self.pos),
            name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bareword_identifier() {
        let node = parse_expression("ec2_instance_id").unwrap();
        assert!(matches!(node, Node::Identifier(i) if i.name == "ec2_instance_id"));
    }

    #[test]
    fn parses_dollar_prefixed_identifier() {
        let node = parse_expression("$Region").unwrap();
        assert!(matches!(node, Node::Identifier(i) if i.name == "$Region"));
    }

    #[test]
    fn parses_quoted_identifier_with_spaces() {
        let node = parse_expression("`Some Field`").unwrap();
        assert!(matches!(node, Node::Identifier(i) if i.name == "Some Field"));
    }

    #[test]
    fn parses_string_literal_with_escape() {
        let node = parse_expression(r#""a\"b""#).unwrap();
        assert!(matches!(node, Node::Literal(l) if l.value == LiteralValue::String("a\"b".into())));
    }

    #[test]
    fn parses_integer_and_decimal_literals() {
        assert!(matches!(
            parse_expression("42").unwrap(),
            Node::Literal(l) if l.value == LiteralValue::Integer(42)
        ));
        assert!(matches!(
            parse_expression("-3.5").unwrap(),
            Node::Literal(l) if l.value == LiteralValue::Decimal(-3.5)
        ));
    }

    #[test]
    fn parses_invocation_with_nested_args() {
        let node = parse_expression(r#"concat(to_upper(env), "-suffix")"#).unwrap();
        let Node::Invocation(call) = node else {
            panic!("expected invocation");
        };
        assert_eq!(call.name, "concat");
        assert_eq!(call.args.len(), 2);
        assert!(matches!(&call.args[0], Node::Invocation(inner) if inner.name == "to_upper"));
    }

    #[test]
    fn decoration_interleaves_literal_and_expression_nodes() {
        let entries = vec![("Env".to_string(), "prefix-${instance_id}-suffix".to_string())];
        let pairs = parse_decoration(&entries).unwrap();
        assert_eq!(pairs.len(), 1);
        let Node::List(list) = &pairs[0].value else {
            panic!("expected node list");
        };
        assert_eq!(list.items.len(), 3);
        assert!(matches!(&list.items[0], Node::Literal(l) if l.value == LiteralValue::String("prefix-".into())));
        assert!(matches!(&list.items[1], Node::Identifier(i) if i.name == "instance_id"));
        assert!(matches!(&list.items[2], Node::Literal(l) if l.value == LiteralValue::String("-suffix".into())));
    }
}
