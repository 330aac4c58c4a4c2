use anyhow::Result;
use std::path::Path;
use tree_sitter::{Language, Node as TSNode};

use super::common::{extract_text, find_children_by_kind, line_of, named_children, TreeSitterParser};
use super::syntax::{Annotation, Declaration, DeclarationKind, Expr, ParsedFile, Property};
use super::SyntaxSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::language_typescript(),
            Dialect::Tsx => tree_sitter_typescript::language_tsx(),
        }
    }
}

/// Lowers tree-sitter TypeScript trees into [`ParsedFile`]s.
pub struct TypeScriptParser {
    dialect: Dialect,
}

impl TypeScriptParser {
    pub fn new() -> Result<Self> {
        Self::with_dialect(Dialect::TypeScript)
    }

    pub fn tsx() -> Result<Self> {
        Self::with_dialect(Dialect::Tsx)
    }

    fn with_dialect(dialect: Dialect) -> Result<Self> {
        // Fail early if the grammar and the runtime disagree on ABI version.
        TreeSitterParser::new(dialect.language())?;
        Ok(Self { dialect })
    }

    /// Parse in-memory source as if it had been read from `file_path`.
    pub fn parse_source(&self, file_path: &Path, source: &str) -> Result<ParsedFile> {
        let mut parser = TreeSitterParser::new(self.dialect.language())?;
        let tree = parser.parse_source(source).ok_or_else(|| {
            anyhow::anyhow!("Failed to parse file: {}", file_path.display())
        })?;
        Ok(self.lower_program(&tree.root_node(), source.as_bytes(), file_path))
    }

    fn lower_program(&self, root: &TSNode, source: &[u8], file_path: &Path) -> ParsedFile {
        let declarations = named_children(root)
            .iter()
            .map(|child| self.lower_statement(child, source))
            .collect();
        ParsedFile::new(file_path, declarations)
    }

    fn lower_statement(&self, node: &TSNode, source: &[u8]) -> Declaration {
        if node.kind() != "export_statement" {
            return self.lower_declaration(node, source);
        }

        // `@Component(..) export class Foo {}` hangs the decorators on the
        // export statement rather than on the class.
        let mut annotations = self.lower_decorators(node, source);
        let inner = node
            .child_by_field_name("declaration")
            .or_else(|| node.child_by_field_name("value"));

        match inner {
            Some(inner) => {
                let mut declaration = self.lower_declaration(&inner, source);
                annotations.append(&mut declaration.annotations);
                declaration.line = line_of(node);
                declaration.with_annotations(annotations)
            }
            None => Declaration::new(None, DeclarationKind::Other, line_of(node))
                .with_annotations(annotations),
        }
    }

    fn lower_declaration(&self, node: &TSNode, source: &[u8]) -> Declaration {
        let kind = match node.kind() {
            "class_declaration" | "abstract_class_declaration" | "class" => DeclarationKind::Class,
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                DeclarationKind::Function
            }
            "lexical_declaration" | "variable_declaration" => DeclarationKind::Variable,
            "interface_declaration" | "type_alias_declaration" => DeclarationKind::Interface,
            _ => DeclarationKind::Other,
        };

        let name = match kind {
            DeclarationKind::Variable => named_children(node)
                .into_iter()
                .find(|child| child.kind() == "variable_declarator")
                .and_then(|declarator| declarator.child_by_field_name("name"))
                .map(|name| extract_text(&name, source).to_string()),
            _ => node
                .child_by_field_name("name")
                .map(|name| extract_text(&name, source).to_string()),
        };

        Declaration::new(name, kind, line_of(node))
            .with_annotations(self.lower_decorators(node, source))
    }

    fn lower_decorators(&self, node: &TSNode, source: &[u8]) -> Vec<Annotation> {
        find_children_by_kind(node, "decorator")
            .iter()
            .map(|decorator| self.lower_decorator(decorator, source))
            .collect()
    }

    fn lower_decorator(&self, decorator: &TSNode, source: &[u8]) -> Annotation {
        let text = extract_text(decorator, source)
            .trim_start_matches('@')
            .trim()
            .to_string();
        let line = line_of(decorator);

        let Some(expression) = named_children(decorator).into_iter().next() else {
            return Annotation::unresolved(text).at_line(line);
        };
        if expression.kind() != "call_expression" {
            return Annotation::unresolved(text).at_line(line);
        }

        match expression.child_by_field_name("function") {
            Some(function) if function.kind() == "identifier" => Annotation {
                callee: Some(extract_text(&function, source).to_string()),
                arguments: self.lower_arguments(&expression, source),
                text,
                line,
            },
            _ => Annotation::unresolved(text).at_line(line),
        }
    }

    fn lower_arguments(&self, call: &TSNode, source: &[u8]) -> Vec<Expr> {
        call.child_by_field_name("arguments")
            .map(|arguments| {
                named_children(&arguments)
                    .iter()
                    .map(|argument| self.lower_expr(argument, source))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lower_expr(&self, node: &TSNode, source: &[u8]) -> Expr {
        let text = extract_text(node, source);
        match node.kind() {
            "string" => Expr::StringLiteral(string_value(text)),
            "template_string" => {
                if find_children_by_kind(node, "template_substitution").is_empty() {
                    Expr::StringLiteral(string_value(text))
                } else {
                    self.other(node, text)
                }
            }
            "identifier" | "property_identifier" | "shorthand_property_identifier" => {
                Expr::Identifier(text.to_string())
            }
            "member_expression" | "nested_identifier" => Expr::Member(text.to_string()),
            "array" => Expr::Array(
                named_children(node)
                    .iter()
                    .map(|element| self.lower_expr(element, source))
                    .collect(),
            ),
            "object" => Expr::Object(
                named_children(node)
                    .iter()
                    .map(|member| self.lower_property(member, source))
                    .collect(),
            ),
            "call_expression" => match node.child_by_field_name("function") {
                Some(function) => Expr::Call {
                    callee: Box::new(self.lower_expr(&function, source)),
                    arguments: self.lower_arguments(node, source),
                },
                None => self.other(node, text),
            },
            "new_expression" => match node.child_by_field_name("constructor") {
                Some(constructor) => Expr::Call {
                    callee: Box::new(self.lower_expr(&constructor, source)),
                    arguments: self.lower_arguments(node, source),
                },
                None => self.other(node, text),
            },
            "parenthesized_expression" => match named_children(node).first() {
                Some(inner) => self.lower_expr(inner, source),
                None => self.other(node, text),
            },
            _ => self.other(node, text),
        }
    }

    fn lower_property(&self, member: &TSNode, source: &[u8]) -> Property {
        let text = extract_text(member, source);
        match member.kind() {
            "pair" => {
                let name = member.child_by_field_name("key").and_then(|key| {
                    let key_text = extract_text(&key, source);
                    match key.kind() {
                        "property_identifier" | "number" => Some(key_text.to_string()),
                        "string" => Some(string_value(key_text)),
                        _ => None,
                    }
                });
                let value = member
                    .child_by_field_name("value")
                    .map(|value| self.lower_expr(&value, source))
                    .unwrap_or_else(|| self.other(member, text));
                Property { name, value }
            }
            "shorthand_property_identifier" => {
                Property::named(text, Expr::Identifier(text.to_string()))
            }
            "method_definition" => Property {
                name: member
                    .child_by_field_name("name")
                    .map(|name| extract_text(&name, source).to_string()),
                value: self.other(member, text),
            },
            _ => Property {
                name: None,
                value: self.other(member, text),
            },
        }
    }

    fn other(&self, node: &TSNode, text: &str) -> Expr {
        Expr::Other {
            kind: node.kind().to_string(),
            text: text.to_string(),
        }
    }
}

fn strip_delimiters(text: &str) -> &str {
    if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Cooked value of a quoted or substitution-free template literal.
fn string_value(text: &str) -> String {
    unescape(strip_delimiters(text))
}

/// Decode JavaScript escape sequences. Malformed escapes are kept verbatim.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|next| next.is_ascii_digit()) => out.push('\0'),
            'x' => match take_hex(&mut chars, 2) {
                Some(code) => push_code_point(&mut out, code, &mut chars),
                None => out.push_str("\\x"),
            },
            'u' => match read_unicode_escape(&mut chars) {
                Some(code) => push_code_point(&mut out, code, &mut chars),
                None => out.push_str("\\u"),
            },
            // Line continuations contribute nothing.
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }
    out
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn take_hex(chars: &mut Chars<'_>, len: usize) -> Option<u32> {
    let lookahead = chars.clone();
    let digits: String = lookahead.take(len).collect();
    if digits.len() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    for _ in 0..len {
        chars.next();
    }
    u32::from_str_radix(&digits, 16).ok()
}

/// The part of a `\u` escape after the `u`: `XXXX` or `{X..}`.
fn read_unicode_escape(chars: &mut Chars<'_>) -> Option<u32> {
    if chars.peek() != Some(&'{') {
        return take_hex(chars, 4);
    }
    let digits: String = chars.clone().skip(1).take_while(|c| *c != '}').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    if chars.clone().nth(1 + digits.len()) != Some('}') {
        return None;
    }
    let code = u32::from_str_radix(&digits, 16).ok()?;
    for _ in 0..digits.len() + 2 {
        chars.next();
    }
    Some(code)
}

/// Push `code`, joining a high surrogate with a following `\uXXXX` low one.
fn push_code_point(out: &mut String, code: u32, chars: &mut Chars<'_>) {
    if (0xD800..0xDC00).contains(&code) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low @ 0xDC00..=0xDFFF) = take_hex(&mut lookahead, 4) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                if let Some(c) = char::from_u32(combined) {
                    out.push(c);
                    *chars = lookahead;
                    return;
                }
            }
        }
    }
    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
}

impl SyntaxSource for TypeScriptParser {
    fn parse_file(&self, file_path: &Path) -> Result<ParsedFile> {
        let mut parser = TreeSitterParser::new(self.dialect.language())?;
        let (tree, source) = parser.parse_file(file_path)?;
        Ok(self.lower_program(&tree.root_node(), source.as_bytes(), file_path))
    }

    fn language_name(&self) -> &str {
        match self.dialect {
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
        }
    }
}
