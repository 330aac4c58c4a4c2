use crate::parsers::{Declaration, ParsedFile};

/// Top-level declarations of `file` carrying at least one annotation, in
/// source order.
pub fn annotated_declarations(file: &ParsedFile) -> impl Iterator<Item = &Declaration> {
    file.declarations.iter().filter(|declaration| declaration.is_annotated())
}
