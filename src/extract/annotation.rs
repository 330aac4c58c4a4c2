use regex::Regex;
use std::path::Path;

use crate::error::ExtractError;
use crate::parsers::{Annotation, Declaration};

pub const DEFAULT_PATTERN: &str = "(Component|View)";

/// Selects annotations by callee name.
#[derive(Debug, Clone)]
pub struct AnnotationFilter {
    pattern: Regex,
}

impl AnnotationFilter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Annotations of `declaration` whose callee name matches, in source order.
    ///
    /// Annotations are expected to be simple named calls; the first one whose
    /// callee cannot be resolved fails the whole declaration.
    pub fn matching<'a>(
        &self,
        file: &Path,
        declaration: &'a Declaration,
    ) -> Result<Vec<&'a Annotation>, ExtractError> {
        let mut matched = Vec::new();
        for annotation in &declaration.annotations {
            let callee = annotation.callee.as_deref().ok_or_else(|| {
                ExtractError::UnresolvableAnnotation {
                    file: file.to_path_buf(),
                    declaration: display_name(declaration).to_string(),
                    annotation: annotation.text.clone(),
                }
            })?;
            if self.pattern.is_match(callee) {
                matched.push(annotation);
            }
        }
        Ok(matched)
    }
}

impl Default for AnnotationFilter {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_PATTERN).expect("default pattern is valid"),
        }
    }
}

pub(crate) fn display_name(declaration: &Declaration) -> &str {
    declaration.name.as_deref().unwrap_or("<anonymous>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::DeclarationKind;

    fn declaration(annotations: Vec<Annotation>) -> Declaration {
        Declaration::new(Some("AppComponent".into()), DeclarationKind::Class, 1)
            .with_annotations(annotations)
    }

    #[test]
    fn default_pattern_matches_component_and_view_substrings() {
        let filter = AnnotationFilter::default();
        let decl = declaration(vec![
            Annotation::call("Component", vec![]),
            Annotation::call("Injectable", vec![]),
            Annotation::call("View", vec![]),
            Annotation::call("MyComponentDecorator", vec![]),
        ]);

        let callees: Vec<_> = filter
            .matching(Path::new("a.ts"), &decl)
            .unwrap()
            .into_iter()
            .map(|a| a.callee.as_deref().unwrap())
            .collect();
        assert_eq!(callees, vec!["Component", "View", "MyComponentDecorator"]);
    }

    #[test]
    fn custom_pattern_replaces_default() {
        let filter = AnnotationFilter::new("^Directive$").unwrap();
        let decl = declaration(vec![
            Annotation::call("Component", vec![]),
            Annotation::call("Directive", vec![]),
        ]);

        let matched = filter.matching(Path::new("a.ts"), &decl).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].callee.as_deref(), Some("Directive"));
    }

    #[test]
    fn unresolvable_callee_fails_fast() {
        let filter = AnnotationFilter::default();
        let decl = declaration(vec![
            Annotation::unresolved("Input"),
            Annotation::call("Component", vec![]),
        ]);

        let err = filter.matching(Path::new("a.ts"), &decl).unwrap_err();
        assert_eq!(
            err,
            ExtractError::UnresolvableAnnotation {
                file: "a.ts".into(),
                declaration: "AppComponent".into(),
                annotation: "Input".into(),
            }
        );
    }
}
