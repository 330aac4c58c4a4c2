//! Normalization of an annotation's configuration object into category lists.
//!
//! The rules are deliberately quirky and kept compatible with existing
//! inputs:
//!
//! - a string value keeps only its last path segment and becomes a
//!   one-element list;
//! - an array value maps call-style elements to their first argument plus a
//!   trailing `*` marker, and plain references to their text;
//! - among several properties with the same name the last one wins;
//! - a category with no property at all is `None`, which is not the same as
//!   an empty list.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ExtractError;
use crate::parsers::{Annotation, Expr, Property};

/// Appended to call-style array elements (`provide(Token)` becomes `Token*`).
pub const MARKER: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Directives,
    Providers,
    TemplateUrl,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Directives,
        Category::Providers,
        Category::TemplateUrl,
    ];

    /// Property name inside the configuration object.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Directives => "directives",
            Category::Providers => "providers",
            Category::TemplateUrl => "templateUrl",
        }
    }
}

/// Shape of a category value, decided once per property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigValue<'a> {
    StringLiteral(&'a str),
    ArrayLiteral(&'a [Expr]),
    Other(&'static str),
}

impl<'a> From<&'a Expr> for ConfigValue<'a> {
    fn from(expr: &'a Expr) -> Self {
        match expr {
            Expr::StringLiteral(text) => ConfigValue::StringLiteral(text),
            Expr::Array(elements) => ConfigValue::ArrayLiteral(elements),
            other => ConfigValue::Other(other.shape()),
        }
    }
}

/// The three normalized categories of one annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryLists {
    pub directives: Option<Vec<String>>,
    pub providers: Option<Vec<String>>,
    pub template_url: Option<Vec<String>>,
}

impl CategoryLists {
    fn all_empty() -> Self {
        Self {
            directives: Some(Vec::new()),
            providers: Some(Vec::new()),
            template_url: Some(Vec::new()),
        }
    }

    pub fn get(&self, category: Category) -> Option<&[String]> {
        match category {
            Category::Directives => self.directives.as_deref(),
            Category::Providers => self.providers.as_deref(),
            Category::TemplateUrl => self.template_url.as_deref(),
        }
    }

    fn set(&mut self, category: Category, value: Option<Vec<String>>) {
        match category {
            Category::Directives => self.directives = value,
            Category::Providers => self.providers = value,
            Category::TemplateUrl => self.template_url = value,
        }
    }
}

/// Where a configuration lives, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub file: &'a Path,
    pub declaration: &'a str,
}

impl Site<'_> {
    fn malformed(&self, property: &str, found: impl Into<String>) -> ExtractError {
        ExtractError::MalformedConfig {
            file: self.file.to_path_buf(),
            declaration: self.declaration.to_string(),
            property: property.to_string(),
            found: found.into(),
        }
    }
}

/// Extract all categories from one matched annotation.
pub fn extract_categories(
    annotation: &Annotation,
    site: Site<'_>,
) -> Result<CategoryLists, ExtractError> {
    let properties = match annotation.config_argument() {
        None => return Ok(CategoryLists::all_empty()),
        Some(Expr::Object(properties)) => properties,
        Some(other) => return Err(site.malformed("configuration argument", other.shape())),
    };

    let mut lists = CategoryLists::default();
    for category in Category::ALL {
        lists.set(category, extract_category(properties, category, site)?);
    }
    Ok(lists)
}

/// Normalize every property named after `category`; the last one wins.
pub fn extract_category(
    properties: &[Property],
    category: Category,
    site: Site<'_>,
) -> Result<Option<Vec<String>>, ExtractError> {
    let name = category.as_str();
    let mut result = None;
    for property in properties.iter().filter(|p| p.is_named(name)) {
        result = Some(normalize_value(&property.value, name, site)?);
    }
    Ok(result)
}

fn normalize_value(value: &Expr, property: &str, site: Site<'_>) -> Result<Vec<String>, ExtractError> {
    match ConfigValue::from(value) {
        ConfigValue::StringLiteral(text) => Ok(vec![last_segment(text).to_string()]),
        ConfigValue::ArrayLiteral(elements) => elements
            .iter()
            .map(|element| normalize_element(element, property, site))
            .collect(),
        ConfigValue::Other(found) => Err(site.malformed(property, found)),
    }
}

fn normalize_element(element: &Expr, property: &str, site: Site<'_>) -> Result<String, ExtractError> {
    match element {
        Expr::Call { arguments, .. } => match arguments.first() {
            Some(first) => Ok(format!("{}{}", first.literal_text(), MARKER)),
            None => Err(site.malformed(property, "call expression without arguments")),
        },
        Expr::Identifier(name) | Expr::Member(name) => Ok(name.clone()),
        Expr::StringLiteral(text) => Ok(last_segment(text).to_string()),
        other => Err(site.malformed(property, format!("{} element", other.shape()))),
    }
}

/// Text after the last `/`, or the whole text when there is none.
pub fn last_segment(text: &str) -> &str {
    text.rsplit('/').next().unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site<'static> {
        Site {
            file: Path::new("app.ts"),
            declaration: "AppComponent",
        }
    }

    fn annotation(config: Expr) -> Annotation {
        Annotation::call("Component", vec![config])
    }

    #[test]
    fn string_value_keeps_last_path_segment() {
        let config = Expr::object(vec![("templateUrl", Expr::string("app/views/app.html"))]);
        let lists = extract_categories(&annotation(config), site()).unwrap();
        assert_eq!(lists.template_url, Some(vec!["app.html".to_string()]));
    }

    #[test]
    fn string_without_separator_is_kept_whole() {
        assert_eq!(last_segment("app.html"), "app.html");
        assert_eq!(last_segment("a/b/"), "");
    }

    #[test]
    fn array_elements_are_trimmed_and_passed_through() {
        let config = Expr::object(vec![(
            "directives",
            Expr::Array(vec![Expr::string("a/b/Foo"), Expr::ident("Bar")]),
        )]);
        let lists = extract_categories(&annotation(config), site()).unwrap();
        assert_eq!(
            lists.directives,
            Some(vec!["Foo".to_string(), "Bar".to_string()])
        );
    }

    #[test]
    fn call_elements_take_first_argument_with_marker() {
        let config = Expr::object(vec![(
            "providers",
            Expr::Array(vec![
                Expr::call(
                    "provide",
                    vec![Expr::ident("Token1"), Expr::object(vec![("useClass", Expr::ident("Impl"))])],
                ),
                Expr::ident("Token2"),
            ]),
        )]);
        let lists = extract_categories(&annotation(config), site()).unwrap();
        assert_eq!(
            lists.providers,
            Some(vec!["Token1*".to_string(), "Token2".to_string()])
        );
    }

    #[test]
    fn normalization_does_not_consume_arguments() {
        let config = Expr::object(vec![(
            "providers",
            Expr::Array(vec![Expr::call("provide", vec![Expr::string("token")])]),
        )]);
        let annotation = annotation(config);
        let before = annotation.clone();

        let first = extract_categories(&annotation, site()).unwrap();
        let second = extract_categories(&annotation, site()).unwrap();
        assert_eq!(first, second);
        assert_eq!(annotation, before);
        assert_eq!(first.providers, Some(vec!["token*".to_string()]));
    }

    #[test]
    fn absent_category_differs_from_empty_array() {
        let config = Expr::object(vec![("directives", Expr::Array(vec![]))]);
        let lists = extract_categories(&annotation(config), site()).unwrap();
        assert_eq!(lists.directives, Some(vec![]));
        assert_eq!(lists.template_url, None);
        assert_eq!(lists.providers, None);
    }

    #[test]
    fn last_property_with_the_same_name_wins() {
        let config = Expr::object(vec![
            ("providers", Expr::Array(vec![Expr::ident("First")])),
            ("providers", Expr::Array(vec![Expr::ident("Second")])),
        ]);
        let lists = extract_categories(&annotation(config), site()).unwrap();
        assert_eq!(lists.providers, Some(vec!["Second".to_string()]));
    }

    #[test]
    fn missing_configuration_argument_yields_empty_lists() {
        let lists = extract_categories(&Annotation::call("View", vec![]), site()).unwrap();
        assert_eq!(lists.get(Category::Directives), Some(&[][..]));
        assert_eq!(lists.get(Category::Providers), Some(&[][..]));
        assert_eq!(lists.get(Category::TemplateUrl), Some(&[][..]));
    }

    #[test]
    fn only_the_last_argument_is_configuration() {
        let annotation = Annotation::call(
            "Component",
            vec![
                Expr::object(vec![("directives", Expr::Array(vec![Expr::ident("Ignored")]))]),
                Expr::object(vec![("directives", Expr::Array(vec![Expr::ident("Used")]))]),
            ],
        );
        let lists = extract_categories(&annotation, site()).unwrap();
        assert_eq!(lists.directives, Some(vec!["Used".to_string()]));
    }

    #[test]
    fn nested_object_value_is_malformed() {
        let config = Expr::object(vec![(
            "providers",
            Expr::object(vec![("provide", Expr::ident("X"))]),
        )]);
        let err = extract_categories(&annotation(config), site()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MalformedConfig {
                file: "app.ts".into(),
                declaration: "AppComponent".into(),
                property: "providers".into(),
                found: "object literal".into(),
            }
        );
    }

    #[test]
    fn malformed_values_in_unrelated_properties_are_ignored() {
        let config = Expr::object(vec![
            ("host", Expr::object(vec![])),
            ("selector", Expr::ident("SELECTOR")),
        ]);
        let lists = extract_categories(&annotation(config), site()).unwrap();
        assert_eq!(lists, CategoryLists::default());
    }

    #[test]
    fn non_object_configuration_is_malformed() {
        let err = extract_categories(&annotation(Expr::ident("CONFIG")), site()).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedConfig { ref property, .. } if property == "configuration argument"
        ));
    }

    #[test]
    fn call_without_arguments_is_malformed() {
        let config = Expr::object(vec![(
            "providers",
            Expr::Array(vec![Expr::call("factory", vec![])]),
        )]);
        assert!(extract_categories(&annotation(config), site()).is_err());
    }
}
