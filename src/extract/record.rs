use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::config::{Category, CategoryLists};
use crate::error::ExtractError;
use crate::parsers::Declaration;

/// Dependencies of one annotated declaration, the unit handed to rendering.
///
/// Absent categories are `None` and are left out of serialized output; an
/// empty list means the property was present but empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    pub file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
    #[serde(
        rename = "templateUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub template_url: Option<Vec<String>>,
}

impl DependencyRecord {
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            directives: None,
            providers: None,
            template_url: None,
        }
    }

    pub fn with_categories(mut self, lists: CategoryLists) -> Self {
        self.directives = lists.directives;
        self.providers = lists.providers;
        self.template_url = lists.template_url;
        self
    }

    pub fn category(&self, category: Category) -> Option<&[String]> {
        match category {
            Category::Directives => self.directives.as_deref(),
            Category::Providers => self.providers.as_deref(),
            Category::TemplateUrl => self.template_url.as_deref(),
        }
    }
}

/// Build the record for one matched annotation of `declaration`.
pub fn build_record(
    declaration: &Declaration,
    file: &Path,
    lists: CategoryLists,
) -> Result<DependencyRecord, ExtractError> {
    let name = declaration
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ExtractError::MissingDeclarationName {
            file: file.to_path_buf(),
            line: declaration.line,
        })?;

    Ok(DependencyRecord::new(name, file).with_categories(lists))
}
