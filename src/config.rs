//! Rendering configuration.
//!
//! Options come from three layers: built-in defaults, an optional JSON
//! options file, and command-line flags. [`RenderConfig::resolve`] folds the
//! layers once, before any rendering stage runs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_NAME: &str = "dependencies";
pub const DEFAULT_SHAPE_MODULES: &str = "component";
pub const DEFAULT_SHAPE_PROVIDERS: &str = "ellipse";
pub const DEFAULT_SHAPE_DIRECTIVES: &str = "cds";
pub const DEFAULT_COLOR_SCHEME: &str = "paired12";
pub const DEFAULT_GRAPHVIZ: &str = "dot";

/// Fully resolved, immutable rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderConfig {
    pub name: String,
    pub output_dot_dir: PathBuf,
    pub output_image_dir: PathBuf,
    pub output_html_dir: PathBuf,
    pub shape_modules: String,
    pub shape_providers: String,
    pub shape_directives: String,
    pub color_scheme: String,
    /// Custom DOT template; the built-in template is used when `None`.
    pub template: Option<PathBuf>,
    /// Graphviz executable used to render the image.
    pub graphviz: String,
}

impl RenderConfig {
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let name = overrides.name.unwrap_or_else(|| DEFAULT_NAME.to_string());
        let samples = Path::new("samples").join(&name);

        Self {
            output_dot_dir: overrides
                .output_dot_dir
                .unwrap_or_else(|| samples.join("dot")),
            output_image_dir: overrides
                .output_image_dir
                .unwrap_or_else(|| samples.join("image")),
            output_html_dir: overrides
                .output_html_dir
                .unwrap_or_else(|| samples.join("html")),
            shape_modules: overrides
                .shape_modules
                .unwrap_or_else(|| DEFAULT_SHAPE_MODULES.to_string()),
            shape_providers: overrides
                .shape_providers
                .unwrap_or_else(|| DEFAULT_SHAPE_PROVIDERS.to_string()),
            shape_directives: overrides
                .shape_directives
                .unwrap_or_else(|| DEFAULT_SHAPE_DIRECTIVES.to_string()),
            color_scheme: overrides
                .color_scheme
                .unwrap_or_else(|| DEFAULT_COLOR_SCHEME.to_string()),
            template: overrides.template,
            graphviz: overrides
                .graphviz
                .unwrap_or_else(|| DEFAULT_GRAPHVIZ.to_string()),
            name,
        }
    }

    pub fn dot_file(&self) -> PathBuf {
        self.output_dot_dir.join(format!("{}.dot", self.name))
    }

    pub fn image_file(&self) -> PathBuf {
        self.output_image_dir.join(format!("{}.svg", self.name))
    }

    pub fn html_file(&self) -> PathBuf {
        self.output_html_dir.join(format!("{}.html", self.name))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::resolve(ConfigOverrides::default())
    }
}

/// One layer of optional settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub name: Option<String>,
    pub output_dot_dir: Option<PathBuf>,
    pub output_image_dir: Option<PathBuf>,
    pub output_html_dir: Option<PathBuf>,
    pub shape_modules: Option<String>,
    pub shape_providers: Option<String>,
    pub shape_directives: Option<String>,
    pub color_scheme: Option<String>,
    pub template: Option<PathBuf>,
    pub graphviz: Option<String>,
}

impl ConfigOverrides {
    /// Read a JSON options file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: OptionsFile = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::try_from(file)
    }

    /// Settings of `top` take precedence over `self`.
    pub fn overlay(self, top: ConfigOverrides) -> Self {
        Self {
            name: top.name.or(self.name),
            output_dot_dir: top.output_dot_dir.or(self.output_dot_dir),
            output_image_dir: top.output_image_dir.or(self.output_image_dir),
            output_html_dir: top.output_html_dir.or(self.output_html_dir),
            shape_modules: top.shape_modules.or(self.shape_modules),
            shape_providers: top.shape_providers.or(self.shape_providers),
            shape_directives: top.shape_directives.or(self.shape_directives),
            color_scheme: top.color_scheme.or(self.color_scheme),
            template: top.template.or(self.template),
            graphviz: top.graphviz.or(self.graphviz),
        }
    }
}

/// On-disk shape of the options file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionsFile {
    pub name: Option<String>,
    pub output: Option<OutputOptions>,
    pub dot: Option<DotOptions>,
    pub template: Option<PathBuf>,
    pub graphviz: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputOptions {
    pub dot: Option<PathBuf>,
    pub image: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DotOptions {
    pub shape_modules: Option<String>,
    pub shape_providers: Option<String>,
    pub shape_directives: Option<String>,
    pub color_scheme: Option<String>,
}

impl TryFrom<OptionsFile> for ConfigOverrides {
    type Error = ConfigError;

    fn try_from(file: OptionsFile) -> Result<Self, Self::Error> {
        let (output_dot_dir, output_image_dir, output_html_dir) = match file.output {
            None => (None, None, None),
            Some(output) => {
                let dot = output.dot.ok_or(ConfigError::IncompleteOutput("dot"))?;
                let image = output.image.ok_or(ConfigError::IncompleteOutput("image"))?;
                let html = output.html.ok_or(ConfigError::IncompleteOutput("html"))?;
                (Some(dot), Some(image), Some(html))
            }
        };
        let dot = file.dot.unwrap_or_default();

        Ok(Self {
            name: file.name,
            output_dot_dir,
            output_image_dir,
            output_html_dir,
            shape_modules: dot.shape_modules,
            shape_providers: dot.shape_providers,
            shape_directives: dot.shape_directives,
            color_scheme: dot.color_scheme,
            template: file.template,
            graphviz: file.graphviz,
        })
    }
}
