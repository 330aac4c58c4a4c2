//! Graphviz rendering pipeline.
//!
//! Stages run strictly in order and each one reads the artifact of the
//! previous stage from disk:
//!
//! 1. **DOT**: the template is preprocessed (shapes, color scheme, name) and
//!    the generated node/edge statements are spliced into `{components}`.
//! 2. **SVG**: the external Graphviz executable turns the DOT file into SVG.
//! 3. **HTML**: the SVG is embedded into a standalone document.
//!
//! A failing stage stops the pipeline; artifacts of completed stages stay on
//! disk.

use petgraph::visit::EdgeRef;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

use crate::config::RenderConfig;
use crate::core::{DependencyGraph, EdgeKind, GraphBuilder, NodeKind};
use crate::error::{RenderError, RenderStage};
use crate::extract::DependencyRecord;

pub const BUILTIN_TEMPLATE: &str = include_str!("../../templates/component.dot");

const PROVIDER_COLOR: usize = 3;
const DIRECTIVE_COLOR: usize = 5;
const TEMPLATE_COLOR: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderArtifacts {
    pub dot: PathBuf,
    pub image: PathBuf,
    pub html: PathBuf,
}

pub struct DotEngine {
    config: RenderConfig,
    template: String,
}

impl DotEngine {
    /// Load the template up front so a missing file fails before any output
    /// is written.
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        let template = match &config.template {
            None => BUILTIN_TEMPLATE.to_string(),
            Some(path) if !path.exists() => return Err(RenderError::MissingTemplate(path.clone())),
            Some(path) => fs::read_to_string(path).map_err(|source| RenderError::Stage {
                stage: RenderStage::Dot,
                source,
            })?,
        };
        Ok(Self { config, template })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn generate_graph(
        &self,
        records: &[DependencyRecord],
    ) -> Result<RenderArtifacts, RenderError> {
        info!(records = records.len(), "starting render");
        let dot = self.generate_dot(records)?;
        let image = self.generate_svg(&dot)?;
        let html = self.generate_html(&image)?;
        Ok(RenderArtifacts { dot, image, html })
    }

    fn preprocess_template(&self) -> String {
        info!("processing templates");
        self.template
            .replace("{1}", &self.config.shape_modules)
            .replace("{2}", &self.config.shape_providers)
            .replace("{3}", &self.config.shape_directives)
            .replace("{scheme}", &self.config.color_scheme)
            .replace("{name}", &escape(&self.config.name))
    }

    /// The complete DOT text for `records`.
    pub fn render_dot(&self, records: &[DependencyRecord]) -> String {
        let graph = GraphBuilder::from_records(records);
        let body = self.render_body(&graph);
        self.preprocess_template().replace("{components}", &body)
    }

    fn render_body(&self, graph: &DependencyGraph) -> String {
        let palette = palette_size(&self.config.color_scheme);
        let mut body = String::with_capacity(graph.node_count() * 64);
        let mut component_colors = vec![0usize; graph.node_count()];
        let mut components = 0usize;

        for idx in graph.node_indices() {
            let node = &graph[idx];
            let (shape, color) = match node.kind {
                NodeKind::Component => {
                    let color = components % palette + 1;
                    components += 1;
                    component_colors[idx.index()] = color;
                    (self.config.shape_modules.as_str(), color)
                }
                NodeKind::Provider => (self.config.shape_providers.as_str(), PROVIDER_COLOR),
                NodeKind::Directive => (self.config.shape_directives.as_str(), DIRECTIVE_COLOR),
                NodeKind::Template => ("note", TEMPLATE_COLOR),
            };

            let _ = write!(
                body,
                "    \"{}\" [label=\"{}\", shape={}, fillcolor={}",
                escape(&node.id),
                escape(&node.name),
                shape,
                color
            );
            if let Some(file) = &node.file {
                let _ = write!(body, ", tooltip=\"{}\"", escape(&file.to_string_lossy()));
            }
            body.push_str("];\n");
        }

        body.push('\n');

        for edge in graph.edge_references() {
            let style = match edge.weight().kind {
                EdgeKind::Uses => "solid",
                EdgeKind::Provides => "bold",
                EdgeKind::Renders => "dashed",
            };
            let _ = writeln!(
                body,
                "    \"{}\" -> \"{}\" [color={}, style={}];",
                escape(&graph[edge.source()].id),
                escape(&graph[edge.target()].id),
                component_colors[edge.source().index()].max(1),
                style
            );
        }

        body
    }

    fn generate_dot(&self, records: &[DependencyRecord]) -> Result<PathBuf, RenderError> {
        let dot_file = self.config.dot_file();
        info!(path = %dot_file.display(), "generating DOT");

        write_artifact(&dot_file, &self.render_dot(records)).map_err(|source| {
            RenderError::Stage {
                stage: RenderStage::Dot,
                source,
            }
        })?;

        info!(path = %dot_file.display(), "generating DOT done");
        Ok(dot_file)
    }

    fn generate_svg(&self, dot_file: &Path) -> Result<PathBuf, RenderError> {
        let svg_file = self.config.image_file();
        info!(path = %svg_file.display(), graphviz = %self.config.graphviz, "generating SVG");

        self.run_graphviz(dot_file, &svg_file)
            .map_err(|source| RenderError::Stage {
                stage: RenderStage::Image,
                source,
            })?;

        info!(path = %svg_file.display(), "generating SVG done");
        Ok(svg_file)
    }

    fn run_graphviz(&self, dot_file: &Path, svg_file: &Path) -> io::Result<()> {
        if let Some(parent) = svg_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let output = Command::new(&self.config.graphviz)
            .arg("-Tsvg")
            .arg(dot_file)
            .arg("-o")
            .arg(svg_file)
            .output()?;

        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "{} exited with {}: {}",
                    self.config.graphviz,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(())
    }

    fn generate_html(&self, svg_file: &Path) -> Result<PathBuf, RenderError> {
        let html_file = self.config.html_file();
        info!(path = %html_file.display(), "generating HTML");

        fs::read_to_string(svg_file)
            .and_then(|svg| write_artifact(&html_file, &html_document(&self.config.name, &svg)))
            .map_err(|source| RenderError::Stage {
                stage: RenderStage::Html,
                source,
            })?;

        info!(path = %html_file.display(), "generating HTML done");
        Ok(html_file)
    }
}

fn write_artifact(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Standalone document with the SVG inlined; XML prolog and doctype dropped.
pub fn html_document(title: &str, svg: &str) -> String {
    let inline = svg.find("<svg").map(|start| &svg[start..]).unwrap_or(svg);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        html_escape(title),
        inline.trim_end()
    )
}

/// Number of colors in a Brewer scheme name such as `paired12` or `dark28`.
fn palette_size(scheme: &str) -> usize {
    let prefix = scheme.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &scheme[prefix.len()..];

    // Brewer schemes top out at 12 colors; `dark28` is dark2 with 8 colors.
    for take in [2, 1] {
        if digits.len() >= take {
            if let Ok(size) = digits[digits.len() - take..].parse::<usize>() {
                if (1..=12).contains(&size) {
                    return size;
                }
            }
        }
    }
    1
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
