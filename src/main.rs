use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ngdeps::config::{ConfigOverrides, RenderConfig};
use ngdeps::core::DependencyAnalyzer;
use ngdeps::error::ConfigError;
use ngdeps::extract::{AnnotationFilter, Extractor, DEFAULT_PATTERN};
use ngdeps::formatters::{DotEngine, JsonRecordWriter};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ngdeps",
    version = "0.1.0",
    author = "ngdeps developers",
    about = "Component dependency graphs from decorated TypeScript declarations"
)]
struct Cli {
    /// Source files or directories, processed in the given order
    #[arg(value_name = "PATHS", required = true)]
    inputs: Vec<PathBuf>,

    /// Output format: graph (DOT, SVG and HTML) or json
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Graph)]
    format: OutputFormat,

    /// Output file for the json format
    #[arg(short, long, value_name = "FILE", default_value = "dependencies.json")]
    output: PathBuf,

    /// JSON options file, overridden by the flags below
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Graph name, also the artifact file stem
    #[arg(short, long)]
    name: Option<String>,

    /// Directory for the generated DOT file
    #[arg(long, value_name = "DIR")]
    dot_dir: Option<PathBuf>,

    /// Directory for the rendered SVG image
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Directory for the HTML document
    #[arg(long, value_name = "DIR")]
    html_dir: Option<PathBuf>,

    /// Graphviz shape of component nodes
    #[arg(long, value_name = "SHAPE")]
    shape_modules: Option<String>,

    /// Graphviz shape of provider nodes
    #[arg(long, value_name = "SHAPE")]
    shape_providers: Option<String>,

    /// Graphviz shape of directive nodes
    #[arg(long, value_name = "SHAPE")]
    shape_directives: Option<String>,

    /// Graphviz color scheme
    #[arg(long, value_name = "SCHEME")]
    color_scheme: Option<String>,

    /// Custom DOT template
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Graphviz executable
    #[arg(long, value_name = "BIN")]
    graphviz: Option<String>,

    /// Regex matched against decorator names
    #[arg(long, value_name = "REGEX", default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Abort on the first file that fails to extract
    #[arg(long)]
    fail_fast: bool,

    /// Parse every file even when a cached parse is up to date
    #[arg(long)]
    no_cache: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Graph,
    Json,
}

impl OutputFormat {
    fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Graph => "graph",
            OutputFormat::Json => "json",
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();

    let file_overrides = match &cli.config {
        Some(path) => ConfigOverrides::from_file(path)?,
        None => ConfigOverrides::default(),
    };
    let cli_overrides = ConfigOverrides {
        name: cli.name.clone(),
        output_dot_dir: cli.dot_dir.clone(),
        output_image_dir: cli.image_dir.clone(),
        output_html_dir: cli.html_dir.clone(),
        shape_modules: cli.shape_modules.clone(),
        shape_providers: cli.shape_providers.clone(),
        shape_directives: cli.shape_directives.clone(),
        color_scheme: cli.color_scheme.clone(),
        template: cli.template.clone(),
        graphviz: cli.graphviz.clone(),
    };
    let render_config = RenderConfig::resolve(file_overrides.overlay(cli_overrides));

    // Template problems are fatal before any file is parsed.
    let engine = match cli.format {
        OutputFormat::Graph => Some(DotEngine::new(render_config)?),
        OutputFormat::Json => None,
    };

    let filter = AnnotationFilter::new(&cli.pattern).map_err(|source| ConfigError::Pattern {
        pattern: cli.pattern.clone(),
        source,
    })?;

    info!(
        inputs = cli.inputs.len(),
        format = cli.format.as_str(),
        pattern = filter.pattern(),
        "starting analysis"
    );

    let extractor = Extractor::new(filter);
    let analyzer = if cli.no_cache {
        DependencyAnalyzer::new_with_cache(extractor, None)
    } else {
        DependencyAnalyzer::new(extractor)
    }
    .with_fail_fast(cli.fail_fast);

    let report = analyzer.analyze(&cli.inputs)?;
    if !report.is_clean() {
        warn!(
            failed = report.errors.len(),
            analyzed = report.files_analyzed,
            "some files could not be extracted"
        );
    }

    match engine {
        Some(engine) => {
            let artifacts = engine.generate_graph(&report.records)?;
            info!(
                dot = %artifacts.dot.display(),
                image = %artifacts.image.display(),
                html = %artifacts.html.display(),
                "graph generated"
            );
        }
        None => {
            JsonRecordWriter::new().format_to_file(&report.records, &cli.output)?;
            info!(path = %cli.output.display(), "records written");
        }
    }

    info!(elapsed_secs = start_time.elapsed().as_secs_f64(), "done");
    Ok(())
}
