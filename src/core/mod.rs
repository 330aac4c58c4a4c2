pub mod analyzer;
pub mod graph;
pub mod scanner;

pub use analyzer::{AnalysisReport, DependencyAnalyzer, FileError};
pub use graph::{DependencyGraph, EdgeKind, GraphBuilder, GraphEdge, GraphNode, NodeKind};
pub use scanner::{FileScanner, SourceFile};
