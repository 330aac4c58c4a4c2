use petgraph::{graph::NodeIndex, Directed, Graph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::extract::{Category, DependencyRecord};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
pub enum NodeKind {
    Component,
    Directive,
    Provider,
    Template,
}

impl From<Category> for NodeKind {
    fn from(category: Category) -> Self {
        match category {
            Category::Directives => NodeKind::Directive,
            Category::Providers => NodeKind::Provider,
            Category::TemplateUrl => NodeKind::Template,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
pub enum EdgeKind {
    Uses,
    Provides,
    Renders,
}

impl From<Category> for EdgeKind {
    fn from(category: Category) -> Self {
        match category {
            Category::Directives => EdgeKind::Uses,
            Category::Providers => EdgeKind::Provides,
            Category::TemplateUrl => EdgeKind::Renders,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    /// Declaring file, for component nodes only.
    pub file: Option<PathBuf>,
}

impl GraphNode {
    pub fn component(record: &DependencyRecord, occurrence: usize) -> Self {
        let id = if occurrence == 0 {
            format!("component:{}", record.name)
        } else {
            format!("component:{}#{}", record.name, occurrence)
        };
        Self {
            id,
            name: record.name.clone(),
            kind: NodeKind::Component,
            file: Some(record.file.clone()),
        }
    }

    pub fn dependency(kind: NodeKind, name: &str) -> Self {
        Self {
            id: dependency_id(kind, name),
            name: name.to_string(),
            kind,
            file: None,
        }
    }
}

fn dependency_id(kind: NodeKind, name: &str) -> String {
    let prefix = match kind {
        NodeKind::Component => "component",
        NodeKind::Directive => "directive",
        NodeKind::Provider => "provider",
        NodeKind::Template => "template",
    };
    format!("{prefix}:{name}")
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub kind: EdgeKind,
}

pub type DependencyGraph = Graph<GraphNode, GraphEdge, Directed>;

/// Builds a graph with one node per record and one node per distinct
/// dependency; insertion follows record order.
pub struct GraphBuilder {
    graph: DependencyGraph,
    node_map: HashMap<String, NodeIndex>,
    occurrences: HashMap<String, usize>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
            occurrences: HashMap::new(),
        }
    }

    pub fn from_records(records: &[DependencyRecord]) -> DependencyGraph {
        let mut builder = Self::new();
        for record in records {
            builder.add_record(record);
        }
        builder.build()
    }

    pub fn add_record(&mut self, record: &DependencyRecord) -> NodeIndex {
        // Several records may share a name (one per matching annotation).
        let occurrence = self.occurrences.entry(record.name.clone()).or_insert(0);
        let component = GraphNode::component(record, *occurrence);
        *occurrence += 1;
        let component_idx = self.add_node(component);

        for category in Category::ALL {
            for name in record.category(category).unwrap_or_default() {
                let kind = NodeKind::from(category);
                let target = self.dependency_node(kind, name);
                self.graph.add_edge(
                    component_idx,
                    target,
                    GraphEdge {
                        kind: EdgeKind::from(category),
                    },
                );
            }
        }
        component_idx
    }

    fn dependency_node(&mut self, kind: NodeKind, name: &str) -> NodeIndex {
        match self.node_map.get(&dependency_id(kind, name)) {
            Some(idx) => *idx,
            None => self.add_node(GraphNode::dependency(kind, name)),
        }
    }

    fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(id, index);
        index
    }

    pub fn build(self) -> DependencyGraph {
        self.graph
    }

    pub fn get_node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
