use crate::config::VisualConfig;
use crate::session::{EdgeId, Graph, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: NodeId,
	pub label: Option<String>,
	pub color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub id: EdgeId,
	pub source: NodeId,
	pub target: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Topology handed to the renderer. Edge styling arrives separately.
	pub fn from_graph(graph: &Graph, config: &VisualConfig) -> Self {
		let nodes = graph
			.nodes()
			.iter()
			.map(|id| GraphNode {
				id: id.clone(),
				label: Some(format!("{}{id}", config.node_label_prefix)),
				color: config.node_color.clone(),
			})
			.collect();
		let links = graph
			.edges()
			.iter()
			.map(|e| GraphLink {
				id: e.id.clone(),
				source: e.source.clone(),
				target: e.target.clone(),
			})
			.collect();
		Self { nodes, links }
	}
}
