//! Projection of results onto rendered edge attributes.
//!
//! [`render`] is the only source of edge colors, widths and labels. Nothing else writes
//! them, so the canvas can always be rebuilt from the graph and the result store.

use crate::config::VisualConfig;

use super::graph::{EdgeId, Graph};
use super::results::ResultStore;

/// Whether an edge carries results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	/// No committed result.
	Neutral,
	/// At least one committed result.
	Highlighted,
}

/// Rendered attributes of one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualEdgeAttributes {
	/// Edge id.
	pub edge: EdgeId,
	/// Neutral or highlighted.
	pub emphasis: Emphasis,
	/// CSS color.
	pub color: String,
	/// Stroke width in graph units.
	pub width: f64,
	/// Score label drawn at the midpoint, highlighted edges only.
	pub label: Option<String>,
	/// Hover text.
	pub tooltip: String,
}

/// Formats a score the way labels and reports show it.
pub fn format_score(score: f64, precision: usize) -> String {
	format!("{score:.precision$}")
}

/// Derives the attributes of every edge, in graph edge order.
///
/// Edges with a result show their most recently committed score.
pub fn render(graph: &Graph, store: &ResultStore, config: &VisualConfig) -> Vec<VisualEdgeAttributes> {
	let latest = store.latest_scores();
	graph
		.edges()
		.iter()
		.map(|edge| match latest.get(edge.id.as_str()) {
			Some(&score) => {
				let text = format_score(score, config.score_precision);
				VisualEdgeAttributes {
					edge: edge.id.clone(),
					emphasis: Emphasis::Highlighted,
					color: store
						.edge_color(&edge.id)
						.unwrap_or(config.highlight_color.as_str())
						.to_string(),
					width: config.highlight_width,
					tooltip: format!("Betweenness: {text}"),
					label: Some(text),
				}
			}
			None => VisualEdgeAttributes {
				edge: edge.id.clone(),
				emphasis: Emphasis::Neutral,
				color: config.neutral_color.clone(),
				width: if config.width_from_weight {
					edge.weight * 2.0
				} else {
					config.neutral_width
				},
				label: None,
				tooltip: format!("Weight: {}", edge.weight),
			},
		})
		.collect()
}
