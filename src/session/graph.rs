//! Canonical node and edge set for the current session.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::error::ValidationError;

/// Opaque node identifier.
pub type NodeId = String;

/// Edge identifier, derived from the ordered endpoint pair.
pub type EdgeId = String;

/// Builds the id of the edge `source -> target`.
pub fn edge_id(source: &str, target: &str) -> EdgeId {
	format!("{source}-{target}")
}

/// A directed weighted edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// `source-target`.
	pub id: EdgeId,
	/// Tail.
	pub source: NodeId,
	/// Head.
	pub target: NodeId,
	/// Finite, non-negative.
	pub weight: f64,
}

/// An unvalidated edge row as delivered by the upload collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeInput {
	/// Tail.
	pub source: NodeId,
	/// Head.
	pub target: NodeId,
	/// Checked by [`Graph::load`].
	pub weight: f64,
}

/// Which way an edge runs relative to the node it was looked up from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	/// The looked-up node is the tail.
	Outgoing,
	/// The looked-up node is the head.
	Incoming,
}

/// One entry of [`Graph::neighbors_of`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Neighbor {
	/// The node at the other end.
	pub node: NodeId,
	/// The connecting edge.
	pub edge: EdgeId,
	/// Orientation of `edge` seen from the looked-up node.
	pub direction: Direction,
}

/// Validated topology. Replaced wholesale on each upload, never edited in place.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<NodeId>,
	edges: Vec<Edge>,
	node_set: HashSet<NodeId>,
	by_id: HashMap<EdgeId, usize>,
	// Reverse-orientation ids that don't shadow a real edge.
	aliases: HashMap<EdgeId, usize>,
}

impl Graph {
	/// Validates and builds a graph.
	///
	/// Repeated node ids are collapsed. A repeated `(source, target)` row replaces the
	/// weight of the earlier one while keeping its position.
	pub fn load(nodes: Vec<NodeId>, edges: Vec<EdgeInput>) -> Result<Self, ValidationError> {
		if nodes.is_empty() {
			return Err(ValidationError::EmptyGraph);
		}

		let mut graph = Graph::default();
		for node in nodes {
			if graph.node_set.insert(node.clone()) {
				graph.nodes.push(node);
			}
		}

		let mut pairs: HashMap<(NodeId, NodeId), usize> = HashMap::new();
		for input in edges {
			for endpoint in [&input.source, &input.target] {
				if !graph.node_set.contains(endpoint) {
					return Err(ValidationError::UnknownNode {
						from: input.source.clone(),
						to: input.target.clone(),
						node: endpoint.clone(),
					});
				}
			}
			if !input.weight.is_finite() || input.weight < 0.0 {
				return Err(ValidationError::InvalidWeight {
					from: input.source,
					to: input.target,
					weight: input.weight,
				});
			}

			let pair = (input.source.clone(), input.target.clone());
			if let Some(&idx) = pairs.get(&pair) {
				debug!("duplicate edge row {}-{}, keeping last weight", pair.0, pair.1);
				graph.edges[idx].weight = input.weight;
				continue;
			}

			let id = edge_id(&input.source, &input.target);
			if let Some(&clash) = graph.by_id.get(&id) {
				let other = &graph.edges[clash];
				return Err(ValidationError::EdgeIdCollision {
					id,
					first: format!("({}, {})", other.source, other.target),
					second: format!("({}, {})", input.source, input.target),
				});
			}

			let idx = graph.edges.len();
			graph.by_id.insert(id.clone(), idx);
			pairs.insert(pair, idx);
			graph.edges.push(Edge {
				id,
				source: input.source,
				target: input.target,
				weight: input.weight,
			});
		}

		for (idx, edge) in graph.edges.iter().enumerate() {
			let reversed = edge_id(&edge.target, &edge.source);
			if !graph.by_id.contains_key(&reversed) {
				graph.aliases.entry(reversed).or_insert(idx);
			}
		}

		Ok(graph)
	}

	/// Nodes in upload order.
	pub fn nodes(&self) -> &[NodeId] {
		&self.nodes
	}

	/// Edges in upload order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// True before the first successful upload.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Whether `node` is part of the graph.
	pub fn contains_node(&self, node: &str) -> bool {
		self.node_set.contains(node)
	}

	/// Exact lookup by edge id.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.by_id.get(id).map(|&idx| &self.edges[idx])
	}

	/// Looks an edge up by id, accepting the id of either orientation.
	pub fn resolve_edge(&self, id: &str) -> Option<&Edge> {
		self.by_id
			.get(id)
			.or_else(|| self.aliases.get(id))
			.map(|&idx| &self.edges[idx])
	}

	/// Every edge touching `node`, in edge order.
	pub fn neighbors_of(&self, node: &str) -> Vec<Neighbor> {
		let mut out = Vec::new();
		for edge in &self.edges {
			if edge.source == node {
				out.push(Neighbor {
					node: edge.target.clone(),
					edge: edge.id.clone(),
					direction: Direction::Outgoing,
				});
			} else if edge.target == node {
				out.push(Neighbor {
					node: edge.source.clone(),
					edge: edge.id.clone(),
					direction: Direction::Incoming,
				});
			}
		}
		out
	}

	/// Number of edges touching `node`, ignoring direction.
	pub fn degree(&self, node: &str) -> usize {
		self.edges
			.iter()
			.filter(|e| e.source == node || e.target == node)
			.count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(s: &str, t: &str, w: f64) -> EdgeInput {
		EdgeInput {
			source: s.into(),
			target: t.into(),
			weight: w,
		}
	}

	fn ids(list: &[&str]) -> Vec<NodeId> {
		list.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn loads_nodes_and_edges_in_order() {
		let g = Graph::load(ids(&["A", "B", "C"]), vec![row("A", "B", 2.0), row("B", "C", 3.0)])
			.unwrap();
		assert_eq!(g.nodes(), ids(&["A", "B", "C"]).as_slice());
		let edge_ids: Vec<_> = g.edges().iter().map(|e| e.id.as_str()).collect();
		assert_eq!(edge_ids, ["A-B", "B-C"]);
		assert_eq!(g.edge("B-C").unwrap().weight, 3.0);
	}

	#[test]
	fn rejects_empty_node_list() {
		assert_eq!(
			Graph::load(vec![], vec![]).unwrap_err(),
			ValidationError::EmptyGraph
		);
	}

	#[test]
	fn rejects_edges_to_unknown_nodes() {
		let err = Graph::load(ids(&["A"]), vec![row("A", "Z", 1.0)]).unwrap_err();
		assert!(matches!(err, ValidationError::UnknownNode { node, .. } if node == "Z"));
	}

	#[test]
	fn rejects_negative_and_non_finite_weights() {
		for w in [-1.0, f64::NAN, f64::INFINITY] {
			let err = Graph::load(ids(&["A", "B"]), vec![row("A", "B", w)]).unwrap_err();
			assert!(matches!(err, ValidationError::InvalidWeight { .. }));
		}
	}

	#[test]
	fn duplicate_rows_keep_last_weight_and_first_position() {
		let g = Graph::load(
			ids(&["A", "B", "C"]),
			vec![row("A", "B", 1.0), row("B", "C", 2.0), row("A", "B", 5.0)],
		)
		.unwrap();
		assert_eq!(g.edges().len(), 2);
		assert_eq!(g.edges()[0].id, "A-B");
		assert_eq!(g.edges()[0].weight, 5.0);
	}

	#[test]
	fn colliding_edge_ids_are_rejected() {
		let err = Graph::load(
			ids(&["A-B", "C", "A", "B-C"]),
			vec![row("A-B", "C", 1.0), row("A", "B-C", 1.0)],
		)
		.unwrap_err();
		assert!(matches!(err, ValidationError::EdgeIdCollision { id, .. } if id == "A-B-C"));
	}

	#[test]
	fn neighbors_report_direction() {
		let g = Graph::load(ids(&["A", "B", "C"]), vec![row("A", "B", 1.0), row("C", "A", 1.0)])
			.unwrap();
		let n = g.neighbors_of("A");
		assert_eq!(n.len(), 2);
		assert_eq!(n[0].node, "B");
		assert_eq!(n[0].direction, Direction::Outgoing);
		assert_eq!(n[1].node, "C");
		assert_eq!(n[1].edge, "C-A");
		assert_eq!(n[1].direction, Direction::Incoming);
	}

	#[test]
	fn resolves_reverse_orientation_only_without_a_real_edge() {
		let g = Graph::load(
			ids(&["A", "B", "C"]),
			vec![row("A", "B", 1.0), row("B", "C", 1.0), row("C", "B", 4.0)],
		)
		.unwrap();
		assert_eq!(g.resolve_edge("B-A").unwrap().id, "A-B");
		assert_eq!(g.resolve_edge("C-B").unwrap().weight, 4.0);
		assert!(g.resolve_edge("A-C").is_none());
		assert_eq!(g.degree("B"), 3);
	}
}
