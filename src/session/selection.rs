//! Source/sink selection cascade.

use std::collections::{BTreeSet, HashSet};

use log::debug;

use super::error::SelectionError;
use super::graph::{Graph, NodeId};

/// The chosen source and sinks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
	/// At most one source.
	pub source: Option<NodeId>,
	/// Always a subset of the current candidates.
	pub sinks: BTreeSet<NodeId>,
}

/// Keeps the selection widgets consistent with the graph.
#[derive(Clone, Debug, Default)]
pub struct SelectionCascade {
	state: SelectionState,
	candidates: Vec<NodeId>,
}

impl SelectionCascade {
	/// Records `node` as source, clears the sinks and returns the new sink candidates:
	/// every node sharing an edge with `node` in either direction, without duplicates.
	pub fn set_source(&mut self, graph: &Graph, node: &str) -> Result<&[NodeId], SelectionError> {
		if !graph.contains_node(node) {
			return Err(SelectionError::UnknownNode(node.to_string()));
		}

		let mut seen = HashSet::new();
		self.candidates = graph
			.neighbors_of(node)
			.into_iter()
			.map(|n| n.node)
			.filter(|n| n != node && seen.insert(n.clone()))
			.collect();
		self.state = SelectionState {
			source: Some(node.to_string()),
			sinks: BTreeSet::new(),
		};
		debug!("source {node} has {} sink candidates", self.candidates.len());
		Ok(&self.candidates)
	}

	/// Adds `node` to the sinks, or removes it if already chosen.
	pub fn toggle_sink(&mut self, node: &str) -> Result<&SelectionState, SelectionError> {
		if self.state.source.as_deref() == Some(node) {
			return Err(SelectionError::SinkIsSource(node.to_string()));
		}
		if !self.candidates.iter().any(|c| c == node) {
			return Err(SelectionError::NotACandidate(node.to_string()));
		}
		if !self.state.sinks.remove(node) {
			self.state.sinks.insert(node.to_string());
		}
		Ok(&self.state)
	}

	/// Source set and at least one sink chosen.
	pub fn ready_to_compute(&self) -> bool {
		self.state.source.is_some() && !self.state.sinks.is_empty()
	}

	/// The selection as a `(source, sinks)` request, if complete.
	pub fn request(&self) -> Result<(NodeId, Vec<NodeId>), SelectionError> {
		let source = self.state.source.clone().ok_or(SelectionError::NoSource)?;
		if self.state.sinks.is_empty() {
			return Err(SelectionError::NoSinks);
		}
		Ok((source, self.state.sinks.iter().cloned().collect()))
	}

	/// Candidates returned by the last [`set_source`](Self::set_source).
	pub fn candidates(&self) -> &[NodeId] {
		&self.candidates
	}

	/// Current selection.
	pub fn state(&self) -> &SelectionState {
		&self.state
	}

	/// Forgets source, sinks and candidates.
	pub fn reset(&mut self) {
		*self = Self::default();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::graph::EdgeInput;

	fn graph(edges: &[(&str, &str)]) -> Graph {
		let mut nodes: Vec<NodeId> = Vec::new();
		for (s, t) in edges {
			for n in [s, t] {
				if !nodes.iter().any(|x| x.as_str() == *n) {
					nodes.push(n.to_string());
				}
			}
		}
		let rows = edges
			.iter()
			.map(|(s, t)| EdgeInput {
				source: s.to_string(),
				target: t.to_string(),
				weight: 1.0,
			})
			.collect();
		Graph::load(nodes, rows).unwrap()
	}

	#[test]
	fn candidates_are_undirected_and_deduplicated() {
		let g = graph(&[("A", "B"), ("B", "A"), ("C", "A"), ("A", "A"), ("B", "C")]);
		let mut cascade = SelectionCascade::default();
		let candidates = cascade.set_source(&g, "A").unwrap().to_vec();
		assert_eq!(candidates, ["B", "C"]);
	}

	#[test]
	fn changing_source_clears_sinks() {
		let g = graph(&[("A", "B"), ("B", "C")]);
		let mut cascade = SelectionCascade::default();
		cascade.set_source(&g, "A").unwrap();
		cascade.toggle_sink("B").unwrap();
		assert!(cascade.ready_to_compute());

		cascade.set_source(&g, "B").unwrap();
		assert!(cascade.state().sinks.is_empty());
		assert!(!cascade.ready_to_compute());
	}

	#[test]
	fn toggle_adds_then_removes() {
		let g = graph(&[("A", "B"), ("A", "C")]);
		let mut cascade = SelectionCascade::default();
		cascade.set_source(&g, "A").unwrap();
		cascade.toggle_sink("B").unwrap();
		cascade.toggle_sink("C").unwrap();
		assert_eq!(cascade.state().sinks.len(), 2);
		let state = cascade.toggle_sink("B").unwrap();
		assert_eq!(state.sinks.iter().collect::<Vec<_>>(), ["C"]);
	}

	#[test]
	fn rejects_sinks_outside_candidates() {
		let g = graph(&[("A", "B"), ("B", "C")]);
		let mut cascade = SelectionCascade::default();
		cascade.set_source(&g, "A").unwrap();
		assert_eq!(
			cascade.toggle_sink("C").unwrap_err(),
			SelectionError::NotACandidate("C".into())
		);
		assert_eq!(
			cascade.toggle_sink("A").unwrap_err(),
			SelectionError::SinkIsSource("A".into())
		);
		assert!(cascade.state().sinks.is_empty());
	}

	#[test]
	fn unknown_source_leaves_selection_alone() {
		let g = graph(&[("A", "B")]);
		let mut cascade = SelectionCascade::default();
		cascade.set_source(&g, "A").unwrap();
		assert!(cascade.set_source(&g, "Q").is_err());
		assert_eq!(cascade.state().source.as_deref(), Some("A"));
	}

	#[test]
	fn request_requires_source_and_sinks() {
		let g = graph(&[("A", "B")]);
		let mut cascade = SelectionCascade::default();
		assert_eq!(cascade.request().unwrap_err(), SelectionError::NoSource);
		cascade.set_source(&g, "A").unwrap();
		assert_eq!(cascade.request().unwrap_err(), SelectionError::NoSinks);
		cascade.toggle_sink("B").unwrap();
		assert_eq!(cascade.request().unwrap(), ("A".to_string(), vec!["B".to_string()]));
	}
}
