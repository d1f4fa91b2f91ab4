//! Interactive session state: graph, selection, results and their visual projection.
//!
//! The UI never mutates these pieces directly. It feeds [`SessionEvent`]s to
//! [`Session::handle`] and acts on the returned [`SessionEffect`].

mod error;
mod export;
mod graph;
mod results;
mod selection;
mod visual;
mod wire;

use log::{info, warn};

use crate::config::VisualConfig;

pub use error::{SelectionError, SessionError, ValidationError};
pub use export::{
	FrameSource, IMAGE_FILENAME, ImageSnapshot, REPORT_FILENAME, REPORT_TITLE, Report, ReportRow,
	ReportSummary, snapshot_image, snapshot_report,
};
pub use graph::{Direction, Edge, EdgeId, EdgeInput, Graph, Neighbor, NodeId, edge_id};
pub use results::{
	BetweennessResult, CommittedResult, RemovalOutcome, RequestKey, RequestOutcome, ResultStore,
	SourceBucket, request_key,
};
pub use selection::{SelectionCascade, SelectionState};
pub use visual::{Emphasis, VisualEdgeAttributes, format_score, render};
pub use wire::{CalculateResponse, UploadResponse, WireEdge, WireNodeId, WireResult};

/// What the renderer reported a click on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickTarget {
	/// An edge, by id.
	Edge(EdgeId),
	/// A node, by id.
	Node(NodeId),
}

/// A calculation the caller must send to the calculate collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalculationRequest {
	/// Graph generation the request was issued against.
	pub generation: u64,
	/// Source of every pair in the batch.
	pub source: NodeId,
	/// Sinks that passed the duplicate guard.
	pub sinks: Vec<NodeId>,
	/// Pairs of the same batch refused by the duplicate guard.
	pub rejected: Vec<RequestKey>,
}

impl CalculationRequest {
	/// Message naming the pairs dropped from this batch, if any.
	pub fn rejection_notice(&self) -> Option<String> {
		if self.rejected.is_empty() {
			return None;
		}
		Some(
			SessionError::DuplicateRequest {
				pairs: self.rejected.clone(),
			}
			.to_string(),
		)
	}
}

/// Details shown for a clicked element.
#[derive(Clone, Debug, PartialEq)]
pub enum Inspection {
	/// A clicked edge.
	Edge {
		/// The edge as stored in the graph.
		edge: Edge,
		/// Formatted latest score, if highlighted.
		score: Option<String>,
	},
	/// A clicked node.
	Node {
		/// The node id.
		node: NodeId,
		/// Incident edges with their formatted scores.
		edges: Vec<(Edge, Option<String>)>,
	},
}

impl Inspection {
	/// Multi-line text shown to the user.
	pub fn message(&self) -> String {
		let score = |s: &Option<String>| s.clone().unwrap_or_else(|| "n/a".into());
		match self {
			Inspection::Edge { edge, score: s } => format!(
				"Edge {}-{}\nWeight: {}\nBetweenness Score: {}",
				edge.source,
				edge.target,
				edge.weight,
				score(s)
			),
			Inspection::Node { node, edges } => {
				let mut msg = format!("Node {node} is connected by the following edges:\n");
				for (edge, s) in edges {
					msg.push_str(&format!(
						"Edge {}-{}\nBetweenness Score: {}\n\n",
						edge.source,
						edge.target,
						score(s)
					));
				}
				msg
			}
		}
	}
}

/// Inputs to the session state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
	/// The upload collaborator answered.
	Uploaded(UploadResponse),
	/// A source node was picked.
	SourceChosen(NodeId),
	/// A sink checkbox was flipped.
	SinkToggled(NodeId),
	/// The calculate button was pressed.
	CalculateRequested,
	/// A dispatched calculation came back.
	CalculationFinished {
		/// The request as returned by `Dispatch`.
		request: CalculationRequest,
		/// What the collaborator answered.
		response: CalculateResponse,
	},
	/// Remove button of an edge's results.
	ResultRemoved(EdgeId),
	/// Color picker of a highlighted edge.
	EdgeColorChanged {
		/// Edge to recolor.
		edge: EdgeId,
		/// `#rrggbb`.
		color: String,
	},
	/// The renderer reported a click.
	Clicked(ClickTarget),
}

/// What a handled event asks the caller to do or show.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEffect {
	/// New graph loaded; selection and results were reset.
	GraphReplaced,
	/// Sink candidates for the new source.
	Candidates(Vec<NodeId>),
	/// Current selection after a sink toggle.
	Selection(SelectionState),
	/// Send this request to the calculate collaborator.
	Dispatch(CalculationRequest),
	/// Results stored.
	Committed {
		/// Number of results added.
		added: usize,
	},
	/// Completion for a graph that has since been replaced.
	Discarded,
	/// Results of an edge were dropped.
	Removed(RemovalOutcome),
	/// Edge color override stored.
	Recolored,
	/// Details for a clicked element.
	Inspected(Inspection),
}

/// All state of one uninterrupted interaction.
#[derive(Clone, Debug, Default)]
pub struct Session {
	graph: Graph,
	selection: SelectionCascade,
	results: ResultStore,
	visual: VisualConfig,
	generation: u64,
}

impl Session {
	/// An empty session using `visual` for rendering.
	pub fn new(visual: VisualConfig) -> Self {
		Self {
			visual,
			..Self::default()
		}
	}

	/// Applies one event. On error the session is left as it was, except that a failed
	/// calculation keeps its pairs blocked.
	pub fn handle(&mut self, event: SessionEvent) -> Result<SessionEffect, SessionError> {
		match event {
			SessionEvent::Uploaded(response) => {
				self.load(response)?;
				Ok(SessionEffect::GraphReplaced)
			}
			SessionEvent::SourceChosen(node) => {
				let candidates = self.selection.set_source(&self.graph, &node)?;
				Ok(SessionEffect::Candidates(candidates.to_vec()))
			}
			SessionEvent::SinkToggled(node) => {
				let state = self.selection.toggle_sink(&node)?;
				Ok(SessionEffect::Selection(state.clone()))
			}
			SessionEvent::CalculateRequested => self.begin_calculation().map(SessionEffect::Dispatch),
			SessionEvent::CalculationFinished { request, response } => {
				self.finish_calculation(request, response)
			}
			SessionEvent::ResultRemoved(edge) => {
				self.results.remove_result(&edge).map(SessionEffect::Removed)
			}
			SessionEvent::EdgeColorChanged { edge, color } => {
				if !is_hex_color(&color) {
					return Err(ValidationError::InvalidColor(color).into());
				}
				self.results.set_edge_color(&edge, color)?;
				Ok(SessionEffect::Recolored)
			}
			SessionEvent::Clicked(target) => self.inspect(&target).map(SessionEffect::Inspected),
		}
	}

	/// Replaces the graph and starts over. The current state is untouched on failure.
	fn load(&mut self, response: UploadResponse) -> Result<(), SessionError> {
		let (nodes, edges) = response.into_graph_input()?;
		let graph = Graph::load(nodes, edges)?;
		info!(
			"loaded graph with {} nodes and {} edges",
			graph.nodes().len(),
			graph.edges().len()
		);
		self.graph = graph;
		self.selection.reset();
		self.results = ResultStore::default();
		self.generation += 1;
		Ok(())
	}

	/// Runs the duplicate guard for every selected sink and batches the accepted ones.
	fn begin_calculation(&mut self) -> Result<CalculationRequest, SessionError> {
		let (source, sinks) = self.selection.request()?;
		let mut accepted = Vec::new();
		let mut rejected = Vec::new();
		for sink in sinks {
			match self.results.begin_request(&source, &sink) {
				RequestOutcome::Accepted => accepted.push(sink),
				RequestOutcome::Rejected(key) => rejected.push(key),
			}
		}
		if accepted.is_empty() {
			return Err(SessionError::DuplicateRequest { pairs: rejected });
		}
		Ok(CalculationRequest {
			generation: self.generation,
			source,
			sinks: accepted,
			rejected,
		})
	}

	fn finish_calculation(
		&mut self,
		request: CalculationRequest,
		response: CalculateResponse,
	) -> Result<SessionEffect, SessionError> {
		if request.generation != self.generation {
			warn!(
				"discarding results for {} from a replaced graph",
				request.source
			);
			return Ok(SessionEffect::Discarded);
		}

		let results = match self.validate_results(response) {
			Ok(results) => results,
			Err(err) => {
				for sink in &request.sinks {
					self.results.fail_request(&request.source, sink);
				}
				return Err(err);
			}
		};

		// A batch answers for all its sinks at once, so the results go in once and the
		// remaining pairs are only marked as issued.
		let added = results.len();
		let mut sinks = request.sinks.iter();
		if let Some(first) = sinks.next() {
			self.results.commit_results(&request.source, first, results);
		}
		for sink in sinks {
			self.results.commit_results(&request.source, sink, Vec::new());
		}
		Ok(SessionEffect::Committed { added })
	}

	/// Checks a calculate response against the current graph.
	fn validate_results(
		&self,
		response: CalculateResponse,
	) -> Result<Vec<BetweennessResult>, SessionError> {
		response
			.into_results()
			.map_err(SessionError::Computation)?
			.into_iter()
			.map(|r| {
				if !r.score.is_finite() || r.score < 0.0 {
					return Err(SessionError::Computation(format!(
						"invalid score {} for edge {}",
						r.score, r.edge
					)));
				}
				let edge = self.graph.resolve_edge(&r.edge).ok_or_else(|| {
					SessionError::Computation(format!("unknown edge {} in results", r.edge))
				})?;
				Ok(BetweennessResult {
					edge: edge.id.clone(),
					score: r.score,
				})
			})
			.collect()
	}

	fn inspect(&self, target: &ClickTarget) -> Result<Inspection, SessionError> {
		let label = |edge: &Edge| {
			self.results
				.latest_score(&edge.id)
				.map(|s| format_score(s, self.visual.score_precision))
		};
		match target {
			ClickTarget::Edge(id) => {
				let edge = self
					.graph
					.edge(id)
					.ok_or_else(|| SessionError::UnknownEdge(id.clone()))?;
				Ok(Inspection::Edge {
					edge: edge.clone(),
					score: label(edge),
				})
			}
			ClickTarget::Node(node) => {
				if !self.graph.contains_node(node) {
					return Err(SelectionError::UnknownNode(node.clone()).into());
				}
				let edges = self
					.graph
					.neighbors_of(node)
					.iter()
					.filter_map(|n| self.graph.edge(&n.edge))
					.map(|e| (e.clone(), label(e)))
					.collect();
				Ok(Inspection::Node {
					node: node.clone(),
					edges,
				})
			}
		}
	}

	/// Current rendered attributes of every edge.
	pub fn visuals(&self) -> Vec<VisualEdgeAttributes> {
		render(&self.graph, &self.results, &self.visual)
	}

	/// Snapshot for the report export.
	pub fn report(&self) -> Report {
		snapshot_report(&self.graph, &self.results, &self.visual)
	}

	/// Current graph.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// Current source and sinks.
	pub fn selection(&self) -> &SelectionCascade {
		&self.selection
	}

	/// Committed results and the duplicate guard.
	pub fn results(&self) -> &ResultStore {
		&self.results
	}

	/// Visual encoding in use.
	pub fn visual_config(&self) -> &VisualConfig {
		&self.visual
	}

	/// Number of successful uploads so far.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Source set and at least one sink chosen.
	pub fn ready_to_compute(&self) -> bool {
		self.selection.ready_to_compute()
	}
}

fn is_hex_color(color: &str) -> bool {
	color.len() == 7
		&& color.starts_with('#')
		&& color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
