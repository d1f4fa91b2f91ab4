use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::GraphData;
use crate::session::{ClickTarget, EdgeId, Emphasis, NodeId, VisualEdgeAttributes};

pub const NODE_RADIUS: f64 = 8.0;
pub const HIT_RADIUS: f64 = 12.0;
pub const EDGE_HIT_DISTANCE: f64 = 5.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Zoom step of the +/- buttons.
pub const ZOOM_STEP: f64 = 1.2;
/// Pointer travel (screen px) below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: NodeId,
	pub label: Option<String>,
	pub color: String,
}

/// Style of one edge as last pushed through [`ForceGraphState::apply_visuals`].
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: String,
	pub width: f64,
	pub label: Option<String>,
	pub tooltip: String,
	pub highlighted: bool,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			color: "#848484".into(),
			width: 1.0,
			label: None,
			tooltip: String::new(),
			highlighted: false,
		}
	}
}

#[derive(Clone, Debug)]
pub struct EdgeSlot {
	pub id: EdgeId,
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub style: EdgeStyle,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub edge: Option<usize>,
	pub pointer: (f64, f64),
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub press: Option<(f64, f64)>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	edges: Vec<EdgeSlot>,
	edge_index: HashMap<EdgeId, usize>,
}

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut id_to_idx = HashMap::new();
		let mut edges = Vec::new();
		let mut edge_index = HashMap::new();

		for (i, node) in data.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
			let (x, y) = (
				(150.0 * angle.cos()) as f32,
				(150.0 * angle.sin()) as f32,
			);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: node.color.clone(),
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		for link in &data.links {
			if let (Some(&src), Some(&tgt)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				// Self-loops have no length to draw and only destabilise the layout.
				if src != tgt {
					graph.add_edge(src, tgt, EdgeData::default());
				}
				edge_index.insert(link.id.clone(), edges.len());
				edges.push(EdgeSlot {
					id: link.id.clone(),
					source: src,
					target: tgt,
					style: EdgeStyle::default(),
				});
			}
		}

		Self {
			graph,
			edges,
			edge_index,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			press: None,
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
		}
	}

	/// Attribute update keyed by edge id. Unknown ids are ignored.
	pub fn apply_visuals(&mut self, visuals: &[VisualEdgeAttributes]) {
		for attrs in visuals {
			if let Some(&i) = self.edge_index.get(&attrs.edge) {
				self.edges[i].style = EdgeStyle {
					color: attrs.color.clone(),
					width: attrs.width,
					label: attrs.label.clone(),
					tooltip: attrs.tooltip.clone(),
					highlighted: attrs.emphasis == Emphasis::Highlighted,
				};
			}
		}
	}

	pub fn edges(&self) -> &[EdgeSlot] {
		&self.edges
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	/// Nearest edge within [`EDGE_HIT_DISTANCE`] screen pixels.
	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let positions = self.node_positions();
		let limit = EDGE_HIT_DISTANCE / self.transform.k;
		let mut best: Option<(usize, f64)> = None;
		for (i, slot) in self.edges.iter().enumerate() {
			let (Some(&a), Some(&b)) = (positions.get(&slot.source), positions.get(&slot.target))
			else {
				continue;
			};
			let d = segment_distance((gx, gy), a, b);
			if d < limit && best.is_none_or(|(_, bd)| d < bd) {
				best = Some((i, d));
			}
		}
		best.map(|(i, _)| i)
	}

	/// What a click at screen position `(sx, sy)` landed on. Nodes win over edges.
	pub fn hit_test(&self, sx: f64, sy: f64) -> Option<ClickTarget> {
		if let Some(idx) = self.node_at_position(sx, sy) {
			let mut id = None;
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					id = Some(node.data.user_data.id.clone());
				}
			});
			return id.map(ClickTarget::Node);
		}
		self.edge_at_position(sx, sy)
			.map(|i| ClickTarget::Edge(self.edges[i].id.clone()))
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for slot in &self.edges {
				if slot.source == idx {
					self.hover.neighbors.insert(slot.target);
				} else if slot.target == idx {
					self.hover.neighbors.insert(slot.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Scales the view by `factor` keeping screen point `(x, y)` fixed.
	pub fn zoom_about(&mut self, factor: f64, x: f64, y: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::VisualConfig;
	use crate::session::{EdgeInput, Graph};

	fn state() -> ForceGraphState {
		let graph = Graph::load(
			vec!["A".into(), "B".into()],
			vec![EdgeInput {
				source: "A".into(),
				target: "B".into(),
				weight: 1.0,
			}],
		)
		.unwrap();
		ForceGraphState::new(&GraphData::from_graph(&graph, &VisualConfig::default()), 400.0, 300.0)
	}

	#[test]
	fn segment_distance_clamps_to_endpoints() {
		assert_eq!(segment_distance((0.0, 1.0), (0.0, 0.0), (2.0, 0.0)), 1.0);
		assert_eq!(segment_distance((3.0, 0.0), (0.0, 0.0), (2.0, 0.0)), 1.0);
		assert_eq!(segment_distance((1.0, 1.0), (0.0, 0.0), (0.0, 0.0)), 2f64.sqrt());
	}

	#[test]
	fn zoom_keeps_the_anchor_point_and_clamps() {
		let mut s = state();
		let before = s.screen_to_graph(100.0, 50.0);
		s.zoom_about(ZOOM_STEP, 100.0, 50.0);
		let after = s.screen_to_graph(100.0, 50.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
		assert!((s.transform.k - ZOOM_STEP).abs() < 1e-12);

		for _ in 0..50 {
			s.zoom_about(1.0 / ZOOM_STEP, 0.0, 0.0);
		}
		assert_eq!(s.transform.k, MIN_ZOOM);
	}

	#[test]
	fn visuals_update_by_edge_id() {
		let mut s = state();
		s.apply_visuals(&[
			VisualEdgeAttributes {
				edge: "A-B".into(),
				emphasis: Emphasis::Highlighted,
				color: "#ff0000".into(),
				width: 4.0,
				label: Some("0.5000".into()),
				tooltip: "Betweenness: 0.5000".into(),
			},
			VisualEdgeAttributes {
				edge: "X-Y".into(),
				emphasis: Emphasis::Neutral,
				color: "#848484".into(),
				width: 1.0,
				label: None,
				tooltip: String::new(),
			},
		]);
		assert_eq!(s.edges().len(), 1);
		assert!(s.edges()[0].style.highlighted);
		assert_eq!(s.edges()[0].style.width, 4.0);
	}

	#[test]
	fn clicking_on_a_node_reports_its_id() {
		let s = state();
		let positions = s.node_positions();
		let a = positions[&s.edges()[0].source];
		let (sx, sy) = (a.0 + s.transform.x, a.1 + s.transform.y);
		assert_eq!(s.hit_test(sx, sy), Some(ClickTarget::Node("A".into())));
	}

	#[test]
	fn clicking_between_nodes_reports_the_edge() {
		let s = state();
		let positions = s.node_positions();
		let (a, b) = (positions[&s.edges()[0].source], positions[&s.edges()[0].target]);
		let mid = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
		let (sx, sy) = (mid.0 + s.transform.x, mid.1 + s.transform.y);
		assert_eq!(s.hit_test(sx, sy), Some(ClickTarget::Edge("A-B".into())));
	}
}
