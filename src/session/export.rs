//! Read-only snapshots of the session for reports and images.

use std::fmt::Write as _;

use crate::config::VisualConfig;

use super::graph::{EdgeId, Graph, NodeId};
use super::results::ResultStore;
use super::visual::format_score;

/// Heading and `<title>` of the report document.
pub const REPORT_TITLE: &str = "Current Flow Betweenness Report";
/// Download name of the report.
pub const REPORT_FILENAME: &str = "current_flow_betweenness_report.html";
/// Download name of the graph snapshot.
pub const IMAGE_FILENAME: &str = "network_visualization.png";

/// One committed result as listed in the report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
	/// Source node of the request that produced it.
	pub source: NodeId,
	/// Edge id.
	pub edge: EdgeId,
	/// Betweenness score.
	pub score: f64,
	/// Edge weight from the graph.
	pub weight: f64,
	/// Color currently used for the edge.
	pub color: String,
}

/// Headline figures printed under the table.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportSummary {
	/// Highest committed score and its edge.
	pub highest: Option<(EdgeId, f64)>,
	/// Node with the most incident edges, first in node order on ties.
	pub most_connected: Option<(NodeId, usize)>,
}

/// Snapshot of every committed result. Building it never mutates the session.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
	/// Grouped by source in first-commit order, then in commit order.
	pub rows: Vec<ReportRow>,
	/// Highest score and most connected node.
	pub summary: ReportSummary,
	/// Decimal places for scores.
	pub precision: usize,
}

/// Lists every committed result grouped by source, in commit order.
pub fn snapshot_report(graph: &Graph, store: &ResultStore, config: &VisualConfig) -> Report {
	let mut rows = Vec::new();
	for bucket in store.buckets() {
		for result in &bucket.results {
			rows.push(ReportRow {
				source: bucket.source.clone(),
				edge: result.edge.clone(),
				score: result.score,
				weight: graph.edge(&result.edge).map_or(f64::NAN, |e| e.weight),
				color: store
					.edge_color(&result.edge)
					.unwrap_or(config.highlight_color.as_str())
					.to_string(),
			});
		}
	}

	let highest = rows
		.iter()
		.fold(None::<&ReportRow>, |best, row| match best {
			Some(b) if b.score >= row.score => Some(b),
			_ => Some(row),
		})
		.map(|row| (row.edge.clone(), row.score));

	let mut most_connected: Option<(NodeId, usize)> = None;
	for node in graph.nodes() {
		let degree = graph.degree(node);
		if most_connected.as_ref().is_none_or(|(_, best)| degree > *best) {
			most_connected = Some((node.clone(), degree));
		}
	}

	Report {
		rows,
		summary: ReportSummary {
			highest,
			most_connected,
		},
		precision: config.score_precision,
	}
}

impl Report {
	/// True when no results are committed.
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Renders the report as a standalone HTML document.
	pub fn to_html(&self) -> String {
		let mut html = String::new();
		html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
		let _ = writeln!(html, "<title>{REPORT_TITLE}</title></head>");
		html.push_str("<body style=\"padding: 20px; font-family: Arial, sans-serif;\">\n");
		let _ = writeln!(
			html,
			"<h2 style=\"text-align: center; color: #333;\">{REPORT_TITLE}</h2>"
		);
		html.push_str("<table style=\"width: 100%; border-collapse: collapse;\">\n");
		html.push_str(
			"<tr style=\"background-color: #f4f4f4;\"><th>Source</th><th>Edge</th>\
			 <th>Betweenness Score</th><th>Weight</th><th>Color</th></tr>\n",
		);
		let mut current: Option<&str> = None;
		for row in &self.rows {
			let source = if current == Some(row.source.as_str()) {
				""
			} else {
				current = Some(row.source.as_str());
				row.source.as_str()
			};
			let _ = writeln!(
				html,
				"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
				 <td><div style=\"width: 20px; height: 20px; background-color: {};\"></div></td></tr>",
				escape(source),
				escape(&row.edge),
				format_score(row.score, self.precision),
				row.weight,
				escape(&row.color),
			);
		}
		html.push_str("</table>\n");

		if let Some((edge, score)) = &self.summary.highest {
			let _ = writeln!(
				html,
				"<p>Highest Betweenness Score: {} ({})</p>",
				format_score(*score, self.precision),
				escape(edge)
			);
		}
		if let Some((node, degree)) = &self.summary.most_connected {
			let _ = writeln!(
				html,
				"<p>Most Connected Node: {} ({degree} edges)</p>",
				escape(node)
			);
		}
		html.push_str("</body></html>\n");
		html
	}
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			_ => out.push(c),
		}
	}
	out
}

/// A PNG frame captured from the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageSnapshot {
	/// `data:image/png;base64,...`
	pub data_url: String,
}

/// Anything that can hand out its current rendered frame.
pub trait FrameSource {
	/// Why no frame could be produced.
	type Error;

	/// The frame as a data URL.
	fn current_frame(&self) -> Result<String, Self::Error>;
}

/// Captures the renderer's current frame without touching session state.
pub fn snapshot_image<F: FrameSource>(source: &F) -> Result<ImageSnapshot, F::Error> {
	source
		.current_frame()
		.map(|data_url| ImageSnapshot { data_url })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::graph::EdgeInput;
	use crate::session::results::BetweennessResult;

	fn graph() -> Graph {
		let rows = [("A", "B", 2.0), ("B", "C", 3.0), ("B", "D", 1.0)]
			.into_iter()
			.map(|(s, t, w)| EdgeInput {
				source: s.into(),
				target: t.into(),
				weight: w,
			})
			.collect();
		Graph::load(vec!["A".into(), "B".into(), "C".into(), "D".into()], rows).unwrap()
	}

	fn result(edge: &str, score: f64) -> BetweennessResult {
		BetweennessResult {
			edge: edge.into(),
			score,
		}
	}

	#[test]
	fn rows_follow_bucket_and_commit_order() {
		let g = graph();
		let mut store = ResultStore::default();
		store.commit_results("B", "C", vec![result("B-C", 0.3)]);
		store.commit_results("A", "B", vec![result("A-B", 0.5)]);
		store.commit_results("B", "D", vec![result("B-D", 0.1)]);
		store.set_edge_color("B-D", "#0000ff".into()).unwrap();

		let report = snapshot_report(&g, &store, &VisualConfig::default());
		let order: Vec<_> = report
			.rows
			.iter()
			.map(|r| (r.source.as_str(), r.edge.as_str()))
			.collect();
		assert_eq!(order, [("B", "B-C"), ("B", "B-D"), ("A", "A-B")]);
		assert_eq!(report.rows[2].weight, 2.0);
		assert_eq!(report.rows[0].color, "#ff0000");
		assert_eq!(report.rows[1].color, "#0000ff");
	}

	#[test]
	fn summary_picks_highest_score_and_busiest_node() {
		let g = graph();
		let mut store = ResultStore::default();
		store.commit_results("A", "B", vec![result("A-B", 0.5), result("B-C", 0.7)]);
		let report = snapshot_report(&g, &store, &VisualConfig::default());
		assert_eq!(report.summary.highest, Some(("B-C".to_string(), 0.7)));
		assert_eq!(report.summary.most_connected, Some(("B".to_string(), 3)));
	}

	#[test]
	fn report_without_results_keeps_header_and_summary() {
		let report = snapshot_report(&graph(), &ResultStore::default(), &VisualConfig::default());
		assert!(report.is_empty());
		assert_eq!(report.summary.highest, None);

		let html = report.to_html();
		assert!(html.contains(REPORT_TITLE));
		assert!(html.contains("<th>Edge</th>"));
		assert!(html.contains("Most Connected Node: B (3 edges)"));
		assert!(!html.contains("Highest Betweenness Score"));
	}

	#[test]
	fn snapshot_does_not_mutate_the_store() {
		let g = graph();
		let mut store = ResultStore::default();
		store.commit_results("A", "B", vec![result("A-B", 0.5)]);
		let before = store.buckets().to_vec();
		let _ = snapshot_report(&g, &store, &VisualConfig::default());
		assert_eq!(store.buckets(), before.as_slice());
	}

	#[test]
	fn html_lists_rows_and_escapes_ids() {
		let nodes = vec!["<x>".to_string(), "y".to_string()];
		let rows = vec![EdgeInput {
			source: "<x>".into(),
			target: "y".into(),
			weight: 1.5,
		}];
		let g = Graph::load(nodes, rows).unwrap();
		let mut store = ResultStore::default();
		store.commit_results("<x>", "y", vec![result("<x>-y", 0.25)]);

		let html = snapshot_report(&g, &store, &VisualConfig::default()).to_html();
		assert!(html.contains(REPORT_TITLE));
		assert!(html.contains("&lt;x&gt;-y"));
		assert!(html.contains("0.2500"));
		assert!(html.contains("<td>1.5</td>"));
		assert!(!html.contains("<x>"));
	}

	struct StaticFrame(&'static str);

	impl FrameSource for StaticFrame {
		type Error = ();

		fn current_frame(&self) -> Result<String, ()> {
			Ok(self.0.to_string())
		}
	}

	#[test]
	fn image_snapshot_wraps_the_frame() {
		let snap = snapshot_image(&StaticFrame("data:image/png;base64,AAAA")).unwrap();
		assert_eq!(snap.data_url, "data:image/png;base64,AAAA");
	}
}
