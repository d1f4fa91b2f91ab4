//! JSON payloads exchanged with the upload and calculate collaborators.

use serde::Deserialize;

use super::error::ValidationError;
use super::graph::{EdgeInput, NodeId};
use super::results::BetweennessResult;

/// Node ids arrive as JSON strings or numbers.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireNodeId {
	/// `"a"`
	Text(String),
	/// `1`, normalised through its JSON text.
	Number(serde_json::Number),
}

impl From<WireNodeId> for NodeId {
	fn from(id: WireNodeId) -> Self {
		match id {
			WireNodeId::Text(text) => text,
			WireNodeId::Number(number) => number.to_string(),
		}
	}
}

/// One `{source, target, weight}` row of an upload.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WireEdge {
	/// Tail of the edge.
	pub source: WireNodeId,
	/// Head of the edge.
	pub target: WireNodeId,
	/// Non-negative edge weight.
	pub weight: f64,
}

/// Body returned by the upload collaborator.
///
/// Either `error` or both `nodes` and `edges` must be present.
#[derive(Clone, Debug, Deserialize, PartialEq, Default)]
pub struct UploadResponse {
	/// Node ids in upload order.
	#[serde(default)]
	pub nodes: Option<Vec<WireNodeId>>,
	/// Directed weighted edges.
	#[serde(default)]
	pub edges: Option<Vec<WireEdge>>,
	/// Collaborator-side failure, shown verbatim.
	#[serde(default)]
	pub error: Option<String>,
}

impl UploadResponse {
	/// Parses an upload body. Only JSON shape is checked here.
	pub fn parse(text: &str) -> Result<Self, ValidationError> {
		serde_json::from_str(text).map_err(|e| ValidationError::Malformed(e.to_string()))
	}

	/// Splits the payload into graph input, surfacing a collaborator error first.
	pub fn into_graph_input(self) -> Result<(Vec<NodeId>, Vec<EdgeInput>), ValidationError> {
		if let Some(error) = self.error {
			return Err(ValidationError::Rejected(error));
		}
		let (Some(nodes), Some(edges)) = (self.nodes, self.edges) else {
			return Err(ValidationError::Malformed(
				"upload response has no `nodes` and `edges`".into(),
			));
		};
		let nodes = nodes.into_iter().map(NodeId::from).collect();
		let edges = edges
			.into_iter()
			.map(|e| EdgeInput {
				source: e.source.into(),
				target: e.target.into(),
				weight: e.weight,
			})
			.collect();
		Ok((nodes, edges))
	}
}

/// One scored edge as sent by the calculate collaborator.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WireResult {
	/// Edge id in either orientation.
	pub edge: String,
	/// Betweenness score.
	pub score: f64,
}

/// Body returned by the calculate collaborator.
///
/// A body with neither `results` nor `error` is a failed calculation, not an empty one.
#[derive(Clone, Debug, Deserialize, PartialEq, Default)]
pub struct CalculateResponse {
	/// Scored edges, possibly empty.
	#[serde(default)]
	pub results: Option<Vec<WireResult>>,
	/// Collaborator-side failure.
	#[serde(default)]
	pub error: Option<String>,
}

impl CalculateResponse {
	/// Parses a calculate body.
	pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// A successful response carrying `results`.
	pub fn ok(results: Vec<BetweennessResult>) -> Self {
		Self {
			results: Some(
				results
					.into_iter()
					.map(|r| WireResult {
						edge: r.edge,
						score: r.score,
					})
					.collect(),
			),
			error: None,
		}
	}

	/// A failed response, as produced for transport errors.
	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			results: None,
			error: Some(error.into()),
		}
	}

	/// The results, or why there are none.
	pub fn into_results(self) -> Result<Vec<WireResult>, String> {
		match (self.error, self.results) {
			(Some(error), _) => Err(error),
			(None, Some(results)) => Ok(results),
			(None, None) => Err("response has neither `results` nor `error`".into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_and_text_ids_become_strings() {
		let resp = UploadResponse::parse(
			r#"{"nodes": [1, "b"], "edges": [{"source": 1, "target": "b", "weight": 2.5}]}"#,
		)
		.unwrap();
		let (nodes, edges) = resp.into_graph_input().unwrap();
		assert_eq!(nodes, ["1", "b"]);
		assert_eq!(edges[0].source, "1");
		assert_eq!(edges[0].weight, 2.5);
	}

	#[test]
	fn error_field_wins_over_payload() {
		let resp = UploadResponse::parse(r#"{"error": "CSV file must have 'source', 'target', and 'weight' columns."}"#)
			.unwrap();
		assert!(matches!(resp.into_graph_input(), Err(ValidationError::Rejected(_))));
	}

	#[test]
	fn non_numeric_weight_is_malformed() {
		let err = UploadResponse::parse(
			r#"{"nodes": [1, 2], "edges": [{"source": 1, "target": 2, "weight": "heavy"}]}"#,
		)
		.unwrap_err();
		assert!(matches!(err, ValidationError::Malformed(_)));
	}

	#[test]
	fn calculate_response_parses_results() {
		let resp =
			CalculateResponse::parse(r#"{"results": [{"edge": "1-2", "score": 0.25}]}"#).unwrap();
		assert_eq!(resp.error, None);
		assert_eq!(resp.into_results().unwrap()[0].edge, "1-2");
		assert!(CalculateResponse::parse("not json").is_err());
	}

	#[test]
	fn upload_without_edges_is_malformed() {
		let resp = UploadResponse::parse(r#"{"nodes": [1, 2]}"#).unwrap();
		assert!(matches!(resp.into_graph_input(), Err(ValidationError::Malformed(_))));
	}

	#[test]
	fn calculate_body_without_results_or_error_is_a_failure() {
		let resp = CalculateResponse::parse(r#"{"message": "Internal Server Error"}"#).unwrap();
		assert!(resp.into_results().is_err());

		let empty = CalculateResponse::parse(r#"{"results": []}"#).unwrap();
		assert_eq!(empty.into_results(), Ok(Vec::new()));
	}
}
