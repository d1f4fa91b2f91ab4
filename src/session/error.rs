//! Error taxonomy of the session core. Every `Display` text is user-facing.

use thiserror::Error;

use super::results::RequestKey;

/// Problems with an uploaded graph or a user-supplied value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
	/// The upload listed no nodes.
	#[error("No nodes found in the uploaded file.")]
	EmptyGraph,

	/// An edge endpoint is missing from the node list.
	#[error("edge {from}-{to} references unknown node {node}")]
	UnknownNode {
		/// Tail as uploaded.
		from: String,
		/// Head as uploaded.
		to: String,
		/// The endpoint that is not a node.
		node: String,
	},

	/// Negative or non-finite weight.
	#[error("edge {from}-{to} has invalid weight {weight}")]
	InvalidWeight {
		/// Tail as uploaded.
		from: String,
		/// Head as uploaded.
		to: String,
		/// Offending weight.
		weight: f64,
	},

	/// Two distinct node pairs render to the same `s-t` id.
	#[error("edges {first} and {second} both map to edge id {id}")]
	EdgeIdCollision {
		/// The shared id.
		id: String,
		/// First pair, as `(s, t)`.
		first: String,
		/// Second pair, as `(s, t)`.
		second: String,
	},

	/// The upload collaborator answered with an `error` field.
	#[error("{0}")]
	Rejected(String),

	/// The upload body is not the expected JSON shape.
	#[error("malformed upload response: {0}")]
	Malformed(String),

	/// A color that is not `#rrggbb`.
	#[error("invalid color {0:?}, expected #rrggbb")]
	InvalidColor(String),
}

/// A selection the cascade refuses to apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
	/// Not a node of the current graph.
	#[error("node {0} is not part of the graph")]
	UnknownNode(String),

	/// Not among the candidates returned for the current source.
	#[error("node {0} is not connected to the selected source")]
	NotACandidate(String),

	/// Sink equals the source.
	#[error("node {0} is the source and cannot also be a sink")]
	SinkIsSource(String),

	/// Calculation requested before a source was chosen.
	#[error("Please select a source node.")]
	NoSource,

	/// Calculation requested with an empty sink set.
	#[error("Please select at least one sink node.")]
	NoSinks,
}

/// Everything a session transition can surface to the user.
///
/// None of these are fatal: the session stays usable after any of them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
	/// Upload or value validation failed; state is untouched.
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// Selection refused; selection is unchanged.
	#[error(transparent)]
	InvalidSelection(#[from] SelectionError),

	/// Every requested pair was already issued or is in flight.
	#[error("{}", duplicate_message(.pairs))]
	DuplicateRequest {
		/// The refused pairs, in sink order.
		pairs: Vec<RequestKey>,
	},

	/// The calculate collaborator failed or answered with unusable results.
	#[error("calculation failed: {0}")]
	Computation(String),

	/// No edge (or no result for an edge) with this id.
	#[error("edge {0} not found")]
	UnknownEdge(String),
}

fn duplicate_message(pairs: &[RequestKey]) -> String {
	let names: Vec<String> = pairs.iter().map(RequestKey::to_string).collect();
	match names.as_slice() {
		[one] => format!("Edge {one} has already been added."),
		_ => format!("Edges {} have already been added.", names.join(", ")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn duplicate_message_names_every_pair() {
		let single = SessionError::DuplicateRequest {
			pairs: vec![RequestKey::new("1", "2")],
		};
		assert_eq!(single.to_string(), "Edge 1-2 has already been added.");

		let many = SessionError::DuplicateRequest {
			pairs: vec![RequestKey::new("1", "2"), RequestKey::new("1", "3")],
		};
		assert_eq!(many.to_string(), "Edges 1-2, 1-3 have already been added.");
	}

	#[test]
	fn nested_errors_keep_their_message() {
		let err: SessionError = SelectionError::NoSinks.into();
		assert_eq!(err.to_string(), "Please select at least one sink node.");
	}
}
