//! Accumulated betweenness results and the duplicate-request guard.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::{info, warn};

use super::error::SessionError;
use super::graph::{EdgeId, NodeId};

/// Ordered `(source, sink)` pair identifying one calculation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestKey {
	/// Source node.
	pub source: NodeId,
	/// Sink node.
	pub sink: NodeId,
}

impl RequestKey {
	/// Key for `source -> sink`.
	pub fn new(source: impl Into<NodeId>, sink: impl Into<NodeId>) -> Self {
		Self {
			source: source.into(),
			sink: sink.into(),
		}
	}
}

impl fmt::Display for RequestKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.source, self.sink)
	}
}

/// Canonical dedup key of a `(source, sink)` request.
pub fn request_key(source: &str, sink: &str) -> String {
	RequestKey::new(source, sink).to_string()
}

/// Score of one edge for one calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct BetweennessResult {
	/// Graph edge id.
	pub edge: EdgeId,
	/// Finite, non-negative.
	pub score: f64,
}

/// A stored result, stamped with its position in the global commit order.
#[derive(Clone, Debug, PartialEq)]
pub struct CommittedResult {
	/// Graph edge id.
	pub edge: EdgeId,
	/// Score as committed.
	pub score: f64,
	/// Higher means committed later.
	pub seq: u64,
}

/// All results committed for one source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceBucket {
	/// Source node.
	pub source: NodeId,
	/// In commit order.
	pub results: Vec<CommittedResult>,
}

/// Answer of the duplicate guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
	/// The pair is now reserved.
	Accepted,
	/// The pair was issued, is in flight, or failed before.
	Rejected(RequestKey),
}

/// What [`ResultStore::remove_result`] dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalOutcome {
	/// The edge whose results were removed.
	pub edge: EdgeId,
	/// Number of results removed across all sources.
	pub removed: usize,
	/// Sources left without results, and therefore dropped.
	pub dropped_sources: Vec<NodeId>,
}

/// Results keyed by source, in first-commit order.
#[derive(Clone, Debug, Default)]
pub struct ResultStore {
	buckets: Vec<SourceBucket>,
	issued: BTreeSet<RequestKey>,
	in_flight: BTreeSet<RequestKey>,
	failed: BTreeSet<RequestKey>,
	edge_colors: HashMap<EdgeId, String>,
	next_seq: u64,
}

impl ResultStore {
	/// Reserves `(source, sink)` unless it was already requested this session.
	///
	/// Pairs stay reserved after removal of their results and after a failed calculation.
	pub fn begin_request(&mut self, source: &str, sink: &str) -> RequestOutcome {
		let key = RequestKey::new(source, sink);
		if self.is_guarded(&key) {
			warn!("duplicate request {key} rejected");
			return RequestOutcome::Rejected(key);
		}
		self.in_flight.insert(key);
		RequestOutcome::Accepted
	}

	/// Whether a new request for `key` would be refused.
	pub fn is_guarded(&self, key: &RequestKey) -> bool {
		self.issued.contains(key) || self.in_flight.contains(key) || self.failed.contains(key)
	}

	/// Appends `results` to the source's bucket and marks the pair as issued.
	pub fn commit_results(&mut self, source: &str, sink: &str, results: Vec<BetweennessResult>) {
		let key = RequestKey::new(source, sink);
		self.in_flight.remove(&key);
		let count = results.len();

		if !results.is_empty() {
			let idx = match self.buckets.iter().position(|b| b.source == source) {
				Some(idx) => idx,
				None => {
					self.buckets.push(SourceBucket {
						source: source.to_string(),
						results: Vec::new(),
					});
					self.buckets.len() - 1
				}
			};
			for result in results {
				let seq = self.next_seq;
				self.next_seq += 1;
				self.buckets[idx].results.push(CommittedResult {
					edge: result.edge,
					score: result.score,
					seq,
				});
			}
		}

		info!("committed {count} results for {key}");
		self.issued.insert(key);
	}

	/// Marks an in-flight pair as failed. It stays blocked.
	pub fn fail_request(&mut self, source: &str, sink: &str) {
		let key = RequestKey::new(source, sink);
		self.in_flight.remove(&key);
		self.failed.insert(key);
	}

	/// Drops every result for `edge` across all sources. Issued pairs are kept.
	pub fn remove_result(&mut self, edge: &str) -> Result<RemovalOutcome, SessionError> {
		let mut removed = 0;
		let mut dropped_sources = Vec::new();
		self.buckets.retain_mut(|bucket| {
			let before = bucket.results.len();
			bucket.results.retain(|r| r.edge != edge);
			removed += before - bucket.results.len();
			if bucket.results.is_empty() {
				dropped_sources.push(bucket.source.clone());
				false
			} else {
				true
			}
		});

		if removed == 0 {
			return Err(SessionError::UnknownEdge(edge.to_string()));
		}
		self.edge_colors.remove(edge);
		info!("removed {removed} results for edge {edge}");
		Ok(RemovalOutcome {
			edge: edge.to_string(),
			removed,
			dropped_sources,
		})
	}

	/// Overrides the highlight color of an edge that has results.
	pub fn set_edge_color(&mut self, edge: &str, color: String) -> Result<(), SessionError> {
		if self.latest_score(edge).is_none() {
			return Err(SessionError::UnknownEdge(edge.to_string()));
		}
		self.edge_colors.insert(edge.to_string(), color);
		Ok(())
	}

	/// Color override of `edge`, if any.
	pub fn edge_color(&self, edge: &str) -> Option<&str> {
		self.edge_colors.get(edge).map(String::as_str)
	}

	/// Most recently committed score for `edge`.
	pub fn latest_score(&self, edge: &str) -> Option<f64> {
		self.buckets
			.iter()
			.flat_map(|b| &b.results)
			.filter(|r| r.edge == edge)
			.max_by_key(|r| r.seq)
			.map(|r| r.score)
	}

	/// Latest score of every edge with at least one result.
	pub fn latest_scores(&self) -> HashMap<&str, f64> {
		let mut latest: HashMap<&str, &CommittedResult> = HashMap::new();
		for result in self.buckets.iter().flat_map(|b| &b.results) {
			latest
				.entry(result.edge.as_str())
				.and_modify(|cur| {
					if result.seq > cur.seq {
						*cur = result;
					}
				})
				.or_insert(result);
		}
		latest.into_iter().map(|(edge, r)| (edge, r.score)).collect()
	}

	/// Buckets in first-commit order.
	pub fn buckets(&self) -> &[SourceBucket] {
		&self.buckets
	}

	/// Bucket of `source`, if it has results.
	pub fn bucket(&self, source: &str) -> Option<&SourceBucket> {
		self.buckets.iter().find(|b| b.source == source)
	}

	/// Pairs whose calculation completed.
	pub fn issued(&self) -> &BTreeSet<RequestKey> {
		&self.issued
	}

	/// No results committed.
	pub fn is_empty(&self) -> bool {
		self.buckets.is_empty()
	}
}
