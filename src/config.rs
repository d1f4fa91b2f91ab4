//! Application configuration.
//!
//! The page may embed a JSON document in
//! `<script id="explorer-config" type="application/json">`; every field is optional and
//! falls back to the defaults below.

use log::{Level, warn};
use serde::Deserialize;

/// Id of the element holding the embedded JSON configuration.
pub const CONFIG_ELEMENT_ID: &str = "explorer-config";

/// Top-level configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
	/// Collaborator endpoints.
	pub endpoints: EndpointConfig,
	/// Colors and widths used by the visual projection.
	pub visual: VisualConfig,
	/// Console log level (`error`, `warn`, `info`, `debug`, `trace`).
	pub log_level: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			endpoints: EndpointConfig::default(),
			visual: VisualConfig::default(),
			log_level: "debug".into(),
		}
	}
}

/// Where the upload and calculate collaborators live.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
	/// Accepts a multipart `file` field, answers with nodes and edges.
	pub upload_url: String,
	/// Accepts `source` and repeated `sink` query parameters.
	pub calculate_url: String,
}

impl Default for EndpointConfig {
	fn default() -> Self {
		Self {
			upload_url: "/upload".into(),
			calculate_url: "/calculate".into(),
		}
	}
}

/// Visual encoding of neutral and highlighted elements.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualConfig {
	/// Color of edges without results.
	pub neutral_color: String,
	/// Width of edges without results.
	pub neutral_width: f64,
	/// Default color of edges with results.
	pub highlight_color: String,
	/// Width of edges with results.
	pub highlight_width: f64,
	/// Fill color of nodes.
	pub node_color: String,
	/// Prepended to node ids to form node labels.
	pub node_label_prefix: String,
	/// Decimal places used for score labels.
	pub score_precision: usize,
	/// Scale neutral edge width by weight (`weight * 2`).
	pub width_from_weight: bool,
}

impl Default for VisualConfig {
	fn default() -> Self {
		Self {
			neutral_color: "#848484".into(),
			neutral_width: 1.0,
			highlight_color: "#ff0000".into(),
			highlight_width: 4.0,
			node_color: "#ff9999".into(),
			node_label_prefix: "Node ".into(),
			score_precision: 4,
			width_from_weight: false,
		}
	}
}

impl AppConfig {
	/// Parses a JSON configuration document.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Reads the embedded configuration element, falling back to defaults.
	pub fn from_document() -> Self {
		let text = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
			.and_then(|el| el.text_content());
		let Some(text) = text else {
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => config,
			Err(err) => {
				warn!("ignoring malformed configuration: {err}");
				Self::default()
			}
		}
	}

	/// The configured log level, `Info` when unrecognised.
	pub fn level(&self) -> Level {
		self.log_level.parse().unwrap_or(Level::Info)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_gives_defaults() {
		assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
	}

	#[test]
	fn partial_sections_keep_remaining_defaults() {
		let config = AppConfig::from_json(
			r##"{"visual": {"highlight_color": "#00aa00"}, "endpoints": {"upload_url": "/api/upload"}}"##,
		)
		.unwrap();
		assert_eq!(config.visual.highlight_color, "#00aa00");
		assert_eq!(config.visual.highlight_width, 4.0);
		assert_eq!(config.endpoints.upload_url, "/api/upload");
		assert_eq!(config.endpoints.calculate_url, "/calculate");
	}

	#[test]
	fn unknown_level_falls_back_to_info() {
		let config = AppConfig {
			log_level: "loud".into(),
			..AppConfig::default()
		};
		assert_eq!(config.level(), Level::Info);
		assert_eq!(AppConfig::default().level(), Level::Debug);
	}
}
