use flow_betweenness_explorer::config::AppConfig;
use flow_betweenness_explorer::{App, init_logging};
use leptos::prelude::*;

fn main() {
	let config = AppConfig::from_document();
	init_logging(config.level());

	mount_to_body(move || view! { <App config=config.clone() /> })
}
