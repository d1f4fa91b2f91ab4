//! "How to Use" popup.

use leptos::prelude::*;

const STEPS: [&str; 6] = [
	"Upload a CSV file with 'source', 'target' and 'weight' columns.",
	"Pick a source node. Only nodes sharing an edge with it can be sinks.",
	"Tick one or more sink nodes and press Calculate.",
	"Highlighted edges show their betweenness score. Use the color picker or Remove in the results table to adjust them.",
	"Click an edge or a node for details. Drag nodes, drag the background to pan, scroll or use +/- to zoom.",
	"Generate Report downloads the results table; Save Image downloads the current graph.",
];

/// Toggle button plus the instructions it opens.
#[component]
pub fn HelpPopup() -> impl IntoView {
	let open = RwSignal::new(false);

	view! {
		<button class="info-button" on:click=move |_| open.set(true)>
			"How to Use"
		</button>
		<div class="instruction-popup" style:display=move || if open.get() { "block" } else { "none" }>
			<span class="popup-close" on:click=move |_| open.set(false)>
				"\u{00d7}"
			</span>
			<h2>"How to Use"</h2>
			<ol>{STEPS.iter().map(|step| view! { <li>{*step}</li> }).collect_view()}</ol>
		</div>
	}
}
