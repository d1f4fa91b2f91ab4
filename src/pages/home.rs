use leptos::html::Canvas;
use leptos::prelude::*;

use crate::components::export::ExportButtons;
use crate::components::force_graph::{ForceGraphCanvas, GraphData};
use crate::components::help::HelpPopup;
use crate::components::results_table::ResultsTable;
use crate::components::selection::SelectionPanel;
use crate::components::upload::UploadPanel;
use crate::components::{Notice, NoticeBanner, send};
use crate::config::AppConfig;
use crate::session::{ClickTarget, Session, SessionEffect, SessionEvent};

/// Explorer page: upload, selection, graph, results and exports.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let session = RwSignal::new(Session::new(config.visual));
	let notice = Notice(RwSignal::new(None));
	let canvas_ref = NodeRef::<Canvas>::new();

	// Topology only; result changes must not reset the layout.
	let graph_data =
		Memo::new(move |_| session.with(|s| GraphData::from_graph(s.graph(), s.visual_config())));
	let visuals = Memo::new(move |_| session.with(Session::visuals));

	let on_select = Callback::new(move |target: ClickTarget| {
		if let Some(SessionEffect::Inspected(inspection)) =
			send(session, notice, SessionEvent::Clicked(target))
		{
			notice.show(inspection.message());
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas
					data=graph_data
					visuals=visuals
					on_select=on_select
					node_ref=canvas_ref
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Current Flow Betweenness"</h1>
					<p class="subtitle">
						"Click an edge or node for details. Drag nodes to reposition. Scroll to zoom."
					</p>
					<HelpPopup />
					<UploadPanel session notice />
					<SelectionPanel session notice />
					<NoticeBanner notice />
					<ExportButtons session notice canvas_ref />
					<ResultsTable session notice />
				</div>
			</div>
		</ErrorBoundary>
	}
}
