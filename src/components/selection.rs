//! Source and sink pickers.

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{Notice, send};
use crate::client;
use crate::config::AppConfig;
use crate::session::{Session, SessionEffect, SessionEvent};

/// Source dropdown, sink checklist and the calculate button.
#[component]
pub fn SelectionPanel(session: RwSignal<Session>, notice: Notice) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();

	let nodes = move || session.with(|s| s.graph().nodes().to_vec());
	let candidates = move || session.with(|s| s.selection().candidates().to_vec());
	let source = move || session.with(|s| s.selection().state().source.clone());
	let is_sink = move |node: &str| session.with(|s| s.selection().state().sinks.contains(node));
	let pending = RwSignal::new(0usize);

	let on_source = move |ev: leptos::ev::Event| {
		let value = event_target_value(&ev);
		if !value.is_empty() {
			send(session, notice, SessionEvent::SourceChosen(value));
		}
	};

	let on_calculate = move |_| {
		let Some(SessionEffect::Dispatch(request)) =
			send(session, notice, SessionEvent::CalculateRequested)
		else {
			return;
		};
		if let Some(msg) = request.rejection_notice() {
			notice.show(msg);
		}
		let endpoints = config.endpoints.clone();
		pending.update(|n| *n += 1);
		spawn_local(async move {
			let response = client::calculate(&endpoints, &request).await;
			pending.update(|n| *n -= 1);
			send(
				session,
				notice,
				SessionEvent::CalculationFinished { request, response },
			);
		});
	};

	view! {
		<div
			class="node-selection"
			style:display=move || if session.with(|s| s.graph().is_empty()) { "none" } else { "block" }
		>
			<label>
				"Source node "
				<select on:change=on_source>
					<option value="" disabled=true selected=move || source().is_none()>
						"Choose a node"
					</option>
					<For each=nodes key=|n| n.clone() let:node>
						{
							let value = node.clone();
							let selected_id = node.clone();
							let selected = move || source().as_deref() == Some(selected_id.as_str());
							view! { <option value=value selected=selected>{node}</option> }
						}
					</For>
				</select>
			</label>
			<fieldset class="sinks">
				<legend>"Sink nodes"</legend>
				<For each=candidates key=|n| n.clone() let:node>
					{
						let id = node.clone();
						let checked_id = node.clone();
						view! {
							<label>
								<input
									type="checkbox"
									prop:checked=move || is_sink(&checked_id)
									on:change=move |_| {
										send(session, notice, SessionEvent::SinkToggled(id.clone()));
									}
								/>
								{node}
							</label>
						}
					}
				</For>
			</fieldset>
			<button
				class="calculate-button"
				disabled=move || !session.with(Session::ready_to_compute)
				on:click=on_calculate
			>
				"Calculate"
			</button>
			<span class="pending">
				{move || match pending.get() {
					0 => String::new(),
					n => format!("{n} calculation(s) running"),
				}}
			</span>
		</div>
	}
}
