use leptos::prelude::*;

use super::{Notice, send};
use crate::session::{Session, SessionEvent, format_score};

/// Committed results grouped by source, one row per result.
#[component]
pub fn ResultsTable(session: RwSignal<Session>, notice: Notice) -> impl IntoView {
	let report = Memo::new(move |_| session.with(Session::report));

	let rows = move || {
		let report = report.get();
		report
			.rows
			.into_iter()
			.map(|row| {
				let (color_edge, remove_edge) = (row.edge.clone(), row.edge.clone());
				view! {
					<tr>
						<td>{row.source}</td>
						<td>{row.edge}</td>
						<td>{format_score(row.score, report.precision)}</td>
						<td>{row.weight}</td>
						<td>
							<input
								type="color"
								class="color-picker"
								prop:value=row.color
								on:input=move |ev| {
									send(
										session,
										notice,
										SessionEvent::EdgeColorChanged {
											edge: color_edge.clone(),
											color: event_target_value(&ev),
										},
									);
								}
							/>
						</td>
						<td>
							<button
								class="remove-btn"
								on:click=move |_| {
									send(session, notice, SessionEvent::ResultRemoved(remove_edge.clone()));
								}
							>
								"Remove"
							</button>
						</td>
					</tr>
				}
			})
			.collect_view()
	};

	view! {
		<div
			class="result"
			style:display=move || if report.with(|r| r.is_empty()) { "none" } else { "block" }
		>
			<table>
				<thead>
					<tr>
						<th>"Source"</th>
						<th>"Edge"</th>
						<th>"Betweenness Score"</th>
						<th>"Weight"</th>
						<th>"Color"</th>
						<th></th>
					</tr>
				</thead>
				<tbody>{rows}</tbody>
			</table>
		</div>
	}
}
