use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;

use super::{Notice, send};
use crate::client;
use crate::config::AppConfig;
use crate::session::{Session, SessionEffect, SessionEvent};

/// File picker posting the edge list to the upload collaborator.
#[component]
pub fn UploadPanel(session: RwSignal<Session>, notice: Notice) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let file_ref = NodeRef::<Input>::new();
	let (status, set_status) = signal(String::new());
	let busy = RwSignal::new(false);

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let Some(file) = file_ref.get().and_then(|input| input.files()).and_then(|f| f.get(0)) else {
			notice.show("Please choose a CSV file first.");
			return;
		};
		let endpoints = config.endpoints.clone();
		busy.set(true);
		set_status.set(format!("Uploading {}...", file.name()));
		spawn_local(async move {
			let response = client::upload(&endpoints, file).await;
			busy.set(false);
			let effect = match response {
				Ok(response) => send(session, notice, SessionEvent::Uploaded(response)),
				Err(err) => {
					notice.show(err.to_string());
					None
				}
			};
			if let Some(SessionEffect::GraphReplaced) = effect {
				info!("upload accepted");
				notice.clear();
				set_status.set("File has been uploaded successfully!".into());
			} else {
				set_status.set(String::new());
			}
		});
	};

	view! {
		<form class="upload-form" on:submit=on_submit>
			<input type="file" accept=".csv" node_ref=file_ref />
			<button type="submit" disabled=move || busy.get()>"Upload"</button>
			<span class="upload-status">{move || status.get()}</span>
		</form>
	}
}
