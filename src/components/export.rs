//! Download buttons for the HTML report and the canvas snapshot.

use leptos::html::Canvas;
use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlCanvasElement, Url};

use super::Notice;
use super::force_graph::CanvasFrame;
use crate::session::{IMAGE_FILENAME, REPORT_FILENAME, Session, snapshot_image};

const REVOKE_DELAY_MS: i32 = 1_000;

/// Clicks a temporary anchor so the browser saves `href` as `filename`.
fn download(href: &str, filename: &str) -> Result<(), JsValue> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(href);
	anchor.set_download(filename);
	anchor.click();
	Ok(())
}

fn download_report(html: String) -> Result<(), JsValue> {
	let parts = js_sys::Array::of1(&JsValue::from_str(&html));
	let options = BlobPropertyBag::new();
	options.set_type("text/html");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;
	let result = download(&url, REPORT_FILENAME);
	revoke_later(url)?;
	result
}

/// Revokes `url` once the click handler has returned, so the download can start first.
fn revoke_later(url: String) -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let revoke = Closure::once_into_js(move || {
		if let Err(err) = Url::revoke_object_url(&url) {
			error!("could not revoke {url}: {err:?}");
		}
	});
	window.set_timeout_with_callback_and_timeout_and_arguments_0(
		revoke.unchecked_ref(),
		REVOKE_DELAY_MS,
	)?;
	Ok(())
}

fn download_image(canvas: HtmlCanvasElement) -> Result<(), JsValue> {
	let snapshot = snapshot_image(&CanvasFrame(canvas))?;
	download(&snapshot.data_url, IMAGE_FILENAME)
}

/// Report and image download buttons. Neither touches session state.
#[component]
pub fn ExportButtons(
	session: RwSignal<Session>,
	notice: Notice,
	canvas_ref: NodeRef<Canvas>,
) -> impl IntoView {
	let on_report = move |_| {
		let report = session.with(Session::report);
		match download_report(report.to_html()) {
			Ok(()) => info!("report exported ({} rows)", report.rows.len()),
			Err(err) => {
				error!("report export failed: {err:?}");
				notice.show("Could not export the report.");
			}
		}
	};

	let on_image = move |_| {
		let Some(canvas) = canvas_ref.get() else {
			notice.show("Graph is not rendered yet.");
			return;
		};
		if let Err(err) = download_image(canvas.into()) {
			error!("image export failed: {err:?}");
			notice.show("Could not export the image.");
		}
	};

	view! {
		<div class="export-buttons">
			<button class="report-button" on:click=on_report>
				"Generate Report"
			</button>
			<button class="image-button" on:click=on_image>
				"Save Image"
			</button>
		</div>
	}
}
