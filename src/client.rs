//! `fetch` calls to the upload and calculate collaborators.

use log::{debug, error};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, Response};

use crate::config::EndpointConfig;
use crate::session::{CalculateResponse, CalculationRequest, UploadResponse, ValidationError};

fn describe(err: JsValue) -> String {
	err.as_string()
		.or_else(|| {
			err.dyn_ref::<js_sys::Error>()
				.map(|e| String::from(e.message()))
		})
		.unwrap_or_else(|| format!("{err:?}"))
}

/// Sends `request` and returns the response body as text.
///
/// Error bodies are still returned: both collaborators describe failures in an `error`
/// field of the JSON body.
async fn send(request: Request) -> Result<String, JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let response = JsFuture::from(window.fetch_with_request(&request)).await?;
	let response: Response = response.dyn_into()?;
	if !response.ok() {
		debug!("{} answered HTTP {}", response.url(), response.status());
	}
	let text = JsFuture::from(response.text()?).await?;
	text.as_string()
		.ok_or_else(|| JsValue::from_str("response body is not text"))
}

/// Posts `file` as the multipart `file` field.
pub async fn upload(endpoints: &EndpointConfig, file: File) -> Result<UploadResponse, ValidationError> {
	let result: Result<String, JsValue> = async {
		let form = FormData::new()?;
		form.append_with_blob_and_filename("file", &file, &file.name())?;
		let opts = RequestInit::new();
		opts.set_method("POST");
		opts.set_body(&form);
		send(Request::new_with_str_and_init(&endpoints.upload_url, &opts)?).await
	}
	.await;

	match result {
		Ok(text) => UploadResponse::parse(&text),
		Err(err) => {
			let msg = describe(err);
			error!("upload failed: {msg}");
			Err(ValidationError::Rejected(msg))
		}
	}
}

/// Builds `calculate_url?source=..&sink=..` with every sink repeated.
pub fn calculate_url(endpoints: &EndpointConfig, request: &CalculationRequest) -> String {
	let mut url = format!(
		"{}?source={}",
		endpoints.calculate_url,
		String::from(js_sys::encode_uri_component(&request.source))
	);
	for sink in &request.sinks {
		url.push_str("&sink=");
		url.push_str(&String::from(js_sys::encode_uri_component(sink)));
	}
	url
}

/// Runs one calculation. Transport failures come back as a failed response so the
/// session treats them like a collaborator error.
pub async fn calculate(endpoints: &EndpointConfig, request: &CalculationRequest) -> CalculateResponse {
	let url = calculate_url(endpoints, request);
	let result: Result<String, JsValue> = async {
		let opts = RequestInit::new();
		opts.set_method("GET");
		send(Request::new_with_str_and_init(&url, &opts)?).await
	}
	.await;

	match result {
		Ok(text) => CalculateResponse::parse(&text)
			.unwrap_or_else(|err| CalculateResponse::failed(format!("malformed response: {err}"))),
		Err(err) => {
			let msg = describe(err);
			error!("calculate request to {url} failed: {msg}");
			CalculateResponse::failed(msg)
		}
	}
}
