//! Fetch client for the gallery feed and the submission endpoint.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::gallery::{parse_feed, parse_submission_reply, FeedEntry, FeedError, SubmissionRequest};

/// `GET <endpoint>/all`: the authoritative list of known cookie images.
pub(crate) async fn fetch_feed(endpoint: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let url = format!("{}/all", endpoint.trim_end_matches('/'));
    let text = fetch_text(&url, "GET", None).await?;
    parse_feed(&text)
}

/// `POST <endpoint>/` with the photo payload; resolves to the processed
/// image URL.
pub(crate) async fn submit_photo(endpoint: &str, image_base64: &str) -> Result<String, FeedError> {
    let body = serde_json::to_string(&SubmissionRequest { image_base64 })?;
    let url = format!("{}/", endpoint.trim_end_matches('/'));
    let text = fetch_text(&url, "POST", Some(&body)).await?;
    parse_submission_reply(&text)
}

async fn fetch_text(url: &str, method: &str, body: Option<&str>) -> Result<String, FeedError> {
    let window = web_sys::window().ok_or_else(|| FeedError::Request("no window".into()))?;

    let init = RequestInit::new();
    init.set_method(method);
    init.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        let headers = Headers::new().map_err(request_error)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(request_error)?;
        init.set_headers(headers.as_ref());
        init.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &init).map_err(request_error)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(request_error)?
        .dyn_into()
        .map_err(request_error)?;

    if !response.ok() {
        return Err(FeedError::Request(format!(
            "{} returned status {}",
            url,
            response.status()
        )));
    }

    let text = JsFuture::from(response.text().map_err(request_error)?)
        .await
        .map_err(request_error)?;
    Ok(text.as_string().unwrap_or_default())
}

fn request_error(err: JsValue) -> FeedError {
    FeedError::Request(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
