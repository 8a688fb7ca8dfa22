use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::rust_error;
use crate::web_document::web_window;
use crate::web_error_handling::JsResult;


const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// A completed HTTP exchange. Error statuses are data here, not failures.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TextReply {
    pub status: u16,
    pub body: String,
}

impl TextReply {
    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

// Resolves to the response body. Transport errors and non-2xx statuses are both errors.
pub async fn get_text(path: &str) -> JsResult<String> {
    let reply = fetch_text("GET", path, None).await?;
    if !reply.is_success() {
        return Err(rust_error!("GET {} failed: HTTP {}", path, reply.status));
    }
    Ok(reply.body)
}

// Resolves to whatever the server answered, whatever the status.
pub async fn post_form(path: &str, body: String) -> JsResult<TextReply> {
    fetch_text("POST", path, Some(body)).await
}

async fn fetch_text(method: &str, path: &str, form_body: Option<String>) -> JsResult<TextReply> {
    let init = web_sys::RequestInit::new();
    init.set_method(method);
    if let Some(body) = &form_body {
        init.set_body(&JsValue::from_str(body));
    }
    let request = web_sys::Request::new_with_str_and_init(path, &init)?;
    if form_body.is_some() {
        request.headers().set("Content-Type", FORM_CONTENT_TYPE)?;
    }
    let response: web_sys::Response =
        JsFuture::from(web_window()?.fetch_with_request(&request)).await?.dyn_into()?;
    let text = JsFuture::from(response.text()?).await?;
    let body = text
        .as_string()
        .ok_or_else(|| rust_error!("{} {}: response body is not text", method, path))?;
    Ok(TextReply { status: response.status(), body })
}


#[cfg(test)]
mod tests {
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn success_statuses() {
        let reply = |status| TextReply { status, body: String::new() };
        assert!(reply(200).is_success());
        assert!(reply(204).is_success());
        assert!(!reply(404).is_success());
        assert!(!reply(500).is_success());
    }

    #[wasm_bindgen_test]
    async fn error_status_is_returned_with_its_body() {
        let reply = post_form("/no_such_endpoint", "a=1".to_owned()).await.unwrap();
        assert!(!reply.is_success());
        assert!(get_text("/no_such_endpoint").await.is_err());
    }
}
