use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;

use crate::rust_error;
use crate::web_document::web_document;
use crate::web_error_handling::JsResult;


pub trait WebElementExt {
    fn with_attribute(self, name: &str, value: &str) -> JsResult<web_sys::Element>;
    fn with_style(self, property: &str, value: &str) -> JsResult<web_sys::Element>;

    fn set_style(&self, property: &str, value: &str) -> JsResult<()>;

    fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
        &self, event_type: &str, listener: impl FnMut(E) -> JsResult<()> + 'static,
    ) -> JsResult<()>;

    fn remove_all_children(&self);

    fn append_new_element(&self, local_name: &str) -> JsResult<web_sys::Element>;
    fn append_image(&self, src: &str) -> JsResult<web_sys::Element>;
    fn append_text(&self, text: &str) -> JsResult<()>;
    fn append_line_break(&self) -> JsResult<()>;
}

impl WebElementExt for web_sys::Element {
    fn with_attribute(self, name: &str, value: &str) -> JsResult<web_sys::Element> {
        self.set_attribute(name, value)?;
        Ok(self)
    }

    fn with_style(self, property: &str, value: &str) -> JsResult<web_sys::Element> {
        self.set_style(property, value)?;
        Ok(self)
    }

    fn set_style(&self, property: &str, value: &str) -> JsResult<()> {
        let element = self
            .dyn_ref::<web_sys::HtmlElement>()
            .ok_or_else(|| rust_error!("Element \"{}\" cannot be styled", self.tag_name()))?;
        element.style().set_property(property, value)
    }

    // Only for elements that live as long as the page: the closure is never freed.
    fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
        &self, event_type: &str, listener: impl FnMut(E) -> JsResult<()> + 'static,
    ) -> JsResult<()> {
        let closure = Closure::new(listener);
        self.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn remove_all_children(&self) { self.replace_children_with_node_0() }

    fn append_new_element(&self, local_name: &str) -> JsResult<web_sys::Element> {
        let node = web_document().create_element(local_name)?;
        self.append_child(&node)?;
        Ok(node)
    }

    fn append_image(&self, src: &str) -> JsResult<web_sys::Element> {
        self.append_new_element("img")?.with_attribute("src", src)
    }

    fn append_text(&self, text: &str) -> JsResult<()> { self.append_with_str_1(text) }

    fn append_line_break(&self) -> JsResult<()> {
        self.append_new_element("br")?;
        Ok(())
    }
}
