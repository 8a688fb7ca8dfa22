use wasm_bindgen::JsCast;

use crate::rust_error;
use crate::web_error_handling::JsResult;
use crate::web_iterators::HtmlCollectionIterator;


pub struct WebDocument(web_sys::Document);

impl WebDocument {
    pub fn get_existing_element_by_id(&self, element_id: &str) -> JsResult<web_sys::Element> {
        let element = self
            .0
            .get_element_by_id(element_id)
            .ok_or_else(|| rust_error!("Cannot find element \"{}\"", element_id))?;
        if !element.is_object() {
            return Err(rust_error!("Element \"{}\" is not an object", element_id));
        }
        Ok(element)
    }

    pub fn get_existing_input_by_id(
        &self, element_id: &str,
    ) -> JsResult<web_sys::HtmlInputElement> {
        self.get_existing_element_by_id(element_id)?
            .dyn_into::<web_sys::HtmlInputElement>()
            .map_err(|_| rust_error!("Element \"{}\" is not an input", element_id))
    }

    pub fn get_elements_by_class_name(&self, class_name: &str) -> HtmlCollectionIterator {
        self.0.get_elements_by_class_name(class_name).into()
    }

    // The page has exactly one element with this class.
    pub fn get_existing_element_by_class_name(
        &self, class_name: &str,
    ) -> JsResult<web_sys::Element> {
        self.get_elements_by_class_name(class_name)
            .next()
            .ok_or_else(|| rust_error!("Cannot find element with class \"{}\"", class_name))
    }

    pub fn create_element(&self, local_name: &str) -> JsResult<web_sys::Element> {
        self.0.create_element(local_name)
    }
}

pub fn web_window() -> JsResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| rust_error!("Cannot find window"))
}

pub fn web_document() -> WebDocument {
    WebDocument(web_sys::window().and_then(|w| w.document()).expect("Cannot get document"))
}
