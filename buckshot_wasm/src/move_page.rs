use std::cell::RefCell;

use buckshot_client::board_edit::{BoardEditState, BoardSnapshot, FieldId, FieldValue};
use buckshot_client::request::MODIFY_BOARD_PATH;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::rust_error;
use crate::web_document::web_document;
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::{JsResult, log_error, log_warning};
use crate::web_fetch::{self, TextReply};
use crate::web_iterators::HtmlCollectionIterator;


const FORM_ID: &str = "board_mod";
const OUTPUT_ID: &str = "outputs";

thread_local! {
    static FORM_FIELDS: RefCell<Vec<(FieldId, web_sys::HtmlInputElement)>> =
        const { RefCell::new(Vec::new()) };
}

// Resolves every form control up front, so a page missing one fails here rather than in the
// middle of populating the form.
pub fn start() -> JsResult<()> {
    let document = web_document();
    let fields = FieldId::all()
        .into_iter()
        .map(|field| Ok((field, document.get_existing_input_by_id(&field.element_id())?)))
        .collect::<JsResult<Vec<_>>>()?;
    document.get_existing_element_by_id(OUTPUT_ID)?;
    let form = document
        .get_existing_element_by_id(FORM_ID)?
        .dyn_into::<web_sys::HtmlFormElement>()
        .map_err(|_| rust_error!("Element \"{}\" is not a form", FORM_ID))?;
    FORM_FIELDS.with(|cell| *cell.borrow_mut() = fields);
    let submitted_form = form.clone();
    form.add_event_listener_and_forget("submit", move |event: web_sys::Event| {
        event.prevent_default();
        submit(collect_form(&submitted_form));
        Ok(())
    })
}

pub fn populate_form(board_json: &str) -> JsResult<()> {
    let board = BoardSnapshot::from_json(board_json).map_err(|err| rust_error!("{}", err))?;
    FORM_FIELDS.with(|cell| {
        let fields = cell.borrow();
        if fields.is_empty() {
            return Err(rust_error!("Move page is not started"));
        }
        for (field, value) in board.field_values() {
            let (_, input) = fields
                .iter()
                .find(|(f, _)| *f == field)
                .ok_or_else(|| rust_error!("No form control for {:?}", field))?;
            match value {
                FieldValue::Number(v) => input.set_value(&v),
                FieldValue::Checked(checked) => input.set_checked(checked),
            }
        }
        Ok(())
    })
}

// Serializes the controls the way a browser submission would: unchecked boxes are skipped.
fn collect_form(form: &web_sys::HtmlFormElement) -> BoardEditState {
    let pairs = HtmlCollectionIterator::from(form.elements()).filter_map(|element| {
        if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
            let name = input.name();
            let checkable = matches!(input.type_().as_str(), "checkbox" | "radio");
            if name.is_empty() || (checkable && !input.checked()) {
                return None;
            }
            Some((name, input.value()))
        } else if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
            let name = select.name();
            (!name.is_empty()).then(|| (name, select.value()))
        } else {
            None
        }
    });
    BoardEditState::from_pairs(pairs)
}

fn submit(state: BoardEditState) {
    spawn_local(async move {
        let result = async {
            let reply = web_fetch::post_form(MODIFY_BOARD_PATH, state.to_form_body()).await?;
            show_reply(&reply)
        };
        if let Err(err) = result.await {
            log_error("Board update failed", &err);
        }
    });
}

// The server explains rejected edits in the body, so error replies are shown too.
fn show_reply(reply: &TextReply) -> JsResult<()> {
    if !reply.is_success() {
        log_warning(&format!("Board update answered HTTP {}", reply.status));
    }
    web_document()
        .get_existing_element_by_id(OUTPUT_ID)?
        .set_text_content(Some(&reply.body));
    Ok(())
}


#[cfg(test)]
mod tests {
    use buckshot_client::board_edit::FieldKind;
    use buckshot_client::item::Item;
    use buckshot_client::side::Side;
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const BOARD_JSON: &str = r#"{
        "max_charges": 4, "current_turn": 1, "charges": [3, 2],
        "items": [{"beer": 2, "handcuffs": 0}, {"saw": 1}],
        "active_items": {"handcuffs": 0.5},
        "skip_next": true, "chamber_public": false
    }"#;

    // Builds the move page markup: the form with one control per field, and the output area.
    fn mount_move_page() -> web_sys::Element {
        let document = web_document();
        let root = document.create_element("div").unwrap();
        let form = root.append_new_element("form").unwrap().with_attribute("id", FORM_ID).unwrap();
        for field in FieldId::all() {
            let input_type = match field.kind() {
                FieldKind::Number => "number",
                FieldKind::Checkbox => "checkbox",
            };
            let id = field.element_id();
            form.append_new_element("input")
                .unwrap()
                .with_attribute("type", input_type)
                .unwrap()
                .with_attribute("id", &id)
                .unwrap()
                .set_attribute("name", &id)
                .unwrap();
        }
        root.append_new_element("div").unwrap().set_attribute("id", OUTPUT_ID).unwrap();
        web_sys::window().unwrap().document().unwrap().body().unwrap().append_child(&root).unwrap();
        root
    }

    fn input(field: FieldId) -> web_sys::HtmlInputElement {
        web_document().get_existing_input_by_id(&field.element_id()).unwrap()
    }

    fn form() -> web_sys::HtmlFormElement {
        web_document().get_existing_element_by_id(FORM_ID).unwrap().dyn_into().unwrap()
    }

    #[wasm_bindgen_test]
    fn populate_fills_numbers_and_checkboxes() {
        let root = mount_move_page();
        start().unwrap();
        input(FieldId::ChamberPublic).set_checked(true);
        populate_form(BOARD_JSON).unwrap();
        assert_eq!(input(FieldId::ChargeCount).value(), "4");
        assert_eq!(input(FieldId::CurrentTurn).value(), "1");
        assert_eq!(input(FieldId::Charges(Side::Opponent)).value(), "2");
        assert_eq!(input(FieldId::PlayerItem(Side::Local, Item::Beer)).value(), "2");
        assert_eq!(input(FieldId::ActiveItem(Item::Handcuffs)).value(), "0.5");
        assert!(input(FieldId::SkipNext).checked());
        assert!(!input(FieldId::ChamberPublic).checked());
        root.remove();
    }

    #[wasm_bindgen_test]
    fn populate_rejects_bad_board() {
        let root = mount_move_page();
        start().unwrap();
        assert!(populate_form("{\"max_charges\": 4}").is_err());
        root.remove();
    }

    #[wasm_bindgen_test]
    fn collect_skips_unchecked_boxes_and_unnamed_controls() {
        let root = mount_move_page();
        start().unwrap();
        populate_form(BOARD_JSON).unwrap();
        form().append_new_element("input").unwrap().set_attribute("type", "text").unwrap();
        let state = collect_form(&form());
        assert_eq!(state.get("p1_beer"), Some("2"));
        assert_eq!(state.get("p2_saw"), Some("1"));
        assert_eq!(state.get("skip_next"), Some("on"));
        assert_eq!(state.get("chamber_public"), None);
        assert_eq!(state.pairs().count(), FieldId::all().len() - 1);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn error_reply_is_shown() {
        let root = mount_move_page();
        let reply = TextReply { status: 400, body: "Invalid charge count".to_owned() };
        show_reply(&reply).unwrap();
        let output = web_document().get_existing_element_by_id(OUTPUT_ID).unwrap();
        assert_eq!(output.text_content().as_deref(), Some("Invalid charge count"));
        root.remove();
    }
}
