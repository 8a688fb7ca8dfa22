// TODO: Report fetch failures on the page itself, not only in the developer console.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod game_page;
mod move_page;
mod web_document;
mod web_element_ext;
mod web_error_handling;
mod web_fetch;
mod web_iterators;

use buckshot_client::item::Item;
use buckshot_client::side::Side;
use wasm_bindgen::prelude::*;

pub use web_error_handling::{RustError, last_panic, set_panic_hook};
use web_error_handling::JsResult;


// Starts polling `/data` and rendering it into the game page.
#[wasm_bindgen]
pub fn start_game_page() -> JsResult<()> {
    set_panic_hook();
    game_page::start()
}

#[wasm_bindgen]
pub fn unlock() -> JsResult<()> { game_page::unlock() }

#[wasm_bindgen]
pub fn toggle_hide() -> JsResult<()> { game_page::toggle_hide() }

// `at` is the target's player index: 0 is us, 1 is the opponent. Returns false when the shot is
// ignored because it is not our turn.
#[wasm_bindgen]
pub fn shoot(at: u8) -> JsResult<bool> {
    let target = Side::from_index(at.into()).ok_or_else(|| rust_error!("Invalid target {}", at))?;
    game_page::shoot(target)
}

#[wasm_bindgen]
pub fn use_item(name: &str) -> JsResult<()> {
    let item: Item = name.parse().map_err(|_| rust_error!("Unknown item \"{}\"", name))?;
    game_page::use_item(item)
}

// Hooks up the board editing form. Fails if any of its controls is missing.
#[wasm_bindgen]
pub fn start_move_page() -> JsResult<()> {
    set_panic_hook();
    move_page::start()
}

#[wasm_bindgen]
pub fn populate_form(board_json: &str) -> JsResult<()> { move_page::populate_form(board_json) }
