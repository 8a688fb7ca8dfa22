// Poller and renderer for the game page. All state lives in `ClientState`; this module only
// moves bytes between the server, the state and the DOM.

use std::cell::RefCell;
use std::sync::mpsc;
use std::time::Duration;

use buckshot_client::animation::ShotAnimation;
use buckshot_client::client::{
    ClientState, NotableEvent, POLL_INTERVAL, PollOutcome, REFRESH_INTERVAL,
};
use buckshot_client::display::{
    ChargeBar, ChargeIcon, GameView, InfoPanel, ItemSlotView, ShellIcon, ShellStrip, ShotgunSprite,
};
use buckshot_client::item::Item;
use buckshot_client::request::{DATA_PATH, PlayerAction, ServerRequest};
use buckshot_client::side::Side;
use buckshot_client::snapshot::GameSnapshot;
use instant::Instant;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;

use crate::rust_error;
use crate::web_document::{web_document, web_window};
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::{JsResult, log_error, log_info, log_warning};
use crate::web_fetch;


const IMAGE_DIR: &str = "/static/images";
const INFO_TEXT_ID: &str = "basic_info_text";
// Set on a local item slot while its item can be used.
const USABLE_ITEM_ATTRIBUTE: &str = "data-item";
const SHOTGUN_TRANSITION: &str = "transform 2s";
const USABLE_ITEM_COLOR: &str = "lightgreen";

thread_local! {
    static GAME_PAGE: RefCell<Option<GamePage>> = const { RefCell::new(None) };
}

struct GamePage {
    state: ClientState,
    requests_rx: mpsc::Receiver<ServerRequest>,
}

impl GamePage {
    fn new() -> Self {
        let (requests_tx, requests_rx) = mpsc::channel();
        GamePage { state: ClientState::new(requests_tx), requests_rx }
    }

    // Applies everything the state wants shown and sends everything it wants sent.
    fn pump(&mut self) -> JsResult<()> {
        while let Some(event) = self.state.next_notable_event() {
            match event {
                NotableEvent::ViewUpdated => {
                    if let Some(view) = self.state.view() {
                        render_view(&view)?;
                    }
                }
                NotableEvent::ShotgunAimed(target) => {
                    rotate_shotgun(ShotAnimation::aim_rotation(target))?;
                }
                NotableEvent::ShotgunLowered => rotate_shotgun(0)?,
            }
        }
        for request in self.requests_rx.try_iter() {
            send_request(request);
        }
        Ok(())
    }
}

fn with_game_page<R>(f: impl FnOnce(&mut GamePage) -> JsResult<R>) -> JsResult<R> {
    GAME_PAGE.with(|cell| {
        let mut page = cell.borrow_mut();
        let page = page.as_mut().ok_or_else(|| rust_error!("Game page is not started"))?;
        let ret = f(page)?;
        page.pump()?;
        Ok(ret)
    })
}

pub fn start() -> JsResult<()> {
    install_panel_buttons()?;
    install_slot_listeners()?;
    GAME_PAGE.with(|cell| *cell.borrow_mut() = Some(GamePage::new()));
    set_interval_and_forget(POLL_INTERVAL, poll)?;
    set_interval_and_forget(REFRESH_INTERVAL, || {
        if let Err(err) = with_game_page(|page| {
            page.state.refresh(Instant::now());
            Ok(())
        }) {
            log_error("Refresh failed", &err);
        }
    })?;
    Ok(())
}

pub fn unlock() -> JsResult<()> {
    with_game_page(|page| {
        page.state.unlock();
        Ok(())
    })
}

pub fn toggle_hide() -> JsResult<()> {
    with_game_page(|page| {
        page.state.toggle_hide();
        Ok(())
    })
}

pub fn shoot(target: Side) -> JsResult<bool> {
    with_game_page(|page| Ok(page.state.shoot_at(target, Instant::now())))
}

pub fn use_item(item: Item) -> JsResult<()> {
    with_game_page(|page| {
        page.state.act(PlayerAction::UseItem(item));
        Ok(())
    })
}

// Fetches are not serialized: a slow response may land after a newer one.
fn poll() {
    spawn_local(async {
        let snapshot = fetch_snapshot().await;
        let result = with_game_page(|page| {
            match snapshot {
                Ok(snapshot) => {
                    let outcome = page.state.process_snapshot(snapshot, Instant::now());
                    if outcome == PollOutcome::Unlocked {
                        log_info("Server was waiting, unlock requested");
                    }
                }
                Err(err) => log_error("Cannot fetch game state", &err),
            }
            Ok(())
        });
        if let Err(err) = result {
            log_error("Poll failed", &err);
        }
    });
}

async fn fetch_snapshot() -> JsResult<GameSnapshot> {
    let body = web_fetch::get_text(DATA_PATH).await?;
    GameSnapshot::from_json(&body).map_err(|err| rust_error!("{}", err))
}

fn send_request(request: ServerRequest) {
    let path = request.path();
    spawn_local(async move {
        match web_fetch::get_text(&path).await {
            Ok(_) => log_info(&format!("{} succeeded", path)),
            Err(err) => log_error(&format!("Request {} failed", path), &err),
        }
    });
}

fn set_interval_and_forget(interval: Duration, f: impl FnMut() + 'static) -> JsResult<()> {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
    let millis = i32::try_from(interval.as_millis())
        .map_err(|_| rust_error!("Interval {:?} is too long", interval))?;
    web_window()?.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        millis,
    )?;
    closure.forget();
    Ok(())
}

fn image_path(name: &str) -> String { format!("{}/{}.png", IMAGE_DIR, name) }

fn rotate_shotgun(degrees: i32) -> JsResult<()> {
    let shotgun = web_document().get_existing_element_by_id("shotgun_img")?;
    shotgun.set_style("transition", SHOTGUN_TRANSITION)?;
    shotgun.set_style("transform", &format!("rotate({}deg)", degrees))
}

fn render_view(view: &GameView) -> JsResult<()> {
    render_info(&view.info)?;
    render_shotgun_sprite(view.shotgun_sprite)?;
    for side in Side::iter() {
        render_charge_bar(side, &view.charge_bars[side])?;
        render_item_slots(side, &view.item_slots[side])?;
        let dropped = view.dropped_items[side];
        if dropped > 0 {
            log_warning(&format!("{}: {} item(s) do not fit into the slots", side, dropped));
        }
    }
    render_shell_strip(&view.shell_strip)
}

// The info panel keeps its buttons for the life of the page; renders only replace the text.
fn install_panel_buttons() -> JsResult<()> {
    let panel = web_document().get_existing_element_by_class_name("basic_info")?;
    panel.remove_all_children();
    panel.append_new_element("div")?.set_attribute("id", INFO_TEXT_ID)?;
    let unlock_button = panel.append_new_element("button")?.with_attribute("type", "button")?;
    unlock_button.set_text_content(Some("Unlock"));
    unlock_button.add_event_listener_and_forget("click", |_: web_sys::Event| unlock())?;
    let hide_button = panel.append_new_element("button")?.with_attribute("type", "button")?;
    hide_button.set_text_content(Some("Toggle Hide"));
    hide_button.add_event_listener_and_forget("click", |_: web_sys::Event| toggle_hide())
}

// One click handler per local slot. Clicks on the slot's button bubble up here, and the slot
// attribute written by `render_item_slots` says which item, if any, is usable.
fn install_slot_listeners() -> JsResult<()> {
    for slot in web_document().get_elements_by_class_name(slot_class(Side::Local)) {
        slot.add_event_listener_and_forget("click", |event: web_sys::Event| {
            let slot = event
                .current_target()
                .and_then(|target| target.dyn_into::<web_sys::Element>().ok());
            match slot.and_then(|slot| slot.get_attribute(USABLE_ITEM_ATTRIBUTE)) {
                Some(name) => {
                    let item = name
                        .parse::<Item>()
                        .map_err(|_| rust_error!("Unknown item \"{}\"", name))?;
                    use_item(item)
                }
                None => Ok(()),
            }
        })?;
    }
    Ok(())
}

fn render_info(info: &InfoPanel) -> JsResult<()> {
    let text = web_document().get_existing_element_by_id(INFO_TEXT_ID)?;
    text.remove_all_children();
    for line in info.lines() {
        text.append_text(&line)?;
        text.append_line_break()?;
    }
    Ok(())
}

fn render_shotgun_sprite(sprite: ShotgunSprite) -> JsResult<()> {
    let name = match sprite {
        ShotgunSprite::Regular => "shotgun",
        ShotgunSprite::Sawed => "shotgun_sawed",
    };
    web_document()
        .get_existing_element_by_id("shotgun_img")?
        .set_attribute("src", &image_path(name))
}

fn render_charge_bar(side: Side, bar: &ChargeBar) -> JsResult<()> {
    let class_name = match side {
        Side::Local => "player_area",
        Side::Opponent => "opponent_area",
    };
    let area = web_document().get_existing_element_by_class_name(class_name)?;
    area.remove_all_children();
    let Some(width) = bar.icon_width else {
        return Ok(());
    };
    for icon in &bar.icons {
        let name = match icon {
            ChargeIcon::Filled => "charge",
            ChargeIcon::Blank => "charge_blank",
        };
        area.append_image(&image_path(name))?.set_attribute("width", &format!("{}px", width))?;
    }
    Ok(())
}

fn render_shell_strip(strip: &ShellStrip) -> JsResult<()> {
    let area = web_document().get_existing_element_by_class_name("shotgun_info")?;
    area.remove_all_children();
    for icon in &strip.icons {
        let name = match icon {
            ShellIcon::Live => "bullet_live",
            ShellIcon::Blank => "bullet_blank",
        };
        area.append_image(&image_path(name))?
            .with_attribute("height", &format!("{}px", strip.icon_height))?
            .set_attribute("width", &strip.icon_width.to_string())?;
    }
    Ok(())
}

fn slot_class(side: Side) -> &'static str {
    match side {
        Side::Local => "p_item_slot",
        Side::Opponent => "op_item_slot",
    }
}

fn render_item_slots(side: Side, slots: &[ItemSlotView]) -> JsResult<()> {
    let class_name = slot_class(side);
    let elements: Vec<_> = web_document().get_elements_by_class_name(class_name).collect();
    if elements.len() < slots.len() {
        return Err(rust_error!(
            "Expected {} \"{}\" elements, found {}",
            slots.len(),
            class_name,
            elements.len()
        ));
    }
    for (element, slot) in elements.iter().zip(slots) {
        element.remove_all_children();
        element.remove_attribute(USABLE_ITEM_ATTRIBUTE)?;
        let Some(item) = slot.item() else {
            continue;
        };
        let image_parent = match (side, slot) {
            (Side::Opponent, _) => element.clone(),
            (Side::Local, ItemSlotView::Usable(_)) => {
                element.set_attribute(USABLE_ITEM_ATTRIBUTE, item.name())?;
                element
                    .append_new_element("button")?
                    .with_attribute("type", "button")?
                    .with_style("background-color", USABLE_ITEM_COLOR)?
            }
            (Side::Local, _) => {
                element.append_new_element("button")?.with_attribute("type", "button")?
            }
        };
        image_parent
            .append_image(&image_path(item.name()))?
            .with_attribute("height", "100%")?
            .set_attribute("width", "100%")?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use buckshot_client::display::GameView;
    use buckshot_client::item::ITEM_SLOT_COUNT;
    use buckshot_client::test_util::sample_snapshot;
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount(class_name: &str, count: usize) -> web_sys::Element {
        let root = web_document().create_element("div").unwrap();
        for _ in 0..count {
            root.append_new_element("div").unwrap().set_attribute("class", class_name).unwrap();
        }
        let body = web_sys::window().unwrap().document().unwrap().body().unwrap();
        body.append_child(&root).unwrap();
        root
    }

    fn slot(class_name: &str, index: usize) -> web_sys::Element {
        web_document().get_elements_by_class_name(class_name).nth(index).unwrap()
    }

    #[wasm_bindgen_test]
    fn local_slots_mark_usable_items() {
        let root = mount("p_item_slot", ITEM_SLOT_COUNT);
        let mut slots = vec![ItemSlotView::Empty; ITEM_SLOT_COUNT];
        slots[0] = ItemSlotView::Usable(Item::Beer);
        slots[1] = ItemSlotView::Inert(Item::Saw);
        render_item_slots(Side::Local, &slots).unwrap();

        let usable = slot("p_item_slot", 0);
        assert_eq!(usable.get_attribute(USABLE_ITEM_ATTRIBUTE).as_deref(), Some("beer"));
        let button = usable.first_element_child().unwrap();
        assert_eq!(button.tag_name(), "BUTTON");
        let style = button.get_attribute("style").unwrap();
        assert!(style.contains(USABLE_ITEM_COLOR), "{}", style);
        let image = button.first_element_child().unwrap();
        assert_eq!(image.get_attribute("src").as_deref(), Some("/static/images/beer.png"));

        let inert = slot("p_item_slot", 1);
        assert_eq!(inert.get_attribute(USABLE_ITEM_ATTRIBUTE), None);
        assert_eq!(inert.first_element_child().unwrap().tag_name(), "BUTTON");
        assert_eq!(slot("p_item_slot", 2).child_element_count(), 0);

        // A later render without moves clears the usable marker.
        slots[0] = ItemSlotView::Inert(Item::Beer);
        render_item_slots(Side::Local, &slots).unwrap();
        assert_eq!(slot("p_item_slot", 0).get_attribute(USABLE_ITEM_ATTRIBUTE), None);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn opponent_slots_show_bare_images() {
        let root = mount("op_item_slot", ITEM_SLOT_COUNT);
        let view = GameView::new(&sample_snapshot(1), true);
        render_item_slots(Side::Opponent, &view.item_slots[Side::Opponent]).unwrap();
        for index in 0..2 {
            let image = slot("op_item_slot", index).first_element_child().unwrap();
            assert_eq!(image.tag_name(), "IMG");
            assert_eq!(
                image.get_attribute("src").as_deref(),
                Some("/static/images/cigarettes.png")
            );
        }
        assert_eq!(slot("op_item_slot", 2).child_element_count(), 0);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn too_few_slot_elements() {
        let root = mount("op_item_slot", 3);
        let slots = vec![ItemSlotView::Empty; ITEM_SLOT_COUNT];
        assert!(render_item_slots(Side::Opponent, &slots).is_err());
        root.remove();
    }

    #[wasm_bindgen_test]
    fn panel_buttons_survive_renders() {
        let root = mount("basic_info", 1);
        install_panel_buttons().unwrap();
        let info = InfoPanel::new(&sample_snapshot(1));
        render_info(&info).unwrap();
        render_info(&info).unwrap();
        let panel = web_document().get_existing_element_by_class_name("basic_info").unwrap();
        assert_eq!(panel.get_elements_by_tag_name("button").length(), 2);
        let text = web_document().get_existing_element_by_id(INFO_TEXT_ID).unwrap();
        assert!(text.text_content().unwrap().starts_with("Turn: You"));
        root.remove();
    }
}
