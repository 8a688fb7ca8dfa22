// Render model for the game page. Everything here is a pure function of the latest snapshot and
// the `hide` toggle; front ends only translate it into DOM nodes or terminal lines.

use enum_map::{EnumMap, enum_map};

use crate::item::{ITEM_SLOT_COUNT, Item, construct_item_slots};
use crate::request::PlayerAction;
use crate::side::Side;
use crate::snapshot::{GameSnapshot, LastAction};


// Total width available to one charge bar, in pixels.
pub const CHARGE_BAR_WIDTH: f64 = 225.0;
// Total length available to the shell strip, in pixels.
pub const SHELL_STRIP_LENGTH: f64 = 225.0;
pub const MAX_SHELL_HEIGHT: f64 = 75.0;
// Width / height of a shell icon.
pub const SHELL_ASPECT_RATIO: f64 = 2.67391304;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShotgunSprite {
    Regular,
    Sawed,
}

#[derive(Clone, PartialEq, Debug)]
pub struct InfoPanel {
    pub turn: Side,
    pub lock: bool,
    pub handcuffs_active: bool,
    pub saw_active: bool,
    pub known_shell: Option<bool>,
    pub last_action: LastAction,
    // (live, total)
    pub shotgun_ratio: (u32, u32),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChargeIcon {
    Filled,
    Blank,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ChargeBar {
    pub icons: Vec<ChargeIcon>,
    // `None` when there are no slots to divide the bar between.
    pub icon_width: Option<f64>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShellIcon {
    Live,
    Blank,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ShellStrip {
    pub icons: Vec<ShellIcon>,
    pub icon_height: f64,
    pub icon_width: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ItemSlotView {
    Empty,
    // Local item that can be used right now. Activating it sends the item action.
    Usable(Item),
    // Item that is shown but cannot be activated.
    Inert(Item),
}

impl ItemSlotView {
    pub fn item(self) -> Option<Item> {
        match self {
            ItemSlotView::Empty => None,
            ItemSlotView::Usable(item) | ItemSlotView::Inert(item) => Some(item),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct GameView {
    pub info: InfoPanel,
    pub shotgun_sprite: ShotgunSprite,
    pub charge_bars: EnumMap<Side, ChargeBar>,
    pub shell_strip: ShellStrip,
    pub item_slots: EnumMap<Side, Vec<ItemSlotView>>,
    // Number of items per side that did not fit into the slots.
    pub dropped_items: EnumMap<Side, u32>,
}

impl InfoPanel {
    pub fn new(snapshot: &GameSnapshot) -> Self {
        InfoPanel {
            turn: snapshot.turn,
            lock: snapshot.lock,
            handcuffs_active: snapshot.item_active(Item::Handcuffs),
            saw_active: snapshot.item_active(Item::Saw),
            known_shell: snapshot.known_shell,
            last_action: snapshot.last_action.clone(),
            shotgun_ratio: snapshot.shotgun_info,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let known_shell = match self.known_shell {
            None => "Unknown",
            Some(true) => "Live",
            Some(false) => "Blank",
        };
        vec![
            format!("Turn: {}", self.turn),
            format!("Lock: {}", self.lock),
            "Active Items:".to_owned(),
            format!(" - Handcuffs: {}", self.handcuffs_active),
            format!(" - Saw: {}", self.saw_active),
            format!("Known Shell: {}", known_shell),
            format!("Last Action: {}", self.last_action),
            format!("Ratio: {} / {}", self.shotgun_ratio.0, self.shotgun_ratio.1),
        ]
    }
}

impl ChargeBar {
    pub fn new(max_charges: u32, charges: i32) -> Self {
        let icons = (0..max_charges)
            .map(|i| {
                if i64::from(i) < i64::from(charges) {
                    ChargeIcon::Filled
                } else {
                    ChargeIcon::Blank
                }
            })
            .collect();
        let icon_width = (max_charges > 0).then(|| CHARGE_BAR_WIDTH / f64::from(max_charges));
        ChargeBar { icons, icon_width }
    }
}

impl ShellStrip {
    pub fn new(shotgun: &[bool], hide: bool) -> Self {
        // An empty shotgun would give an infinite height, which the cap turns into the maximum.
        let icon_height = if shotgun.is_empty() {
            MAX_SHELL_HEIGHT
        } else {
            (SHELL_STRIP_LENGTH / shotgun.len() as f64).min(MAX_SHELL_HEIGHT)
        };
        let icons = if hide {
            vec![]
        } else {
            shotgun
                .iter()
                .map(|&live| if live { ShellIcon::Live } else { ShellIcon::Blank })
                .collect()
        };
        ShellStrip {
            icons,
            icon_height,
            icon_width: icon_height * SHELL_ASPECT_RATIO,
        }
    }
}

impl GameView {
    pub fn new(snapshot: &GameSnapshot, hide: bool) -> Self {
        let shotgun_sprite = if snapshot.item_active(Item::Saw) {
            ShotgunSprite::Sawed
        } else {
            ShotgunSprite::Regular
        };
        let charge_bars =
            enum_map! { side => ChargeBar::new(snapshot.max_charges, snapshot.charges(side)) };
        let layouts =
            enum_map! { side => construct_item_slots(snapshot.items(side), ITEM_SLOT_COUNT) };
        let item_slots: EnumMap<Side, Vec<ItemSlotView>> = enum_map! {
            side => layouts[side]
                .slots
                .iter()
                .map(|slot| match (side, slot) {
                    (_, None) => ItemSlotView::Empty,
                    (Side::Local, Some(item)) if snapshot.can_use(PlayerAction::UseItem(*item)) => {
                        ItemSlotView::Usable(*item)
                    }
                    (_, Some(item)) => ItemSlotView::Inert(*item),
                })
                .collect(),
        };
        GameView {
            info: InfoPanel::new(snapshot),
            shotgun_sprite,
            charge_bars,
            shell_strip: ShellStrip::new(&snapshot.shotgun, hide),
            item_slots,
            dropped_items: enum_map! { side => layouts[side].dropped },
        }
    }
}
