use buckshot_client::animation::{ShotAnimation, ShotPhase};
use buckshot_client::display::{
    ChargeBar, ChargeIcon, GameView, ItemSlotView, ShellIcon, ShellStrip, ShotgunSprite,
};
use buckshot_client::side::Side;
use console::Style;
use itertools::Itertools;
use strum::IntoEnumIterator;


fn render_shotgun(sprite: ShotgunSprite, animation: Option<&ShotAnimation>) -> String {
    let name = match sprite {
        ShotgunSprite::Regular => Style::new().bold().apply_to("Shotgun"),
        ShotgunSprite::Sawed => Style::new().bold().red().apply_to("Sawed-off shotgun"),
    };
    let pose = match animation {
        Some(a) if a.phase() == ShotPhase::Aimed => {
            let arrow = if ShotAnimation::aim_rotation(a.target()) > 0 { "↓" } else { "↑" };
            format!("{} aimed at {}", arrow, a.target())
        }
        _ => "at rest".to_owned(),
    };
    format!("{}: {}", name, pose)
}

fn render_charge_bar(bar: &ChargeBar) -> String {
    if bar.icon_width.is_none() {
        return Style::new().dim().apply_to("(no charges)").to_string();
    }
    bar.icons
        .iter()
        .map(|icon| match icon {
            ChargeIcon::Filled => Style::new().green().apply_to("■").to_string(),
            ChargeIcon::Blank => Style::new().dim().apply_to("□").to_string(),
        })
        .join("")
}

fn render_shell_strip(strip: &ShellStrip, hide: bool) -> String {
    if hide {
        return Style::new().dim().apply_to("hidden").to_string();
    }
    if strip.icons.is_empty() {
        return Style::new().dim().apply_to("empty").to_string();
    }
    strip
        .icons
        .iter()
        .map(|icon| match icon {
            ShellIcon::Live => Style::new().red().apply_to("[L]").to_string(),
            ShellIcon::Blank => Style::new().blue().apply_to("[B]").to_string(),
        })
        .join("")
}

fn render_item_slot(index: usize, slot: ItemSlotView) -> String {
    let label = match slot {
        ItemSlotView::Empty => "-".to_owned(),
        ItemSlotView::Usable(item) => {
            Style::new().black().on_green().apply_to(item.name()).to_string()
        }
        ItemSlotView::Inert(item) => item.name().to_owned(),
    };
    format!("{}:{}", index + 1, label)
}

fn render_item_row(side: Side, slots: &[ItemSlotView], dropped: u32) -> String {
    let slots = slots.iter().enumerate().map(|(i, slot)| render_item_slot(i, *slot)).join(" ");
    let mut row = format!("{:<9} {}", side, slots);
    if dropped > 0 {
        let note = format!("  (+{} not shown)", dropped);
        row.push_str(&Style::new().yellow().apply_to(note).to_string());
    }
    row
}

pub fn render_game_view(view: &GameView, hide: bool, animation: Option<&ShotAnimation>) -> String {
    let mut lines = view.info.lines();
    lines.push(String::new());
    lines.push(render_shotgun(view.shotgun_sprite, animation));
    lines.push(format!("Shells:   {}", render_shell_strip(&view.shell_strip, hide)));
    lines.push(String::new());
    for side in Side::iter() {
        lines.push(format!("{:<9} {}", side, render_charge_bar(&view.charge_bars[side])));
    }
    lines.push(String::new());
    for side in Side::iter() {
        lines.push(render_item_row(side, &view.item_slots[side], view.dropped_items[side]));
    }
    lines.join("\n")
}


#[cfg(test)]
mod tests {
    use buckshot_client::test_util::sample_snapshot;
    use instant::Instant;

    use super::*;

    fn plain(s: String) -> String { console::strip_ansi_codes(&s).into_owned() }

    #[test]
    fn shells_are_hidden_on_request() {
        let snapshot = sample_snapshot(1);
        let hidden = plain(render_game_view(&GameView::new(&snapshot, true), true, None));
        assert!(hidden.contains("Shells:   hidden"));
        let shown = plain(render_game_view(&GameView::new(&snapshot, false), false, None));
        assert!(!shown.contains("hidden"));
        assert!(shown.contains("[L]") || shown.contains("[B]"));
    }

    #[test]
    fn aimed_shotgun_names_its_target() {
        let animation = ShotAnimation::new(1, Side::Opponent, Instant::now());
        let line = plain(render_shotgun(ShotgunSprite::Regular, Some(&animation)));
        assert_eq!(line, "Shotgun: ↑ aimed at Opponent");
        assert_eq!(plain(render_shotgun(ShotgunSprite::Sawed, None)), "Sawed-off shotgun: at rest");
    }

    #[test]
    fn item_slots_are_numbered() {
        let slots = [ItemSlotView::Inert(buckshot_client::item::Item::Beer), ItemSlotView::Empty];
        assert_eq!(
            plain(render_item_row(Side::Local, &slots, 2)),
            "You       1:beer 2:-  (+2 not shown)"
        );
    }

    #[test]
    fn no_charge_slots() {
        let bar = ChargeBar::new(0, 0);
        assert_eq!(plain(render_charge_bar(&bar)), "(no charges)");
        assert_eq!(plain(render_charge_bar(&ChargeBar::new(3, 1))), "■□□");
    }
}
