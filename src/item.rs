use std::fmt;
use std::marker::PhantomData;

use log::warn;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, EnumString, IntoStaticStr};


// Number of inventory slots shown per player.
pub const ITEM_SLOT_COUNT: usize = 8;

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Item {
    Handcuffs,
    MagnifyingGlass,
    Beer,
    Cigarettes,
    Saw,
}

impl Item {
    // Wire name: used in `/action?action=...`, form field ids and image file names.
    pub fn name(self) -> &'static str { self.into() }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

// Item -> count mapping that keeps the order in which the server listed the items. Slot layout
// depends on that order, so a hash map would not do.
#[derive(Clone, PartialEq, Debug)]
pub struct ItemCounts<C> {
    entries: Vec<(Item, C)>,
}

impl<C: Copy + Default> ItemCounts<C> {
    pub fn new() -> Self { ItemCounts { entries: vec![] } }

    pub fn from_entries(entries: impl IntoIterator<Item = (Item, C)>) -> Self {
        let mut counts = ItemCounts::new();
        for (item, count) in entries {
            counts.set(item, count);
        }
        counts
    }

    pub fn get(&self, item: Item) -> C {
        self.entries
            .iter()
            .find(|(i, _)| *i == item)
            .map_or_else(C::default, |(_, count)| *count)
    }

    pub fn set(&mut self, item: Item, count: C) {
        match self.entries.iter_mut().find(|(i, _)| *i == item) {
            Some((_, c)) => *c = count,
            None => self.entries.push((item, count)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Item, C)> + '_ { self.entries.iter().copied() }
}

impl<C: Copy + Default> Default for ItemCounts<C> {
    fn default() -> Self { Self::new() }
}

impl<C: Serialize> Serialize for ItemCounts<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (item, count) in &self.entries {
            map.serialize_entry(item, count)?;
        }
        map.end()
    }
}

struct ItemCountsVisitor<C>(PhantomData<C>);

impl<'de, C: Deserialize<'de> + Copy + Default> Visitor<'de> for ItemCountsVisitor<C> {
    type Value = ItemCounts<C>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from item name to count")
    }

    // Items this client has no picture for are skipped, so that a newer server does not break
    // the whole page.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut counts = ItemCounts::new();
        while let Some(name) = access.next_key::<String>()? {
            match name.parse::<Item>() {
                Ok(item) => counts.set(item, access.next_value::<C>()?),
                Err(_) => {
                    access.next_value::<IgnoredAny>()?;
                    warn!("Skipping unknown item \"{}\"", name);
                }
            }
        }
        Ok(counts)
    }
}

impl<'de, C: Deserialize<'de> + Copy + Default> Deserialize<'de> for ItemCounts<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ItemCountsVisitor(PhantomData))
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ItemSlots {
    pub slots: Vec<Option<Item>>,
    // Items that did not fit. Overflow policy is "drop and report": the slots keep the first
    // `capacity` items in inventory order.
    pub dropped: u32,
}

impl ItemSlots {
    pub fn occupied(&self) -> usize { self.slots.iter().flatten().count() }
}

// Expands an inventory into a fixed number of slots: each item is repeated `count` times, in
// inventory order, and the remaining slots are left empty.
pub fn construct_item_slots(items: &ItemCounts<u32>, capacity: usize) -> ItemSlots {
    let mut slots = vec![None; capacity];
    let mut index = 0;
    let mut dropped: u32 = 0;
    for (item, count) in items.iter() {
        let take = (count as usize).min(capacity - index);
        slots[index..index + take].fill(Some(item));
        index += take;
        dropped = dropped.saturating_add(count - take as u32);
    }
    ItemSlots { slots, dropped }
}
