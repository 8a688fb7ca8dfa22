// Administrative board editing: the table of form fields, how a board snapshot maps onto them,
// and the flat key/value payload posted to `/modify_board`.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use url::form_urlencoded;

use crate::item::{Item, ItemCounts};
use crate::side::Side;


// Value a checked checkbox contributes to a submitted form.
pub const CHECKBOX_ON: &str = "on";

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub max_charges: u32,
    pub current_turn: Side,
    pub charges: (i32, i32),
    pub items: (ItemCounts<u32>, ItemCounts<u32>),
    pub active_items: ItemCounts<f64>,
    pub skip_next: bool,
    // Publicly known next shell; absent or `null` when nobody has looked.
    #[serde(default)]
    pub chamber_public: Option<bool>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FieldId {
    ChargeCount,
    CurrentTurn,
    Charges(Side),
    PlayerItem(Side, Item),
    ActiveItem(Item),
    SkipNext,
    ChamberPublic,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FieldKind {
    Number,
    Checkbox,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FieldValue {
    Number(String),
    Checked(bool),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BoardEditError {
    UnknownField(String),
    InvalidAssignment(String),
    Parse(String),
}

impl fmt::Display for BoardEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardEditError::UnknownField(name) => write!(f, "Unknown board field \"{}\"", name),
            BoardEditError::InvalidAssignment(s) => {
                write!(f, "Expected \"name=value\", got \"{}\"", s)
            }
            BoardEditError::Parse(message) => write!(f, "Cannot parse board: {}", message),
        }
    }
}

impl std::error::Error for BoardEditError {}

impl FieldId {
    // Every field of the board edit form, in form order.
    pub fn all() -> Vec<FieldId> {
        let mut fields = vec![FieldId::ChargeCount, FieldId::CurrentTurn];
        for side in Side::iter() {
            fields.push(FieldId::Charges(side));
            fields.extend(Item::iter().map(|item| FieldId::PlayerItem(side, item)));
        }
        fields.extend(Item::iter().map(FieldId::ActiveItem));
        fields.push(FieldId::SkipNext);
        fields.push(FieldId::ChamberPublic);
        fields
    }

    pub fn element_id(self) -> String {
        match self {
            FieldId::ChargeCount => "charge_count".to_owned(),
            FieldId::CurrentTurn => "current_turn".to_owned(),
            FieldId::Charges(side) => format!("p{}_charges", side.form_number()),
            FieldId::PlayerItem(side, item) => format!("p{}_{}", side.form_number(), item),
            FieldId::ActiveItem(item) => format!("active_{}", item),
            FieldId::SkipNext => "skip_next".to_owned(),
            FieldId::ChamberPublic => "chamber_public".to_owned(),
        }
    }

    pub fn from_element_id(id: &str) -> Option<FieldId> {
        FieldId::all().into_iter().find(|field| field.element_id() == id)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::SkipNext | FieldId::ChamberPublic => FieldKind::Checkbox,
            _ => FieldKind::Number,
        }
    }
}

impl BoardSnapshot {
    pub fn from_json(json: &str) -> Result<Self, BoardEditError> {
        serde_json::from_str(json).map_err(|err| BoardEditError::Parse(err.to_string()))
    }

    fn side_items(&self, side: Side) -> &ItemCounts<u32> {
        match side {
            Side::Local => &self.items.0,
            Side::Opponent => &self.items.1,
        }
    }

    // Values to write into the form. Only items listed in the snapshot are written; other item
    // fields keep whatever the form had.
    pub fn field_values(&self) -> Vec<(FieldId, FieldValue)> {
        let mut values = vec![
            (FieldId::ChargeCount, FieldValue::Number(self.max_charges.to_string())),
            (FieldId::CurrentTurn, FieldValue::Number(self.current_turn.index().to_string())),
            (FieldId::Charges(Side::Local), FieldValue::Number(self.charges.0.to_string())),
            (FieldId::Charges(Side::Opponent), FieldValue::Number(self.charges.1.to_string())),
        ];
        for side in Side::iter() {
            for (item, count) in self.side_items(side).iter() {
                let field = FieldId::PlayerItem(side, item);
                values.push((field, FieldValue::Number(count.to_string())));
            }
        }
        for (item, count) in self.active_items.iter() {
            values.push((FieldId::ActiveItem(item), FieldValue::Number(count.to_string())));
        }
        values.push((FieldId::SkipNext, FieldValue::Checked(self.skip_next)));
        let chamber_public = self.chamber_public == Some(true);
        values.push((FieldId::ChamberPublic, FieldValue::Checked(chamber_public)));
        values
    }
}

// Form contents at submit time, as (control name, value) pairs. Unchecked checkboxes are
// absent, like in a browser-submitted form.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BoardEditState {
    fields: Vec<(String, String)>,
}

impl BoardEditState {
    pub fn new() -> Self { BoardEditState { fields: vec![] } }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        BoardEditState { fields: pairs.into_iter().collect() }
    }

    pub fn from_board(board: &BoardSnapshot) -> Self {
        let mut state = BoardEditState::new();
        for (field, value) in board.field_values() {
            state.set_field(field, value);
        }
        state
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn set_field(&mut self, field: FieldId, value: FieldValue) {
        let name = field.element_id();
        self.fields.retain(|(n, _)| *n != name);
        match value {
            FieldValue::Number(v) => self.fields.push((name, v)),
            FieldValue::Checked(true) => self.fields.push((name, CHECKBOX_ON.to_owned())),
            FieldValue::Checked(false) => {}
        }
    }

    // Applies a "name=value" override. For checkboxes the value is parsed as a boolean.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), BoardEditError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| BoardEditError::InvalidAssignment(assignment.to_owned()))?;
        let field = FieldId::from_element_id(name.trim())
            .ok_or_else(|| BoardEditError::UnknownField(name.trim().to_owned()))?;
        let value = value.trim();
        let value = match field.kind() {
            FieldKind::Number => FieldValue::Number(value.to_owned()),
            FieldKind::Checkbox => FieldValue::Checked(
                value
                    .parse::<bool>()
                    .map_err(|_| BoardEditError::InvalidAssignment(assignment.to_owned()))?,
            ),
        };
        self.set_field(field, value);
        Ok(())
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn to_form_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new()).extend_pairs(self.pairs()).finish()
    }
}

impl fmt::Display for BoardEditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pairs().map(|(n, v)| format!("{}={}", n, v)).join(", "))
    }
}
