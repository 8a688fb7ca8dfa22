use std::fmt;

use log::warn;
use serde::de::{IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::item::{Item, ItemCounts};
use crate::request::PlayerAction;
use crate::side::Side;


// Opaque per-turn token. Only ever compared for equality.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(serde_json::Value);

impl TurnId {
    pub fn new(value: impl Into<serde_json::Value>) -> Self { TurnId(value.into()) }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

// Most recent action reported by the server. The server sends `[actor, action, result]`, or
// `[-1, ""]` before anything happened. The result is only displayed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LastAction {
    pub actor: i64,
    pub action: String,
    pub result: Option<serde_json::Value>,
}

impl LastAction {
    pub fn new(actor: i64, action: impl Into<String>) -> Self {
        LastAction { actor, action: action.into(), result: None }
    }

    pub fn none() -> Self { Self::new(-1, "") }

    pub fn with_result(self, result: impl Into<serde_json::Value>) -> Self {
        LastAction { result: Some(result.into()), ..self }
    }

    pub fn actor_side(&self) -> Option<Side> { Side::from_index(self.actor) }

    pub fn player_action(&self) -> Option<PlayerAction> { self.action.parse().ok() }

    // If the opponent fired, returns the side of the table the shotgun was pointed at.
    // "op" from the opponent means they shot at us.
    pub fn opponent_shot_target(&self) -> Option<Side> {
        if self.actor_side() != Some(Side::Opponent) {
            return None;
        }
        match self.player_action()? {
            PlayerAction::ShootOpponent => Some(Side::Local),
            PlayerAction::ShootSelf => Some(Side::Opponent),
            PlayerAction::UseItem(_) => None,
        }
    }
}

impl Default for LastAction {
    fn default() -> Self { Self::none() }
}

// Comma-joined like a JS array: `1,op,true`. Strings are unquoted and null is empty.
impl fmt::Display for LastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.actor, self.action)?;
        match &self.result {
            None => Ok(()),
            Some(serde_json::Value::Null) => write!(f, ","),
            Some(serde_json::Value::String(s)) => write!(f, ",{}", s),
            Some(value) => write!(f, ",{}", value),
        }
    }
}

struct LastActionVisitor;

impl<'de> Visitor<'de> for LastActionVisitor {
    type Value = LastAction;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an [actor, action, ...] sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        use serde::de::Error;
        let actor = seq.next_element::<i64>()?.ok_or_else(|| A::Error::invalid_length(0, &self))?;
        let action =
            seq.next_element::<String>()?.ok_or_else(|| A::Error::invalid_length(1, &self))?;
        let result = seq.next_element::<serde_json::Value>()?;
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(LastAction { actor, action, result })
    }
}

impl<'de> Deserialize<'de> for LastAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(LastActionVisitor)
    }
}

impl Serialize for LastAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2 + usize::from(self.result.is_some()))?;
        tuple.serialize_element(&self.actor)?;
        tuple.serialize_element(&self.action)?;
        if let Some(result) = &self.result {
            tuple.serialize_element(result)?;
        }
        tuple.end()
    }
}

// Game state as served by `GET /data`. Replaced wholesale on every fetch; never mutated locally.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub turn_id: TurnId,
    pub turn: Side,
    pub lock: bool,
    // Counts may be fractional: handcuffs wear off in halves.
    pub active_items: ItemCounts<f64>,
    pub known_shell: Option<bool>,
    #[serde(default)]
    pub last_action: LastAction,
    // (live shells, total shells)
    pub shotgun_info: (u32, u32),
    pub max_charges: u32,
    pub charges: (i32, i32),
    // Remaining shells in firing order, `true` is live.
    pub shotgun: Vec<bool>,
    pub player_items: ItemCounts<u32>,
    pub op_items: ItemCounts<u32>,
    #[serde(deserialize_with = "deserialize_known_moves")]
    pub moves: Vec<PlayerAction>,
}

// Moves naming an item this client does not know cannot be offered anyway, so they are dropped.
fn deserialize_known_moves<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<PlayerAction>, D::Error> {
    let names = Vec::<String>::deserialize(deserializer)?;
    Ok(names
        .into_iter()
        .filter_map(|name| match name.parse() {
            Ok(action) => Some(action),
            Err(err) => {
                warn!("Skipping move: {}", err);
                None
            }
        })
        .collect())
}

#[derive(Debug)]
pub enum SnapshotError {
    Parse(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Parse(err) => write!(f, "Cannot parse game state: {}", err),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl GameSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(SnapshotError::Parse)
    }

    pub fn item_active(&self, item: Item) -> bool { self.active_items.get(item) > 0.0 }

    pub fn charges(&self, side: Side) -> i32 {
        match side {
            Side::Local => self.charges.0,
            Side::Opponent => self.charges.1,
        }
    }

    pub fn items(&self, side: Side) -> &ItemCounts<u32> {
        match side {
            Side::Local => &self.player_items,
            Side::Opponent => &self.op_items,
        }
    }

    pub fn can_use(&self, action: PlayerAction) -> bool { self.moves.contains(&action) }
}
