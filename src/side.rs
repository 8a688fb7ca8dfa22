use std::fmt;

use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;


// Seat at the table as seen by this client. The server encodes it as a player index:
// 0 is always the local player, 1 the opponent.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Enum,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Side {
    Local,
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Local => Side::Opponent,
            Side::Opponent => Side::Local,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Side::Local => 0,
            Side::Opponent => 1,
        }
    }

    // Players are numbered from one in board edit form field names ("p1_charges").
    pub fn form_number(self) -> u8 { self.index() + 1 }

    pub fn from_index(index: i64) -> Option<Side> {
        match index {
            0 => Some(Side::Local),
            1 => Some(Side::Opponent),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = String;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Side::from_index(value.into()).ok_or_else(|| format!("invalid player index: {}", value))
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 { side.index() }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => f.pad("You"),
            Side::Opponent => f.pad("Opponent"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_from_json() {
        assert_eq!(serde_json::from_str::<Side>("0").unwrap(), Side::Local);
        assert_eq!(serde_json::from_str::<Side>("1").unwrap(), Side::Opponent);
        assert!(serde_json::from_str::<Side>("2").is_err());
        assert_eq!(serde_json::to_string(&Side::Opponent).unwrap(), "1");
    }

    #[test]
    fn form_numbers_start_at_one() {
        assert_eq!(Side::Local.form_number(), 1);
        assert_eq!(Side::Opponent.form_number(), 2);
    }
}
