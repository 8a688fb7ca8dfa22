use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::item::Item;
use crate::side::Side;


pub const DATA_PATH: &str = "/data";
pub const UNLOCK_PATH: &str = "/unlock";
pub const ACTION_PATH: &str = "/action";
pub const MODIFY_BOARD_PATH: &str = "/modify_board";

// Something the local player can do on their turn. Wire names: "self", "op" or an item name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlayerAction {
    ShootSelf,
    ShootOpponent,
    UseItem(Item),
}

impl PlayerAction {
    // Shot from the local player towards the given side of the table.
    pub fn shoot_at(target: Side) -> Self {
        match target {
            Side::Local => PlayerAction::ShootSelf,
            Side::Opponent => PlayerAction::ShootOpponent,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            PlayerAction::ShootSelf => "self",
            PlayerAction::ShootOpponent => "op",
            PlayerAction::UseItem(item) => item.name(),
        }
    }
}

impl FromStr for PlayerAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self" => Ok(PlayerAction::ShootSelf),
            "op" => Ok(PlayerAction::ShootOpponent),
            _ => s
                .parse::<Item>()
                .map(PlayerAction::UseItem)
                .map_err(|_| format!("unknown action: \"{}\"", s)),
        }
    }
}

impl TryFrom<String> for PlayerAction {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<PlayerAction> for String {
    fn from(action: PlayerAction) -> String { action.wire_name().to_owned() }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.wire_name()) }
}

// Fire-and-forget requests the client sends to the game server. Responses are ignored apart
// from the status code, which is only logged.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ServerRequest {
    // Tells the server the client has finished reacting to the current turn.
    Unlock,
    Action(PlayerAction),
}

impl ServerRequest {
    // Path and query, relative to the server root.
    pub fn path(&self) -> String {
        match self {
            ServerRequest::Unlock => UNLOCK_PATH.to_owned(),
            ServerRequest::Action(action) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("action", action.wire_name())
                    .finish();
                format!("{}?{}", ACTION_PATH, query)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_paths() {
        assert_eq!(ServerRequest::Unlock.path(), "/unlock");
        assert_eq!(
            ServerRequest::Action(PlayerAction::ShootOpponent).path(),
            "/action?action=op"
        );
        assert_eq!(
            ServerRequest::Action(PlayerAction::UseItem(Item::MagnifyingGlass)).path(),
            "/action?action=magnifying_glass"
        );
    }

    #[test]
    fn parse_actions() {
        assert_eq!("self".parse::<PlayerAction>().unwrap(), PlayerAction::ShootSelf);
        assert_eq!("beer".parse::<PlayerAction>().unwrap(), PlayerAction::UseItem(Item::Beer));
        assert!("dance".parse::<PlayerAction>().is_err());
        assert_eq!(PlayerAction::shoot_at(Side::Local), PlayerAction::ShootSelf);
    }
}
