#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod animation;
pub mod board_edit;
pub mod client;
pub mod display;
pub mod item;
pub mod request;
pub mod side;
pub mod snapshot;
pub mod test_util;
