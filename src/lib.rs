#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the LAPDm data link library.
//! LAPDm 数据链路库的根。

pub mod channel;
pub mod config;
pub mod core;
pub mod error;
pub mod link;
pub mod packet;
pub mod primitive;
pub mod rll;

pub use channel::{Channel, ChannelBuilder, ChannelFlags};
pub use config::{Config, LinkConfig};
pub use error::{DecodeError, Error, Result};
pub use link::{ChannelKind, LinkId, Role};
pub use primitive::{Operation, PhPrimitive};
pub use rll::{ReleaseMode, RllMessage, RllPrimitive, RlmCause};
