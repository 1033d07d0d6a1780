//! The packet module: the LAPDm frame format and its codec.
//! packet 模块：LAPDm 帧格式及其编解码。

pub mod control;
pub mod frame;
pub mod header;
