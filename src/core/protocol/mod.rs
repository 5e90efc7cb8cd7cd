// src/core/protocol/mod.rs

pub mod frame;
pub use frame::{FRAME_HEADER_LEN, FrameCodec, MAX_FRAME_PAYLOAD};
