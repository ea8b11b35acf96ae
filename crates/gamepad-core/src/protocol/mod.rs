//! Protocol module containing the packet model, the frame codecs and the
//! message-id sequence used by transports without their own identifiers.

pub mod codec;
pub mod packet;
pub mod sequence;

pub use codec::{
    decode_broadcast_frame, decode_radio_frame, encode_broadcast_frame, encode_radio_frame,
    BroadcastFrame, FrameError,
};
pub use packet::*;
pub use sequence::MessageIdSequence;
