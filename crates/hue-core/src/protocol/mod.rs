//! Protocol module containing the header codec, authenticator, packet codec,
//! response frame, and replay guard.

pub mod auth;
pub mod header;
pub mod hex;
pub mod packet;
pub mod replay;
pub mod response;

pub use auth::{compute_tag, verify_tag, AuthError, SharedSecret, Tag, TAG_SIZE};
pub use header::{build_header, decode_header, encode_header, Header, PacketKind};
pub use hex::HexBytes;
pub use packet::{wire_len_for_version, Packet, ProtocolError};
pub use replay::{ReplayError, ReplayGuard};
pub use response::{decode_response_color, ColorReport};
