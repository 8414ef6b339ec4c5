//! Turns a resolved schema and a raw payload into a decoded [`Message`].
pub(crate) mod array;
pub(crate) mod builder;
pub(crate) mod message;

pub use array::{ArrayValue, OneByteArray};
pub use message::{Field, Message};
pub(crate) use message::MessageDecoder;
