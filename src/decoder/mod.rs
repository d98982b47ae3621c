//! Chainstate decoder core.
//!
//! Pure, allocation-light transforms from raw chainstate bytes to logical
//! UTXO fields: varint codec, amount decompression, XOR deobfuscation,
//! record parsing, script classification, and address derivation. Nothing
//! in this module touches the filesystem or a key-value engine — that is
//! [`crate::store`]'s job.

pub mod address;
pub mod amount;
pub mod bech32;
pub mod obfuscation;
pub mod record;
pub mod script;
pub mod varint;

use thiserror::Error;

/// Failures the decoder core can surface. These are local to decoding a
/// single record or value and are folded into [`crate::errors::AppError`]
/// at the driver boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecoderError {
    #[error("truncated varint: continuation bit set at end of buffer")]
    TruncatedVarint,

    #[error("varint overflows 64 bits")]
    VarintOverflow,

    #[error("amount decompression overflowed")]
    AmountOverflow,

    #[error("malformed UTXO record: {0}")]
    MalformedRecord(String),
}

pub type DecoderResult<T> = Result<T, DecoderError>;

pub use record::{ScriptType, Utxo};
