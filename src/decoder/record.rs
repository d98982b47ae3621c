//! Splits a chainstate key/value pair into the fixed logical UTXO fields.

use super::address::{self, Network};
pub use super::script::ScriptType;
use super::{script, varint, DecoderError, DecoderResult};

pub const OBFUSCATION_KEY_PREFIX: u8 = 0x0E;
pub const UTXO_RECORD_PREFIX: u8 = 0x43;

/// A fully decoded UTXO, independent of which output columns a caller
/// actually wants — the driver decides which fields it needs before
/// calling into the parts of this module that produce them.
#[derive(Debug, Clone)]
pub struct Utxo {
    pub txid: [u8; 32],
    pub vout: u64,
    pub height: u64,
    pub coinbase: bool,
    pub amount: u64,
    pub nsize: u64,
    pub script: Vec<u8>,
    pub script_type: ScriptType,
    pub address: String,
}

/// Decodes the key of a `0x43`-prefixed record: big-endian txid and vout.
pub fn decode_key(key: &[u8]) -> DecoderResult<([u8; 32], u64)> {
    if key.len() < 33 {
        return Err(DecoderError::MalformedRecord(
            "key shorter than txid".into(),
        ));
    }
    let mut txid = [0u8; 32];
    txid.copy_from_slice(&key[1..33]);
    txid.reverse();
    let (vout, _) = varint::decode_from(key, 33)?;
    Ok((txid, vout))
}

/// The subset of value fields parsed out of a deobfuscated UTXO value,
/// before script classification and address derivation.
struct ParsedValue {
    height: u64,
    coinbase: bool,
    amount: u64,
    nsize: u64,
    script: Vec<u8>,
}

fn decode_value(value: &[u8]) -> DecoderResult<ParsedValue> {
    let (w1, n1) = varint::decode_from(value, 0)?;
    let height = w1 >> 1;
    let coinbase = w1 & 1 != 0;

    let (w2, n2) = varint::decode_from(value, n1)?;
    let amount = super::amount::decompress(w2)?;

    let (nsize, n3) = varint::decode_from(value, n1 + n2)?;
    let mut offset = n1 + n2 + n3;

    if (2..=5).contains(&nsize) {
        offset = offset
            .checked_sub(1)
            .ok_or_else(|| DecoderError::MalformedRecord("nsize prefix byte missing".into()))?;
    }

    if offset > value.len() {
        return Err(DecoderError::MalformedRecord(
            "script offset past end of value".into(),
        ));
    }

    Ok(ParsedValue {
        height,
        coinbase,
        amount,
        nsize,
        script: value[offset..].to_vec(),
    })
}

/// Fully decodes a UTXO record: key gives txid/vout, deobfuscated value
/// gives everything else.
pub fn decode(key: &[u8], deobfuscated_value: &[u8], network: Network) -> DecoderResult<Utxo> {
    let (txid, vout) = decode_key(key)?;
    let parsed = decode_value(deobfuscated_value)?;
    let script_type = script::classify(parsed.nsize, &parsed.script);
    let address = address::derive(script_type, &parsed.script, network);

    Ok(Utxo {
        txid,
        vout,
        height: parsed.height,
        coinbase: parsed.coinbase,
        amount: parsed.amount,
        nsize: parsed.nsize,
        script: parsed.script,
        script_type,
        address,
    })
}
