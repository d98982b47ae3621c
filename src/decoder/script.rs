//! Classifies a chainstate script payload by its `nSize` tag, with the
//! length-and-prefix overrides that apply to `nSize >= 6` raw scripts.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    P2pk,
    P2pkh,
    P2sh,
    P2ms,
    P2wpkh,
    P2wsh,
    NonStandard,
}

impl ScriptType {
    pub const ALL: [ScriptType; 7] = [
        ScriptType::P2pk,
        ScriptType::P2pkh,
        ScriptType::P2sh,
        ScriptType::P2ms,
        ScriptType::P2wpkh,
        ScriptType::P2wsh,
        ScriptType::NonStandard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::P2pk => "p2pk",
            ScriptType::P2pkh => "p2pkh",
            ScriptType::P2sh => "p2sh",
            ScriptType::P2ms => "p2ms",
            ScriptType::P2wpkh => "p2wpkh",
            ScriptType::P2wsh => "p2wsh",
            ScriptType::NonStandard => "non-standard",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies `(nsize, script)` into one of the seven classes.
///
/// `script` is the already-extracted payload — the nSize-0..5 prefix byte
/// adjustment (spec §3's "offset decremented by one" rule) has already
/// happened in the record parser by the time this is called.
pub fn classify(nsize: u64, script: &[u8]) -> ScriptType {
    match nsize {
        0 => ScriptType::P2pkh,
        1 => ScriptType::P2sh,
        2 | 3 | 4 | 5 => ScriptType::P2pk,
        _ => {
            if script.last() == Some(&0xAE) {
                ScriptType::P2ms
            } else if nsize == 28 && script.len() >= 2 && script[0] == 0x00 && script[1] == 0x14 {
                ScriptType::P2wpkh
            } else if nsize == 40 && script.len() >= 2 && script[0] == 0x00 && script[1] == 0x20 {
                ScriptType::P2wsh
            } else {
                ScriptType::NonStandard
            }
        }
    }
}
