//! Address derivation: base58check for legacy outputs, bech32 for segwit.

use sha2::{Digest, Sha256};

use super::bech32;
use super::script::ScriptType;

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Mainnet/testnet version-byte and HRP pairs. Altcoin support beyond this
/// is explicitly out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    fn p2pkh_prefix(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6F,
        }
    }

    fn p2sh_prefix(self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet => 0xC4,
        }
    }

    fn segwit_hrp(self) -> &'static str {
        match self {
            Network::Mainnet => "bc",
            Network::Testnet => "tb",
        }
    }
}

fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// Base58check-encodes `prefix ∥ payload`: a trailing 4-byte checksum is
/// appended before base58 encoding, and each leading zero byte becomes one
/// leading `'1'`.
pub fn base58check(prefix: u8, payload: &[u8]) -> String {
    let mut extended = Vec::with_capacity(1 + payload.len() + 4);
    extended.push(prefix);
    extended.extend_from_slice(payload);
    let checksum = sha256d(&extended);
    extended.extend_from_slice(&checksum[..4]);
    base58_encode(&extended)
}

fn base58_encode(input: &[u8]) -> String {
    let leading_zeros = input.iter().take_while(|&&b| b == 0).count();

    let mut digits: Vec<u8> = Vec::new();
    for &byte in input {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat('1').take(leading_zeros));
    out.extend(
        digits
            .iter()
            .rev()
            .map(|&d| BASE58_ALPHABET[d as usize] as char),
    );
    out
}

/// Derives the textual address for a classified script, empty when the
/// class has no single canonical address (p2pk, p2ms).
pub fn derive(script_type: ScriptType, script: &[u8], network: Network) -> String {
    match script_type {
        ScriptType::P2pkh => base58check(network.p2pkh_prefix(), script),
        ScriptType::P2sh => base58check(network.p2sh_prefix(), script),
        ScriptType::P2wpkh | ScriptType::P2wsh => {
            if script.len() < 2 {
                return String::new();
            }
            let witness_version = script[0];
            bech32::encode_segwit_address(network.segwit_hrp(), witness_version, &script[2..])
                .unwrap_or_default()
        }
        ScriptType::P2pk | ScriptType::P2ms | ScriptType::NonStandard => String::new(),
    }
}
