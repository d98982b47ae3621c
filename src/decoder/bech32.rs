//! Hand-rolled BIP-173 bech32 codec for segwit v0 addresses.
//!
//! This is the one piece of the decoder core explicitly budgeted as
//! from-scratch engineering rather than a wrapped dependency: the charset,
//! polymod checksum, and bit-regrouping are all implemented directly
//! against the BIP text.

const CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const GENERATOR: [u32; 5] = [
    0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3,
];

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ff_ffff) << 5) ^ (v as u32);
        for (i, gen) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= gen;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut v: Vec<u8> = hrp.bytes().map(|b| b >> 5).collect();
    v.push(0);
    v.extend(hrp.bytes().map(|b| b & 31));
    v
}

fn create_checksum(hrp: &str, data: &[u8]) -> [u8; 6] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; 6]);
    let mod_ = polymod(&values) ^ 1;
    let mut checksum = [0u8; 6];
    for (i, slot) in checksum.iter_mut().enumerate() {
        *slot = ((mod_ >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}

/// Encodes `hrp` and a sequence of already-5-bit-grouped values (witness
/// version prepended) as a bech32 string.
pub fn encode(hrp: &str, data: &[u8]) -> String {
    let checksum = create_checksum(hrp, data);
    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + 6);
    out.push_str(hrp);
    out.push('1');
    for &d in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[d as usize] as char);
    }
    out
}

/// Regroups bits between `from_bits`-wide and `to_bits`-wide values, as
/// BIP-173's reference implementation does for the 8-to-5 conversion of a
/// witness program.
pub fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to_bits) - 1;
    let max_acc: u32 = (1 << (from_bits + to_bits - 1)) - 1;
    let mut ret = Vec::new();
    for &value in data {
        let value = value as u32;
        if (value >> from_bits) != 0 {
            return None;
        }
        acc = ((acc << from_bits) | value) & max_acc;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            ret.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            ret.push(((acc << (to_bits - bits)) & maxv) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & maxv) != 0 {
        return None;
    }
    Some(ret)
}

/// Encodes a segwit v0 witness program as a bech32 address.
pub fn encode_segwit_address(hrp: &str, witness_version: u8, program: &[u8]) -> Option<String> {
    let mut data = vec![witness_version];
    data.extend(convert_bits(program, 8, 5, true)?);
    Some(encode(hrp, &data))
}

/// Decodes a bech32 string into its HRP and 5-bit data payload (checksum
/// stripped). Used by tests; the driver only ever encodes.
pub fn decode(bech: &str) -> Option<(String, Vec<u8>)> {
    if bech.len() < 8 || bech.len() > 90 {
        return None;
    }
    if bech.chars().any(|c| (c as u32) < 33 || (c as u32) > 126) {
        return None;
    }
    let lower = bech.to_lowercase();
    let upper = bech.to_uppercase();
    if bech != lower && bech != upper {
        return None;
    }
    let bech = lower;
    let pos = bech.rfind('1')?;
    if pos < 1 || pos + 7 > bech.len() {
        return None;
    }
    let hrp = &bech[..pos];
    let data_part = &bech[pos + 1..];
    let mut data = Vec::with_capacity(data_part.len());
    for c in data_part.chars() {
        let d = CHARSET.iter().position(|&x| x == c as u8)? as u8;
        data.push(d);
    }
    let mut check_input = hrp_expand(hrp);
    check_input.extend_from_slice(&data);
    if polymod(&check_input) != 1 {
        return None;
    }
    let payload = data[..data.len() - 6].to_vec();
    Some((hrp.to_string(), payload))
}
