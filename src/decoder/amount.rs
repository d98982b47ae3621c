//! Inverse of Bitcoin Core's `CompressAmount`: turns a compact varint value
//! back into a satoshi count.

use super::{DecoderError, DecoderResult};

/// Decompresses a value read from a UTXO record's amount varint.
pub fn decompress(x: u64) -> DecoderResult<u64> {
    if x == 0 {
        return Ok(0);
    }
    let mut x = x - 1;
    let e = x % 10;
    x /= 10;

    let n = if e < 9 {
        let d = (x % 9) + 1;
        x /= 9;
        x.checked_mul(10)
            .and_then(|v| v.checked_add(d))
            .ok_or(DecoderError::AmountOverflow)?
    } else {
        x.checked_add(1).ok_or(DecoderError::AmountOverflow)?
    };

    n.checked_mul(10u64.pow(e as u32))
        .ok_or(DecoderError::AmountOverflow)
}

/// Compresses a satoshi amount into the varint value `decompress` inverts.
/// Not used by the dump driver itself, but kept alongside `decompress` since
/// the round-trip is one of the decoder's testable properties.
pub fn compress(mut n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut e = 0u32;
    while n % 10 == 0 && e < 9 {
        n /= 10;
        e += 1;
    }
    if e < 9 {
        let d = n % 10;
        n /= 10;
        1 + (n * 9 + d - 1) * 10 + e as u64
    } else {
        1 + (n - 1) * 10 + 9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_points_match_cores_table() {
        assert_eq!(decompress(0).unwrap(), 0);
        assert_eq!(decompress(1).unwrap(), 1);
        assert_eq!(decompress(2).unwrap(), 10);
        assert_eq!(decompress(3).unwrap(), 100);
        assert_eq!(decompress(9).unwrap(), 100_000_000);
    }

    #[test]
    fn compress_decompress_round_trips() {
        for amount in [0u64, 1, 10, 100, 1_234_500_000, 21_000_000 * 100_000_000] {
            let compressed = compress(amount);
            assert_eq!(decompress(compressed).unwrap(), amount);
        }
    }

    #[test]
    fn compress_of_decompress_is_identity_on_the_compressed_image() {
        for x in 0u64..2000 {
            let amount = decompress(x).unwrap();
            assert_eq!(compress(amount), x);
        }
    }
}
