//! End-to-end tests exercising the public decoder and driver API the way a
//! caller outside the crate would, without touching a real LevelDB chainstate
//! directory (see `src/store.rs`'s `MemoryStore` test double, re-used here
//! through the driver's `ChainstateStore` trait).

use chainstate_dump::decoder::address::Network;
use chainstate_dump::decoder::amount;
use chainstate_dump::decoder::obfuscation::ObfuscationKey;
use chainstate_dump::decoder::record::{self, OBFUSCATION_KEY_PREFIX, UTXO_RECORD_PREFIX};
use chainstate_dump::decoder::varint;
use chainstate_dump::driver::{self, Column, ColumnSet};
use chainstate_dump::store::ChainstateStore;

/// A `ChainstateStore` built from a fixed vector, for tests that live
/// outside the crate and so can't reach the `#[cfg(test)]`-gated
/// `MemoryStore`.
struct FixtureStore {
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

impl FixtureStore {
    fn new(entries: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl ChainstateStore for FixtureStore {
    fn next_entry(&mut self) -> Option<(Vec<u8>, Vec<u8>)> {
        self.entries.next()
    }
}

fn utxo_entry(
    txid_le: [u8; 32],
    vout: u64,
    height: u64,
    coinbase: bool,
    amount_sats: u64,
    nsize: u64,
    script: &[u8],
) -> (Vec<u8>, Vec<u8>) {
    let mut key = vec![UTXO_RECORD_PREFIX];
    key.extend_from_slice(&txid_le);
    key.extend(varint::encode(vout));

    let w1 = (height << 1) | if coinbase { 1 } else { 0 };
    let mut value = varint::encode(w1);
    value.extend(varint::encode(amount::compress(amount_sats)));
    value.extend(varint::encode(nsize));
    value.extend_from_slice(script);
    (key, value)
}

/// Spec.md §8 scenario 1: the obfuscation-key record's value is a length
/// byte followed by the key material.
#[test]
fn obfuscation_key_record_is_captured_as_documented_in_the_spec() {
    let value = [0x08, 0xB1, 0x2D, 0xCE, 0xFD, 0x8F, 0x87, 0x25, 0x36];
    let key = ObfuscationKey::from_record_value(&value);
    assert_eq!(
        key,
        ObfuscationKey(vec![0xB1, 0x2D, 0xCE, 0xFD, 0x8F, 0x87, 0x25, 0x36])
    );
}

/// Spec.md §8 scenario 3: P2SH addresses use the per-network version byte.
#[test]
fn p2sh_utxo_decodes_to_a_network_specific_address() {
    let mut txid_le = [0u8; 32];
    txid_le[0] = 0x01;
    let script = [0x22u8; 20];
    let (key, value) = utxo_entry(txid_le, 0, 500_000, false, 1_000_000, 1, &script);

    let mainnet = record::decode(&key, &value, Network::Mainnet).unwrap();
    assert_eq!(mainnet.script_type.as_str(), "p2sh");
    assert!(mainnet.address.starts_with('3'));

    let testnet = record::decode(&key, &value, Network::Testnet).unwrap();
    assert!(testnet.address.starts_with('2'));
}

/// Spec.md §8 scenario 5/6: segwit v0 programs resolve to bech32 addresses
/// with the expected HRP and length.
#[test]
fn segwit_utxos_decode_to_bech32_addresses() {
    let mut txid_le = [0u8; 32];
    txid_le[5] = 0xAB;

    let mut p2wpkh_script = vec![0x00, 0x14];
    p2wpkh_script.extend([0x11u8; 20]);
    let (key, value) = utxo_entry(txid_le, 3, 700_000, true, 2_500_000, 28, &p2wpkh_script);
    let utxo = record::decode(&key, &value, Network::Mainnet).unwrap();
    assert_eq!(utxo.script_type.as_str(), "p2wpkh");
    assert!(utxo.address.starts_with("bc1q"));

    let mut p2wsh_script = vec![0x00, 0x20];
    p2wsh_script.extend([0x22u8; 32]);
    let (key, value) = utxo_entry(txid_le, 4, 700_001, false, 3_000_000, 40, &p2wsh_script);
    let utxo = record::decode(&key, &value, Network::Testnet).unwrap();
    assert_eq!(utxo.script_type.as_str(), "p2wsh");
    assert!(utxo.address.starts_with("tb1q"));
    assert_eq!(utxo.address.len(), 62);
}

/// Spec.md §8's aggregate scenario: a synthetic sequence of the
/// obfuscation-key record followed by N UTXOs, driven through the full
/// driver, ends with the right total and the right last `count`.
#[test]
fn aggregate_scan_totals_amounts_and_ends_count_at_n_minus_one() {
    let amounts = [1_000u64, 250_000, 99_999_999, 42];
    let mut entries = vec![(vec![OBFUSCATION_KEY_PREFIX], vec![0x00])];
    for (i, &amt) in amounts.iter().enumerate() {
        let mut txid_le = [0u8; 32];
        txid_le[0] = i as u8;
        entries.push(utxo_entry(txid_le, 0, 100 + i as u64, false, amt, 0, &[0u8; 20]));
    }

    let mut store = FixtureStore::new(entries);
    let columns = ColumnSet::default_all();
    let mut sink = Vec::new();
    let stats = driver::run(&mut store, &columns, Network::Mainnet, &mut sink, false, 0).unwrap();

    let expected_total: u64 = amounts.iter().sum();
    assert_eq!(stats.total_satoshis, Some(expected_total));
    assert_eq!(stats.total_utxos, amounts.len() as u64);

    let csv = String::from_utf8(sink).unwrap();
    let last_data_line = csv.lines().last().unwrap();
    let last_count: u64 = last_data_line.split(',').next().unwrap().parse().unwrap();
    assert_eq!(last_count, amounts.len() as u64 - 1);
}

/// Spec.md §8's column-gating property, exercised from outside the crate:
/// selecting only `txid,vout` must not require a value that would fail to
/// parse as a UTXO value at all.
#[test]
fn txid_vout_only_selection_tolerates_an_undecodable_value() {
    let columns = ColumnSet::parse("txid,vout").unwrap();
    assert!(!columns.contains(Column::Amount));
    assert!(!columns.needs_value_decode());

    let mut txid_le = [0u8; 32];
    txid_le[0] = 0x7F;
    let mut key = vec![UTXO_RECORD_PREFIX];
    key.extend_from_slice(&txid_le);
    key.extend(varint::encode(0));

    // A value that is not a valid encoded UTXO record at all (too short to
    // hold even the height/coinbase varint's continuation).
    let entries = vec![
        (vec![OBFUSCATION_KEY_PREFIX], vec![0x00]),
        (key, vec![0x80]),
    ];
    let mut store = FixtureStore::new(entries);
    let mut sink = Vec::new();
    let stats = driver::run(&mut store, &columns, Network::Mainnet, &mut sink, false, 0).unwrap();
    assert_eq!(stats.total_utxos, 1);
}

/// Spec.md §6: unknown column names are rejected before any iteration.
#[test]
fn unknown_column_name_is_rejected() {
    let err = ColumnSet::parse("txid,not_a_real_column").unwrap_err();
    assert!(err.to_string().contains("not_a_real_column"));
}
