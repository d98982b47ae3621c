//! Scans the chainstate once, threading the obfuscation key and the
//! selected column set explicitly through the iteration (spec §9: neither
//! is process-wide state), and emits one CSV row per UTXO.

use std::collections::HashMap;
use std::io::Write;

use tracing::info;

use crate::decoder::address::Network;
use crate::decoder::obfuscation::ObfuscationKey;
use crate::decoder::record::{self, OBFUSCATION_KEY_PREFIX, UTXO_RECORD_PREFIX};
use crate::errors::{AppError, AppResult};
use crate::store::ChainstateStore;

/// One of the ten CSV columns a user can select via `--f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Count,
    Txid,
    Vout,
    Height,
    Coinbase,
    Amount,
    Nsize,
    Script,
    Type,
    Address,
}

impl Column {
    fn name(self) -> &'static str {
        match self {
            Column::Count => "count",
            Column::Txid => "txid",
            Column::Vout => "vout",
            Column::Height => "height",
            Column::Coinbase => "coinbase",
            Column::Amount => "amount",
            Column::Nsize => "nsize",
            Column::Script => "script",
            Column::Type => "type",
            Column::Address => "address",
        }
    }

    fn parse(name: &str) -> Option<Column> {
        Some(match name {
            "count" => Column::Count,
            "txid" => Column::Txid,
            "vout" => Column::Vout,
            "height" => Column::Height,
            "coinbase" => Column::Coinbase,
            "amount" => Column::Amount,
            "nsize" => Column::Nsize,
            "script" => Column::Script,
            "type" => Column::Type,
            "address" => Column::Address,
            _ => return None,
        })
    }

    /// Columns that require the value bytes to be deobfuscated and parsed
    /// at all. `count`, `txid`, and `vout` come from the key alone.
    fn needs_value_decode(self) -> bool {
        matches!(
            self,
            Column::Height
                | Column::Coinbase
                | Column::Amount
                | Column::Nsize
                | Column::Script
                | Column::Type
                | Column::Address
        )
    }
}

/// The immutable, user-selected output column list, computed once before
/// iteration begins.
#[derive(Debug, Clone)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    /// Parses a comma-separated column list, rejecting unknown names.
    pub fn parse(spec: &str) -> AppResult<Self> {
        let columns = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| Column::parse(name).ok_or_else(|| AppError::BadColumnName(name.to_string())))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// The full default column set, in spec order.
    pub fn default_all() -> Self {
        Self {
            columns: vec![
                Column::Count,
                Column::Txid,
                Column::Vout,
                Column::Height,
                Column::Coinbase,
                Column::Amount,
                Column::Nsize,
                Column::Script,
                Column::Type,
                Column::Address,
            ],
        }
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn needs_value_decode(&self) -> bool {
        self.columns.iter().any(|c| c.needs_value_decode())
    }

    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }
}

/// Aggregate counters gathered over the whole scan. Totals that depend on
/// decoding the value (satoshis, per-class counts) are only populated when
/// the corresponding column was selected, matching the short-circuit.
#[derive(Debug, Default)]
pub struct DumpStats {
    pub total_utxos: u64,
    pub total_satoshis: Option<u64>,
    pub per_class: Option<HashMap<&'static str, u64>>,
}

/// Runs a single pass over `store`, writing CSV rows to `sink`.
pub fn run(
    store: &mut dyn ChainstateStore,
    columns: &ColumnSet,
    network: Network,
    sink: &mut dyn Write,
    echo: bool,
    progress_interval: usize,
) -> AppResult<DumpStats> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    write_preamble(&mut writer, columns)?;
    writer.write_record(columns.header())?;
    flush_writer(&mut writer, sink, echo)?;

    let mut obfuscation_key = ObfuscationKey::default();
    let mut stats = DumpStats::default();
    if columns.contains(Column::Amount) {
        stats.total_satoshis = Some(0);
    }
    if columns.contains(Column::Type) {
        stats.per_class = Some(HashMap::new());
    }

    let mut count: u64 = 0;
    while let Some((key, value)) = store.next_entry() {
        match key.first() {
            Some(&OBFUSCATION_KEY_PREFIX) => {
                obfuscation_key = ObfuscationKey::from_record_value(&value);
            }
            Some(&UTXO_RECORD_PREFIX) => {
                let (row, decoded) = decode_row(
                    &key,
                    &value,
                    &obfuscation_key,
                    columns,
                    network,
                    count,
                )?;
                writer.write_record(&row)?;
                flush_writer(&mut writer, sink, echo)?;

                if let Some(utxo) = &decoded {
                    if let Some(total) = stats.total_satoshis.as_mut() {
                        *total = total
                            .checked_add(utxo.amount)
                            .ok_or(crate::decoder::DecoderError::AmountOverflow)?;
                    }
                    if let Some(per_class) = stats.per_class.as_mut() {
                        *per_class.entry(utxo.script_type.as_str()).or_insert(0) += 1;
                    }
                }

                count += 1;
                stats.total_utxos = count;
                if progress_interval > 0 && count % progress_interval as u64 == 0 {
                    info!(records = count, "scanning chainstate");
                }
            }
            _ => {}
        }
    }

    Ok(stats)
}

fn flush_writer(
    writer: &mut csv::Writer<Vec<u8>>,
    sink: &mut dyn Write,
    echo: bool,
) -> AppResult<()> {
    writer.flush()?;
    let buf = writer.get_mut();
    if echo {
        std::io::stdout().write_all(buf)?;
    }
    sink.write_all(buf)?;
    buf.clear();
    Ok(())
}

fn write_preamble(writer: &mut csv::Writer<Vec<u8>>, columns: &ColumnSet) -> AppResult<()> {
    let now = chrono::Utc::now().to_rfc3339();
    writer.write_record([format!("# chainstate-dump")])?;
    writer.write_record([format!("# Generated: {now}")])?;
    writer.write_record([format!("# Fields: {}", columns.header().join(","))])?;
    Ok(())
}

/// Decodes one CSV row in the user's selected column order. Columns that
/// don't need the value at all (`count`, `txid`, `vout`) never touch the
/// deobfuscated bytes. Returns the decoded `Utxo` alongside the row so the
/// caller's stats aggregation can reuse it instead of decoding again.
fn decode_row(
    key: &[u8],
    value: &[u8],
    obfuscation_key: &ObfuscationKey,
    columns: &ColumnSet,
    network: Network,
    count: u64,
) -> AppResult<(Vec<String>, Option<record::Utxo>)> {
    let (txid, vout) = record::decode_key(key)?;

    let decoded = if columns.needs_value_decode() {
        let deobfuscated = obfuscation_key.deobfuscate(value);
        Some(record::decode(key, &deobfuscated, network)?)
    } else {
        None
    };

    let mut row = Vec::with_capacity(10);
    for column in &columns.columns {
        let field = match column {
            Column::Count => count.to_string(),
            Column::Txid => hex::encode(txid),
            Column::Vout => vout.to_string(),
            Column::Height => decoded.as_ref().map(|u| u.height.to_string()).unwrap_or_default(),
            Column::Coinbase => decoded
                .as_ref()
                .map(|u| if u.coinbase { "1".to_string() } else { "0".to_string() })
                .unwrap_or_default(),
            Column::Amount => decoded.as_ref().map(|u| u.amount.to_string()).unwrap_or_default(),
            Column::Nsize => decoded.as_ref().map(|u| u.nsize.to_string()).unwrap_or_default(),
            Column::Script => decoded.as_ref().map(|u| hex::encode(&u.script)).unwrap_or_default(),
            Column::Type => decoded.as_ref().map(|u| u.script_type.to_string()).unwrap_or_default(),
            Column::Address => decoded.as_ref().map(|u| u.address.clone()).unwrap_or_default(),
        };
        row.push(field);
    }
    Ok((row, decoded))
}
