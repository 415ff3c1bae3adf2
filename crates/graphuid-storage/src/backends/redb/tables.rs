//! Physical key layout.
//!
//! redb wants table definitions known at compile time, while the graph and the
//! identifier index create logical tables on the fly (one per index name). All
//! of them therefore share [`DATA_TABLE`], and each physical key is
//! `<logical table name> 0x00 <logical key>`. Table names never contain NUL,
//! so the first NUL always ends the name.

use redb::TableDefinition;

/// Single physical table holding every logical table.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> = TableDefinition::new("graphuid_data");

/// Ends the table name inside a physical key.
pub const KEY_SEPARATOR: u8 = 0x00;

fn with_tail(table: &str, tail: &[u8]) -> Vec<u8> {
    [table.as_bytes(), tail].concat()
}

/// Physical key of `key` in `table`.
pub fn encode_key(table: &str, key: &[u8]) -> Vec<u8> {
    let mut physical = with_tail(table, &[KEY_SEPARATOR]);
    physical.extend_from_slice(key);
    physical
}

/// Split a physical key back into table name and logical key.
pub fn decode_key(physical: &[u8]) -> Option<(&str, &[u8])> {
    let split = physical.iter().position(|&b| b == KEY_SEPARATOR)?;
    let (name, rest) = physical.split_at(split);
    Some((std::str::from_utf8(name).ok()?, &rest[1..]))
}

/// Inclusive lower bound of `table`.
pub fn table_start_key(table: &str) -> Vec<u8> {
    with_tail(table, &[KEY_SEPARATOR])
}

/// Exclusive upper bound of `table`.
pub fn table_end_key(table: &str) -> Vec<u8> {
    with_tail(table, &[KEY_SEPARATOR + 1])
}
