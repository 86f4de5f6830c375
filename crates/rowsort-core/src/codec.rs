//! Row block framing.
//!
//! A row block is an 8-byte big-endian payload length followed by the
//! concatenated codec encodings of the key columns, the value columns, and
//! finally the handle as an integer-typed value. No magic number, no codec
//! tag, no checksum — run files are never read by anything but this crate,
//! so the header shrinks to just the length.

use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Datum;

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 8;

/// Encode a row's payload: key columns, then value columns, then the handle
/// as an integer-typed value. Does not include the length prefix — callers
/// that need the full block (prefix + payload) should use [`encode_block`].
pub fn encode_payload<D: Datum>(row: &Row<D>) -> Vec<u8> {
    let mut buf = Vec::new();
    for v in &row.key {
        v.encode(&mut buf);
    }
    for v in &row.val {
        v.encode(&mut buf);
    }
    D::from_i64(row.handle).encode(&mut buf);
    buf
}

/// Encode a full row block: 8-byte big-endian length, then the payload.
pub fn encode_block<D: Datum>(row: &Row<D>) -> Vec<u8> {
    let payload = encode_payload(row);
    let mut block = Vec::with_capacity(HEADER_LEN + payload.len());
    block.extend_from_slice(&(payload.len() as u64).to_be_bytes());
    block.extend_from_slice(&payload);
    block
}

/// Decode a row payload (no length prefix) into `(key, val, handle)`.
///
/// Fails with [`Error::MalformedRun`] when the payload does not decode into
/// exactly `k + v + 1` values, or the trailing value is not integer-typed.
pub fn decode_payload<D: Datum>(payload: &[u8], k: usize, v: usize) -> Result<Row<D>> {
    let total = k + v + 1;
    let mut values = Vec::with_capacity(total);
    let mut rest = payload;
    for _ in 0..total {
        let (value, tail) = D::decode(rest)
            .map_err(|e| Error::MalformedRun(format!("decoding value: {e}")))?;
        values.push(value);
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(Error::MalformedRun(format!(
            "{} trailing bytes after {total} values",
            rest.len()
        )));
    }

    let handle_value = values.pop().expect("total >= 1");
    let handle = handle_value
        .as_i64()
        .ok_or_else(|| Error::MalformedRun("trailing value is not integer-typed".into()))?;

    let val = values.split_off(k);
    let key = values;
    Ok(Row::new(key, val, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn block_roundtrips() {
        let row: Row<Value> = Row::new(
            vec![Value::I64(7), Value::Str("k".into())],
            vec![Value::Bool(true)],
            -99,
        );
        let block = encode_block(&row);
        let len = u64::from_be_bytes(block[..HEADER_LEN].try_into().unwrap()) as usize;
        assert_eq!(len, block.len() - HEADER_LEN);

        let decoded: Row<Value> = decode_payload(&block[HEADER_LEN..], 2, 1).unwrap();
        assert_eq!(decoded.key, row.key);
        assert_eq!(decoded.val, row.val);
        assert_eq!(decoded.handle, row.handle);
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let row: Row<Value> = Row::new(vec![Value::I64(1)], vec![Value::I64(2)], 3);
        let payload = encode_payload(&row);
        // Declare k=2 when only 1 key column was encoded: arity mismatch.
        assert!(decode_payload::<Value>(&payload, 2, 1).is_err());
    }

    #[test]
    fn non_integer_handle_is_malformed() {
        // Hand-build a payload whose last value is a string, not integer-typed.
        let mut payload = Vec::new();
        Value::I64(1).encode(&mut payload);
        Value::Str("not a handle".into()).encode(&mut payload);
        assert!(decode_payload::<Value>(&payload, 1, 0).is_err());
    }
}
