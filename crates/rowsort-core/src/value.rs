//! The typed-value contract external to this crate, expressed as a trait
//! rather than a fixed type, plus one concrete implementation.
//!
//! `Value` covers the usual scalar variant set with a fixed mixed-type
//! ordering rule, but it sits behind `Datum` so the sort engine itself
//! never hardcodes a value representation.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::{Error, Result};

/// A typed value a sorter can compare and (de)serialize, plus a statement
/// context threaded through every comparison.
///
/// Implementations must be self-delimiting: `decode` consumes exactly one
/// value's worth of bytes and returns the unconsumed tail.
pub trait Datum: Clone + Debug + Sized {
    /// Opaque context handle passed to every comparison (a "statement
    /// context" — e.g. collation rules for string columns).
    type Ctx;

    fn compare(ctx: &Self::Ctx, a: &Self, b: &Self) -> Result<Ordering>;

    fn encode(&self, out: &mut Vec<u8>);

    fn decode(bytes: &[u8]) -> Result<(Self, &[u8])>;

    /// Build the trailing handle value for a row block.
    fn from_i64(v: i64) -> Self;

    /// Read the trailing handle value back out, if this value is
    /// integer-typed.
    fn as_i64(&self) -> Option<i64>;
}

/// Concrete `Datum` shipped with this crate: the usual set of scalar
/// column types plus a NaN-safe total ordering for the float variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
}

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_I32: u8 = 2;
const TAG_I64: u8 = 3;
const TAG_F32: u8 = 4;
const TAG_F64: u8 = 5;
const TAG_STR: u8 = 6;
const TAG_BIN: u8 = 7;

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::I32(_) => 2,
        Value::I64(_) => 3,
        Value::F32(_) => 4,
        Value::F64(_) => 5,
        Value::Str(_) => 6,
        Value::Bin(_) => 7,
    }
}

fn take<'a>(bytes: &'a [u8], n: usize) -> Result<(&'a [u8], &'a [u8])> {
    if bytes.len() < n {
        return Err(Error::Codec(format!(
            "short value read: need {n} bytes, have {}",
            bytes.len()
        )));
    }
    Ok(bytes.split_at(n))
}

impl Datum for Value {
    type Ctx = ();

    fn compare(_ctx: &(), a: &Value, b: &Value) -> Result<Ordering> {
        use Value::*;
        let ord = match (a, b) {
            (Null, Null) => Ordering::Equal,
            (Bool(x), Bool(y)) => x.cmp(y),
            (I32(x), I32(y)) => x.cmp(y),
            (I64(x), I64(y)) => x.cmp(y),
            (F32(x), F32(y)) => f32_total_cmp(*x, *y),
            (F64(x), F64(y)) => f64_total_cmp(*x, *y),
            (Str(x), Str(y)) => x.cmp(y),
            (Bin(x), Bin(y)) => x.cmp(y),
            // Mixed types: Null sorts first, otherwise order by a fixed
            // type rank (never mixes numeric/string comparisons).
            _ => type_rank(a).cmp(&type_rank(b)),
        };
        Ok(ord)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Value::Null => out.push(TAG_NULL),
            Value::Bool(b) => {
                out.push(TAG_BOOL);
                out.push(*b as u8);
            }
            Value::I32(v) => {
                out.push(TAG_I32);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Value::I64(v) => {
                out.push(TAG_I64);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Value::F32(v) => {
                out.push(TAG_F32);
                out.extend_from_slice(&v.to_bits().to_be_bytes());
            }
            Value::F64(v) => {
                out.push(TAG_F64);
                out.extend_from_slice(&v.to_bits().to_be_bytes());
            }
            Value::Str(s) => {
                out.push(TAG_STR);
                out.extend_from_slice(&(s.len() as u32).to_be_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            Value::Bin(b) => {
                out.push(TAG_BIN);
                out.extend_from_slice(&(b.len() as u32).to_be_bytes());
                out.extend_from_slice(b);
            }
        }
    }

    fn decode(bytes: &[u8]) -> Result<(Value, &[u8])> {
        let (tag, rest) = take(bytes, 1)?;
        match tag[0] {
            TAG_NULL => Ok((Value::Null, rest)),
            TAG_BOOL => {
                let (b, rest) = take(rest, 1)?;
                Ok((Value::Bool(b[0] != 0), rest))
            }
            TAG_I32 => {
                let (b, rest) = take(rest, 4)?;
                Ok((Value::I32(i32::from_be_bytes(b.try_into().unwrap())), rest))
            }
            TAG_I64 => {
                let (b, rest) = take(rest, 8)?;
                Ok((Value::I64(i64::from_be_bytes(b.try_into().unwrap())), rest))
            }
            TAG_F32 => {
                let (b, rest) = take(rest, 4)?;
                let bits = u32::from_be_bytes(b.try_into().unwrap());
                Ok((Value::F32(f32::from_bits(bits)), rest))
            }
            TAG_F64 => {
                let (b, rest) = take(rest, 8)?;
                let bits = u64::from_be_bytes(b.try_into().unwrap());
                Ok((Value::F64(f64::from_bits(bits)), rest))
            }
            TAG_STR => {
                let (len, rest) = take(rest, 4)?;
                let len = u32::from_be_bytes(len.try_into().unwrap()) as usize;
                let (data, rest) = take(rest, len)?;
                let s = String::from_utf8(data.to_vec())
                    .map_err(|e| Error::Codec(format!("invalid utf8: {e}")))?;
                Ok((Value::Str(s), rest))
            }
            TAG_BIN => {
                let (len, rest) = take(rest, 4)?;
                let len = u32::from_be_bytes(len.try_into().unwrap()) as usize;
                let (data, rest) = take(rest, len)?;
                Ok((Value::Bin(data.to_vec()), rest))
            }
            other => Err(Error::Codec(format!("unknown value tag {other}"))),
        }
    }

    fn from_i64(v: i64) -> Self {
        Value::I64(v)
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            Value::I32(v) => Some(*v as i64),
            _ => None,
        }
    }
}

fn f32_total_cmp(a: f32, b: f32) -> Ordering {
    if a.is_nan() && b.is_nan() {
        Ordering::Equal
    } else if a.is_nan() {
        Ordering::Greater
    } else if b.is_nan() {
        Ordering::Less
    } else {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }
}

fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    if a.is_nan() && b.is_nan() {
        Ordering::Equal
    } else if a.is_nan() {
        Ordering::Greater
    } else if b.is_nan() {
        Ordering::Less
    } else {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: Value) {
        let mut buf = Vec::new();
        v.encode(&mut buf);
        let (decoded, rest) = Value::decode(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, v);
    }

    #[test]
    fn roundtrips_every_variant() {
        roundtrip(Value::Null);
        roundtrip(Value::Bool(true));
        roundtrip(Value::I32(-7));
        roundtrip(Value::I64(i64::MIN));
        roundtrip(Value::F32(1.5));
        roundtrip(Value::F64(-2.25));
        roundtrip(Value::Str("hello".into()));
        roundtrip(Value::Bin(vec![1, 2, 3]));
    }

    #[test]
    fn short_read_is_an_error() {
        assert!(Value::decode(&[TAG_I64, 0, 0]).is_err());
        assert!(Value::decode(&[]).is_err());
    }

    #[test]
    fn handle_roundtrip() {
        let v = Value::from_i64(-42);
        assert_eq!(v.as_i64(), Some(-42));
        assert_eq!(Value::Str("x".into()).as_i64(), None);
    }

    #[test]
    fn mixed_type_order_is_total() {
        assert_eq!(
            Value::compare(&(), &Value::Null, &Value::I32(0)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::compare(&(), &Value::Bool(true), &Value::Str("a".into())).unwrap(),
            Ordering::Less
        );
    }
}
