use bytes::{Buf, Bytes, BytesMut};

use crate::{
  encoding::{get_bytes, get_i64, get_string, get_u64, put_bytes, put_i64, put_str, put_u64},
  errors::{Errors, Result},
};

use super::{index::ZSetIndex, skiplist::ZNodeValue};

/// Flattens an index into its stored snapshot: the entry count followed by
/// every entry from the highest rank down to the lowest.
pub fn encode_index(index: &ZSetIndex) -> Bytes {
  let mut buf = BytesMut::new();
  put_u64(&mut buf, index.len() as u64);
  for value in index.skiplist().iter_rev() {
    encode_node_value(&mut buf, value);
  }
  buf.freeze()
}

/// Rebuilds an index from a snapshot written by `encode_index`.
pub fn decode_index(data: Bytes) -> Result<ZSetIndex> {
  decode_into(data, ZSetIndex::new())
}

pub fn decode_index_with_seed(data: Bytes, seed: u64) -> Result<ZSetIndex> {
  decode_into(data, ZSetIndex::with_seed(seed))
}

fn decode_into(mut data: Bytes, mut index: ZSetIndex) -> Result<ZSetIndex> {
  let size = get_u64(&mut data)?;
  for _ in 0..size {
    let value = decode_node_value(&mut data)?;
    index.insert_node(value.score, &value.member, value.payload);
  }
  if index.len() as u64 != size {
    return Err(Errors::DecodeFailed(format!(
      "declared {} entries but decoded {} distinct members",
      size,
      index.len()
    )));
  }

  if data.has_remaining() {
    return Err(Errors::DecodeFailed(format!(
      "{} trailing bytes after {} entries",
      data.remaining(),
      size
    )));
  }
  Ok(index)
}

fn encode_node_value(buf: &mut BytesMut, value: &ZNodeValue) {
  put_i64(buf, value.score);
  put_str(buf, &value.member);
  put_bytes(buf, &value.payload);
}

fn decode_node_value(data: &mut Bytes) -> Result<ZNodeValue> {
  let score = get_i64(data)?;
  let member = get_string(data)?;
  let payload = get_bytes(data)?;
  Ok(ZNodeValue {
    score,
    member,
    payload,
  })
}
