//! Binary primitives shared by every structure that flattens itself into a
//! store value: varint integers, zig-zag signed integers, and length-delimited
//! byte strings.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::encoding::{decode_varint, encode_varint};

use crate::errors::{Errors, Result};

pub fn put_u64(buf: &mut BytesMut, value: u64) {
  encode_varint(value, buf);
}

pub fn put_i64(buf: &mut BytesMut, value: i64) {
  encode_varint(((value << 1) ^ (value >> 63)) as u64, buf);
}

pub fn put_bytes(buf: &mut BytesMut, value: &[u8]) {
  encode_varint(value.len() as u64, buf);
  buf.put_slice(value);
}

pub fn put_str(buf: &mut BytesMut, value: &str) {
  put_bytes(buf, value.as_bytes());
}

pub fn get_u64(buf: &mut Bytes) -> Result<u64> {
  decode_varint(buf).map_err(|e| Errors::DecodeFailed(e.to_string()))
}

pub fn get_i64(buf: &mut Bytes) -> Result<i64> {
  let n = get_u64(buf)?;
  Ok(((n >> 1) as i64) ^ -((n & 1) as i64))
}

pub fn get_bytes(buf: &mut Bytes) -> Result<Bytes> {
  let len = get_u64(buf)?;
  if len > buf.remaining() as u64 {
    return Err(Errors::DecodeFailed(format!(
      "length {} exceeds remaining {} bytes",
      len,
      buf.remaining()
    )));
  }
  Ok(buf.split_to(len as usize))
}

pub fn get_string(buf: &mut Bytes) -> Result<String> {
  let raw = get_bytes(buf)?;
  String::from_utf8(raw.to_vec()).map_err(|e| Errors::DecodeFailed(e.to_string()))
}
