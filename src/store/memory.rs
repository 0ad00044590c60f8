use bytes::Bytes;
use crossbeam_skiplist::SkipMap;

use crate::errors::{Errors, Result};

use super::Store;

/// Volatile store backed by a lock-free ordered map.
#[derive(Default)]
pub struct MemStore {
  map: SkipMap<Bytes, Bytes>,
}

impl MemStore {
  pub fn new() -> Self {
    Self {
      map: SkipMap::new(),
    }
  }
}

impl Store for MemStore {
  fn get(&self, key: &[u8]) -> Result<Bytes> {
    match self.map.get(key) {
      Some(entry) => Ok(entry.value().clone()),
      None => Err(Errors::KeyNotFound),
    }
  }

  fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }
    self.map.insert(key, value);
    Ok(())
  }

  fn sync(&self) -> Result<()> {
    Ok(())
  }
}
