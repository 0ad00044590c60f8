//! Byte stores a sorted set snapshot is persisted into.

pub mod data_file;
pub mod log;
pub mod memory;

use bytes::Bytes;

use crate::{
  errors::{Errors, Result},
  option::{Options, StoreType},
};

use self::{log::LogStore, memory::MemStore};

/// Opaque byte map the sorted sets are layered over.
pub trait Store: Sync + Send {
  /// Returns the value stored under `key`, or `Errors::KeyNotFound`.
  fn get(&self, key: &[u8]) -> Result<Bytes>;

  /// Stores `value` under `key`, replacing any previous value.
  fn put(&self, key: Bytes, value: Bytes) -> Result<()>;

  /// Flushes buffered writes to durable storage.
  fn sync(&self) -> Result<()>;
}

/// Opens the store configured by `options`.
pub fn open_store(options: &Options) -> Result<Box<dyn Store>> {
  if let Some(e) = check_options(options) {
    return Err(e);
  }

  match options.store_type {
    StoreType::Log => Ok(Box::new(LogStore::open(options)?)),
    StoreType::Memory => Ok(Box::new(MemStore::new())),
  }
}

fn check_options(opts: &Options) -> Option<Errors> {
  let dir_path = opts.dir_path.to_str();
  if opts.store_type == StoreType::Log && dir_path.map_or(true, str::is_empty) {
    return Some(Errors::DirPathIsEmpty);
  }

  if opts.key_lock_shards == 0 {
    return Some(Errors::InvalidLockShards);
  }

  None
}
