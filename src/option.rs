use lazy_static::lazy_static;
use std::path::PathBuf;

lazy_static! {
  pub static ref DEFAULT_DIR_PATH: PathBuf = std::env::temp_dir().join("flydb");
}

pub const DEFAULT_KEY_LOCK_SHARDS: usize = 64;

#[derive(Debug, Clone)]
pub struct Options {
  pub dir_path: PathBuf,

  pub store_type: StoreType,

  pub sync_writes: bool,

  pub bytes_per_sync: usize,

  pub mmap_at_startup: bool,

  /// Number of lock stripes guarding per-key load/mutate/store sequences.
  pub key_lock_shards: usize,
}

/// Backing byte store the sorted sets are persisted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
  /// Append-only data file with an in-memory key directory.
  Log,

  /// Volatile ordered map, nothing touches disk.
  Memory,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      dir_path: DEFAULT_DIR_PATH.clone(),
      store_type: StoreType::Log,
      sync_writes: false,
      bytes_per_sync: 0,
      mmap_at_startup: true,
      key_lock_shards: DEFAULT_KEY_LOCK_SHARDS,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOManagerType {
  StandardFileIO,

  MemoryMap,
}
