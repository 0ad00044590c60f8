use std::{
  collections::BTreeMap,
  fs::{self, File, OpenOptions},
  path::{Path, PathBuf},
  sync::atomic::{AtomicUsize, Ordering},
};

use bytes::Bytes;
use fs2::FileExt;
use log::{error, info, warn};
use parking_lot::RwLock;

use crate::{
  errors::{Errors, Result},
  option::{IOManagerType, Options},
};

use super::{
  data_file::{get_data_file_name, DataFile, LogRecord},
  Store,
};

pub const FILE_LOCK_NAME: &str = "flock";

/// Bitcask-style store: every put appends a record to one data file and the
/// key directory keeps the offset of the latest record for each key.
pub struct LogStore {
  dir_path: PathBuf,
  sync_writes: bool,
  bytes_per_sync: usize,
  data_file: RwLock<DataFile>,
  keydir: RwLock<BTreeMap<Vec<u8>, u64>>,
  bytes_write: AtomicUsize,
  lock_file: File,
}

impl LogStore {
  pub fn open(opts: &Options) -> Result<Self> {
    let dir_path = opts.dir_path.clone();
    if !dir_path.is_dir() {
      if let Err(e) = fs::create_dir_all(&dir_path) {
        error!("create database directory err: {}", e);
        return Err(Errors::FailedToCreateDatabaseDir);
      }
    }

    let lock_file = match OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(false)
      .open(dir_path.join(FILE_LOCK_NAME))
    {
      Ok(file) => file,
      Err(e) => {
        error!("failed to open lock file: {}", e);
        return Err(Errors::FailedToOpenDataFile);
      }
    };
    if lock_file.try_lock_exclusive().is_err() {
      return Err(Errors::DatabaseIsUsing);
    }

    let startup_io = if opts.mmap_at_startup {
      IOManagerType::MemoryMap
    } else {
      IOManagerType::StandardFileIO
    };
    let mut data_file = DataFile::new(&dir_path, startup_io)?;

    let mut keydir = BTreeMap::new();
    let valid_off = load_keydir(&data_file, &mut keydir)?;

    let file_size = data_file.file_size();
    data_file.set_io_manager(&dir_path, IOManagerType::StandardFileIO)?;
    if valid_off < file_size {
      warn!(
        "discarding {} bytes of incomplete record at the tail of {:?}",
        file_size - valid_off,
        get_data_file_name(&dir_path)
      );
      truncate_data_file(&dir_path, valid_off)?;
    }
    data_file.set_write_off(valid_off);

    info!("opened log store at {:?} with {} keys", dir_path, keydir.len());

    Ok(LogStore {
      dir_path,
      sync_writes: opts.sync_writes,
      bytes_per_sync: opts.bytes_per_sync,
      data_file: RwLock::new(data_file),
      keydir: RwLock::new(keydir),
      bytes_write: AtomicUsize::new(0),
      lock_file,
    })
  }

  pub fn dir_path(&self) -> &Path {
    &self.dir_path
  }

  pub fn key_count(&self) -> usize {
    self.keydir.read().len()
  }
}

impl Store for LogStore {
  fn get(&self, key: &[u8]) -> Result<Bytes> {
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }

    let offset = match self.keydir.read().get(key) {
      Some(offset) => *offset,
      None => return Err(Errors::KeyNotFound),
    };

    self.data_file.read().read_value(offset)
  }

  fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }

    let record = LogRecord {
      key: key.to_vec(),
      value: value.to_vec(),
    };
    let enc_record = record.encode();
    let record_len = enc_record.len();

    let mut data_file = self.data_file.write();
    let offset = data_file.get_write_off();
    data_file.write(&enc_record)?;

    let previous = self.bytes_write.fetch_add(record_len, Ordering::SeqCst);
    let need_sync =
      self.sync_writes || (self.bytes_per_sync > 0 && previous + record_len >= self.bytes_per_sync);
    if need_sync {
      data_file.sync()?;
      self.bytes_write.store(0, Ordering::SeqCst);
    }

    self.keydir.write().insert(record.key, offset);
    Ok(())
  }

  fn sync(&self) -> Result<()> {
    self.data_file.read().sync()
  }
}

impl Drop for LogStore {
  fn drop(&mut self) {
    if let Err(e) = self.data_file.read().sync() {
      error!("failed to sync data file on close: {}", e);
    }
    if let Err(e) = FileExt::unlock(&self.lock_file) {
      error!("failed to unlock database directory: {}", e);
    }
  }
}

/// Replays the data file into `keydir` and returns the offset just past the
/// last complete record.
fn load_keydir(data_file: &DataFile, keydir: &mut BTreeMap<Vec<u8>, u64>) -> Result<u64> {
  let mut offset = 0;
  loop {
    let (record, size) = match data_file.read_log_record(offset) {
      Ok(result) => (result.record, result.size),
      Err(e) => {
        if e == Errors::ReadDataFileEOF {
          break;
        }
        return Err(e);
      }
    };

    keydir.insert(record.key, offset);
    offset += size as u64;
  }
  Ok(offset)
}

fn truncate_data_file(dir_path: &Path, len: u64) -> Result<()> {
  let file = match OpenOptions::new()
    .write(true)
    .open(get_data_file_name(dir_path))
  {
    Ok(file) => file,
    Err(e) => {
      error!("failed to open data file for truncation: {}", e);
      return Err(Errors::FailedToOpenDataFile);
    }
  };
  if let Err(e) = file.set_len(len) {
    error!("failed to truncate data file: {}", e);
    return Err(Errors::FailedToWriteToDataFile);
  }
  Ok(())
}
