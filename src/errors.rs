use std::result;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Errors {
  #[error("failed to read from data file")]
  FailedToReadFromDataFile,

  #[error("failed to write to data file")]
  FailedToWriteToDataFile,

  #[error("failed to sync data file")]
  FailedToSyncDataFile,

  #[error("failed to open data file")]
  FailedToOpenDataFile,

  #[error("the key is empty")]
  KeyIsEmpty,

  #[error("key is not found in database")]
  KeyNotFound,

  #[error("read data file eof")]
  ReadDataFileEOF,

  #[error("invalid crc value, log record maybe corrupted")]
  InvalidLogRecordCrc,

  #[error("database dir path can not be empty")]
  DirPathIsEmpty,

  #[error("failed to create the database directory")]
  FailedToCreateDatabaseDir,

  #[error("the database directory is used by another process")]
  DatabaseIsUsing,

  #[error("key lock shard count must be greater than 0")]
  InvalidLockShards,

  #[error("score increment overflows")]
  ScoreOverflow,

  #[error("failed to decode stored value: {0}")]
  DecodeFailed(String),
}

pub type Result<T> = result::Result<T, Errors>;
