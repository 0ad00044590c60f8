use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::encoding::{decode_varint, encode_varint, encoded_len_varint};

use crate::{
  errors::{Errors, Result},
  fio::{new_io_manager, IOManager},
  option::IOManagerType,
};

pub const DATA_FILE_NAME: &str = "flydb.data";

const CRC_SIZE: usize = std::mem::size_of::<u32>();

/// A single key/value write as laid out in the data file:
///
/// ```text
/// +----------+------------+-----+-------+-------+
/// | key size | value size | key | value | crc32 |
/// +----------+------------+-----+-------+-------+
///   varint     varint                     4 bytes LE
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
  pub key: Vec<u8>,
  pub value: Vec<u8>,
}

/// A record read back from disk together with its on-disk length.
#[derive(Debug)]
pub struct ReadLogRecord {
  pub record: LogRecord,
  pub size: usize,
}

impl LogRecord {
  pub fn encode(&self) -> Vec<u8> {
    let (enc_buf, _) = self.encode_and_get_crc();
    enc_buf
  }

  pub fn get_crc(&self) -> u32 {
    let (_, crc) = self.encode_and_get_crc();
    crc
  }

  fn encode_and_get_crc(&self) -> (Vec<u8>, u32) {
    let mut buf = BytesMut::with_capacity(self.encoded_length());

    encode_varint(self.key.len() as u64, &mut buf);
    encode_varint(self.value.len() as u64, &mut buf);
    buf.extend_from_slice(&self.key);
    buf.extend_from_slice(&self.value);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&buf);
    let crc = hasher.finalize();
    buf.put_u32_le(crc);

    (buf.to_vec(), crc)
  }

  fn encoded_length(&self) -> usize {
    encoded_len_varint(self.key.len() as u64)
      + encoded_len_varint(self.value.len() as u64)
      + self.key.len()
      + self.value.len()
      + CRC_SIZE
  }
}

pub fn max_log_record_header_size() -> usize {
  encoded_len_varint(u32::MAX as u64) * 2
}

/// The single append-only file a `LogStore` writes into.
pub struct DataFile {
  write_off: u64,
  io_manager: Box<dyn IOManager>,
}

impl DataFile {
  pub fn new<P>(dir_path: P, io_type: IOManagerType) -> Result<DataFile>
  where
    P: AsRef<Path>,
  {
    let file_name = get_data_file_name(&dir_path);
    let io_manager = new_io_manager(file_name, io_type)?;
    Ok(DataFile {
      write_off: 0,
      io_manager,
    })
  }

  pub fn get_write_off(&self) -> u64 {
    self.write_off
  }

  pub fn set_write_off(&mut self, offset: u64) {
    self.write_off = offset;
  }

  pub fn file_size(&self) -> u64 {
    self.io_manager.size()
  }

  /// Reads the record starting at `offset`.
  ///
  /// A record that runs past the end of the file, including a torn header,
  /// reads as `ReadDataFileEOF`; a complete record whose checksum does not
  /// match reads as `InvalidLogRecordCrc`.
  pub fn read_log_record(&self, offset: u64) -> Result<ReadLogRecord> {
    let file_size = self.io_manager.size();
    if offset >= file_size {
      return Err(Errors::ReadDataFileEOF);
    }

    let header_bytes = max_log_record_header_size().min((file_size - offset) as usize);
    let mut header_buf = BytesMut::zeroed(header_bytes);
    self.io_manager.read(&mut header_buf, offset)?;

    let mut header = header_buf.freeze();
    let key_size = decode_varint(&mut header).map_err(|_| Errors::ReadDataFileEOF)? as usize;
    let value_size = decode_varint(&mut header).map_err(|_| Errors::ReadDataFileEOF)? as usize;
    if key_size == 0 && value_size == 0 {
      return Err(Errors::ReadDataFileEOF);
    }

    let header_size = encoded_len_varint(key_size as u64) + encoded_len_varint(value_size as u64);
    let total_size = header_size + key_size + value_size + CRC_SIZE;
    if offset + total_size as u64 > file_size {
      return Err(Errors::ReadDataFileEOF);
    }

    let mut record_buf = BytesMut::zeroed(total_size);
    self.io_manager.read(&mut record_buf, offset)?;
    let mut record = record_buf.freeze();

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&record[..total_size - CRC_SIZE]);
    let crc = hasher.finalize();

    record.advance(header_size);
    let key = record.split_to(key_size);
    let value = record.split_to(value_size);
    if crc != record.get_u32_le() {
      return Err(Errors::InvalidLogRecordCrc);
    }

    Ok(ReadLogRecord {
      record: LogRecord {
        key: key.to_vec(),
        value: value.to_vec(),
      },
      size: total_size,
    })
  }

  /// Reads just the value of the record at `offset`.
  pub fn read_value(&self, offset: u64) -> Result<Bytes> {
    let read = self.read_log_record(offset)?;
    Ok(Bytes::from(read.record.value))
  }

  pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
    let n_bytes = self.io_manager.write(buf)?;
    self.write_off += n_bytes as u64;
    Ok(n_bytes)
  }

  pub fn sync(&self) -> Result<()> {
    self.io_manager.sync()
  }

  pub fn set_io_manager<P>(&mut self, dir_path: P, io_type: IOManagerType) -> Result<()>
  where
    P: AsRef<Path>,
  {
    self.io_manager = new_io_manager(get_data_file_name(dir_path), io_type)?;
    Ok(())
  }
}

pub fn get_data_file_name<P>(dir_path: P) -> PathBuf
where
  P: AsRef<Path>,
{
  dir_path.as_ref().join(DATA_FILE_NAME)
}
