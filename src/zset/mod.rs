//! Redis-style sorted sets persisted as whole-set snapshots.
//!
//! Every call loads the snapshot stored under the key, applies the change to
//! an in-memory `ZSetIndex` and writes the full snapshot back. Mutating calls
//! hold a per-key lock across that cycle.

pub mod codec;
pub mod index;
mod lock;
pub mod skiplist;

use std::sync::Arc;

use bytes::Bytes;
use log::debug;

use crate::{
  errors::{Errors, Result},
  option::{Options, DEFAULT_KEY_LOCK_SHARDS},
  store::{open_store, Store},
};

use self::{
  codec::{decode_index, encode_index},
  index::ZSetIndex,
  lock::KeyLocks,
  skiplist::ZNodeValue,
};

pub struct ZSetEngine {
  store: Arc<dyn Store>,
  locks: KeyLocks,
}

impl ZSetEngine {
  /// Opens the store described by `opts` and layers sorted sets over it.
  pub fn open(opts: Options) -> Result<Self> {
    let store = open_store(&opts)?;
    Ok(Self {
      store: Arc::from(store),
      locks: KeyLocks::new(opts.key_lock_shards),
    })
  }

  pub fn new(store: Arc<dyn Store>) -> Self {
    Self {
      store,
      locks: KeyLocks::new(DEFAULT_KEY_LOCK_SHARDS),
    }
  }

  /// Adds `member` with `score`, creating the set if `key` does not exist.
  ///
  /// Nothing is written when the member is already stored with the same score
  /// and payload.
  pub fn zadd(&self, key: &str, score: i64, member: &str, payload: Bytes) -> Result<()> {
    check_key(key)?;
    let _guard = self.locks.lock(key);

    let mut index = self.load_or_create(key)?;
    if let Some(stored) = index.get(member) {
      if stored.score == score && stored.payload == payload {
        return Ok(());
      }
    }

    index.insert_node(score, member, payload);
    self.persist(key, &index)
  }

  /// Adds several members under a single load and store.
  pub fn zadds(&self, key: &str, values: Vec<ZNodeValue>) -> Result<()> {
    check_key(key)?;
    let _guard = self.locks.lock(key);

    let mut index = self.load_or_create(key)?;
    let mut changed = false;
    for value in values {
      let unchanged = index
        .get(&value.member)
        .is_some_and(|stored| stored.score == value.score && stored.payload == value.payload);
      if !unchanged {
        index.insert_node(value.score, &value.member, value.payload);
        changed = true;
      }
    }

    if !changed {
      return Ok(());
    }
    self.persist(key, &index)
  }

  pub fn zrem(&self, key: &str, member: &str) -> Result<()> {
    check_key(key)?;
    let _guard = self.locks.lock(key);

    let mut index = self.load(key)?;
    index.remove_node(member)?;
    self.persist(key, &index)
  }

  /// Removes several members at once. Fails with `KeyNotFound` without
  /// removing anything if any of them is absent.
  pub fn zrems(&self, key: &str, members: &[&str]) -> Result<()> {
    check_key(key)?;
    let _guard = self.locks.lock(key);

    let mut index = self.load(key)?;
    if members.iter().any(|member| index.get(member).is_none()) {
      return Err(Errors::KeyNotFound);
    }
    for member in members {
      // a member listed twice is already gone the second time
      if index.get(member).is_some() {
        index.remove_node(member)?;
      }
    }
    self.persist(key, &index)
  }

  pub fn zscore(&self, key: &str, member: &str) -> Result<i64> {
    check_key(key)?;
    let index = self.load(key)?;
    index
      .get(member)
      .map(|value| value.score)
      .ok_or(Errors::KeyNotFound)
  }

  /// 0-based position of `member` in ascending score order.
  pub fn zrank(&self, key: &str, member: &str) -> Result<usize> {
    check_key(key)?;
    let index = self.load(key)?;
    index.rank(member).ok_or(Errors::KeyNotFound)
  }

  /// 0-based position of `member` in descending score order.
  pub fn zrevrank(&self, key: &str, member: &str) -> Result<usize> {
    check_key(key)?;
    let index = self.load(key)?;
    index.rev_rank(member).ok_or(Errors::KeyNotFound)
  }

  /// Entries ranked `start..=end` in ascending order.
  pub fn zrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<ZNodeValue>> {
    check_key(key)?;
    let index = self.load(key)?;
    Ok(index.range(start, end, false))
  }

  /// Entries ranked `start..=end`, returned from `end` down to `start`.
  pub fn zrevrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<ZNodeValue>> {
    check_key(key)?;
    let index = self.load(key)?;
    Ok(index.range(start, end, true))
  }

  pub fn zcard(&self, key: &str) -> Result<usize> {
    check_key(key)?;
    let index = self.load(key)?;
    Ok(index.len())
  }

  /// Applies `stored score + delta` through `ZSetIndex::insert_node` and
  /// returns the score stored afterwards. Because a changed score only
  /// refreshes the payload, a non-zero delta leaves the stored score as is.
  pub fn zincrby(&self, key: &str, member: &str, delta: i64) -> Result<i64> {
    check_key(key)?;
    let _guard = self.locks.lock(key);

    let mut index = self.load(key)?;
    let stored = index.get(member).cloned().ok_or(Errors::KeyNotFound)?;
    let new_score = stored
      .score
      .checked_add(delta)
      .ok_or(Errors::ScoreOverflow)?;

    index.insert_node(new_score, member, stored.payload);
    self.persist(key, &index)?;

    index
      .get(member)
      .map(|value| value.score)
      .ok_or(Errors::KeyNotFound)
  }

  pub fn sync(&self) -> Result<()> {
    self.store.sync()
  }

  fn load(&self, key: &str) -> Result<ZSetIndex> {
    let data = self.store.get(key.as_bytes())?;
    decode_index(data)
  }

  fn load_or_create(&self, key: &str) -> Result<ZSetIndex> {
    match self.load(key) {
      Ok(index) => Ok(index),
      Err(Errors::KeyNotFound) => {
        debug!("creating sorted set {}", key);
        Ok(ZSetIndex::new())
      }
      Err(e) => Err(e),
    }
  }

  fn persist(&self, key: &str, index: &ZSetIndex) -> Result<()> {
    self
      .store
      .put(Bytes::copy_from_slice(key.as_bytes()), encode_index(index))
  }
}

fn check_key(key: &str) -> Result<()> {
  if key.is_empty() {
    return Err(Errors::KeyIsEmpty);
  }
  Ok(())
}
