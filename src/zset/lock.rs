use std::{
  collections::hash_map::DefaultHasher,
  hash::{Hash, Hasher},
};

use parking_lot::{Mutex, MutexGuard};

/// Striped mutexes serializing the load/mutate/store cycle of each key.
/// Distinct keys may share a stripe; that only costs parallelism.
pub(crate) struct KeyLocks {
  shards: Vec<Mutex<()>>,
}

impl KeyLocks {
  pub(crate) fn new(num_shards: usize) -> Self {
    let mut shards = Vec::with_capacity(num_shards);
    for _ in 0..num_shards {
      shards.push(Mutex::new(()));
    }
    Self { shards }
  }

  pub(crate) fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
    self.shards[self.shard_num(key)].lock()
  }

  fn shard_num(&self, key: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish() as usize % self.shards.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_same_key_same_shard() {
    let locks = KeyLocks::new(16);
    assert_eq!(locks.shard_num("zset"), locks.shard_num("zset"));
    assert!(locks.shard_num("other") < 16);
  }

  #[test]
  fn test_lock_is_exclusive_per_key() {
    let locks = KeyLocks::new(4);
    let guard = locks.lock("zset");
    assert!(locks.shards[locks.shard_num("zset")].try_lock().is_none());
    drop(guard);
    assert!(locks.shards[locks.shard_num("zset")].try_lock().is_some());
  }
}
