use std::collections::HashMap;

use bytes::Bytes;

use crate::errors::{Errors, Result};

use super::skiplist::{NodeId, SkipList, ZNodeValue};

/// In-memory form of one sorted set: a member dictionary for point lookups
/// and a skip list for ordered access. Every mutation goes through this type
/// so the two views never disagree.
#[derive(Default)]
pub struct ZSetIndex {
  dict: HashMap<String, NodeId>,
  skiplist: SkipList,
  size: usize,
}

impl ZSetIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_seed(seed: u64) -> Self {
    Self {
      dict: HashMap::new(),
      skiplist: SkipList::with_seed(seed),
      size: 0,
    }
  }

  pub fn len(&self) -> usize {
    self.size
  }

  pub fn is_empty(&self) -> bool {
    self.size == 0
  }

  /// Adds `member`, or refreshes it when already present.
  ///
  /// With an unchanged score the entry is reinserted carrying the new payload.
  /// With a different score only the payload is replaced: the stored score and
  /// the member's position stay as they were.
  pub fn insert_node(&mut self, score: i64, member: &str, payload: Bytes) {
    if let Some(&id) = self.dict.get(member) {
      let stored_score = self.skiplist.value(id).score;
      if stored_score == score {
        self.skiplist.delete(score, member);
        let id = self.skiplist.insert(score, member.to_string(), payload);
        self.dict.insert(member.to_string(), id);
      } else {
        self.skiplist.set_payload(id, payload);
      }
      return;
    }

    let id = self.skiplist.insert(score, member.to_string(), payload);
    self.dict.insert(member.to_string(), id);
    self.size += 1;
  }

  pub fn remove_node(&mut self, member: &str) -> Result<ZNodeValue> {
    let id = match self.dict.get(member) {
      Some(id) => *id,
      None => return Err(Errors::KeyNotFound),
    };

    let score = self.skiplist.value(id).score;
    let removed = self.skiplist.delete(score, member).ok_or(Errors::KeyNotFound)?;
    self.dict.remove(member);
    self.size -= 1;
    Ok(removed)
  }

  /// True when `member` is stored with exactly `score`.
  pub fn exists(&self, score: i64, member: &str) -> bool {
    self
      .get(member)
      .is_some_and(|value| value.score == score)
  }

  pub fn get(&self, member: &str) -> Option<&ZNodeValue> {
    self.dict.get(member).map(|id| self.skiplist.value(*id))
  }

  /// 0-based ascending rank of `member`.
  pub fn rank(&self, member: &str) -> Option<usize> {
    let value = self.get(member)?;
    self.skiplist.get_rank(value.score, member)
  }

  /// 0-based descending rank of `member`.
  pub fn rev_rank(&self, member: &str) -> Option<usize> {
    self.rank(member).map(|rank| self.size - 1 - rank)
  }

  pub fn range(&self, start: i64, end: i64, reverse: bool) -> Vec<ZNodeValue> {
    self.skiplist.get_range(start, end, reverse)
  }

  pub fn skiplist(&self) -> &SkipList {
    &self.skiplist
  }
}
