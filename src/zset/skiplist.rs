//! Ranked skip list ordered by `(score, member)`.
//!
//! Nodes live in an arena and refer to each other by slot index. Slot 0 is
//! the head sentinel, which always carries `MAX_LEVEL` forward entries. Every
//! forward entry records a span: the number of level-0 hops it jumps over, or
//! for a dangling entry the number of nodes left after its owner. Summing
//! spans along a search path gives a node's 1-based rank.

use bytes::Bytes;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Maximum height of any node, and the number of forward slots on the head.
pub const MAX_LEVEL: usize = 10;

/// Chance that a new node grows one more level.
const LEVEL_PROBABILITY: f64 = 0.25;

const HEAD: usize = 0;

/// A sorted set entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZNodeValue {
  pub score: i64,
  pub member: String,
  pub payload: Bytes,
}

impl ZNodeValue {
  pub fn new(score: i64, member: impl Into<String>, payload: Bytes) -> Self {
    Self {
      score,
      member: member.into(),
      payload,
    }
  }

  fn sorts_before(&self, score: i64, member: &str) -> bool {
    self.score < score || (self.score == score && self.member.as_str() < member)
  }

  fn matches(&self, score: i64, member: &str) -> bool {
    self.score == score && self.member == member
  }
}

/// Stable handle to a node in a `SkipList`, valid until that node is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, Default)]
struct Level {
  next: Option<usize>,
  span: usize,
}

#[derive(Debug, Default)]
struct Node {
  value: ZNodeValue,
  prev: Option<usize>,
  levels: Vec<Level>,
}

pub struct SkipList {
  nodes: Vec<Node>,
  free: Vec<usize>,
  level: usize,
  tail: Option<usize>,
  size: usize,
  rng: StdRng,
  level_probability: f64,
}

impl Default for SkipList {
  fn default() -> Self {
    Self::new()
  }
}

impl SkipList {
  pub fn new() -> Self {
    Self::with_rng(StdRng::from_os_rng())
  }

  /// Creates a list whose node heights are reproducible.
  pub fn with_seed(seed: u64) -> Self {
    Self::with_rng(StdRng::seed_from_u64(seed))
  }

  pub fn with_rng(rng: StdRng) -> Self {
    let head = Node {
      value: ZNodeValue::default(),
      prev: None,
      levels: vec![Level::default(); MAX_LEVEL],
    };
    Self {
      nodes: vec![head],
      free: Vec::new(),
      level: 0,
      tail: None,
      size: 0,
      rng,
      level_probability: LEVEL_PROBABILITY,
    }
  }

  /// Chance that a new node grows one more level.
  #[cfg(test)]
  pub(crate) fn with_level_probability(mut self, probability: f64) -> Self {
    self.level_probability = probability;
    self
  }

  pub fn len(&self) -> usize {
    self.size
  }

  pub fn is_empty(&self) -> bool {
    self.size == 0
  }

  /// Height of the tallest node, 0 when the list is empty.
  pub fn level(&self) -> usize {
    self.level
  }

  pub fn value(&self, id: NodeId) -> &ZNodeValue {
    &self.nodes[id.0].value
  }

  /// Replaces the payload of a node in place; its position is untouched.
  pub fn set_payload(&mut self, id: NodeId, payload: Bytes) {
    self.nodes[id.0].value.payload = payload;
  }

  /// Inserts a new node. The caller guarantees `(score, member)` is not
  /// already present.
  pub fn insert(&mut self, score: i64, member: String, payload: Bytes) -> NodeId {
    let mut update = [HEAD; MAX_LEVEL];
    let mut rank = [0usize; MAX_LEVEL];

    let mut x = HEAD;
    for i in (0..self.level).rev() {
      rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
      while let Some(next) = self.nodes[x].levels[i].next {
        if !self.nodes[next].value.sorts_before(score, &member) {
          break;
        }
        rank[i] += self.nodes[x].levels[i].span;
        x = next;
      }
      update[i] = x;
    }

    let height = self.random_level();
    if height > self.level {
      for i in self.level..height {
        rank[i] = 0;
        update[i] = HEAD;
        self.nodes[HEAD].levels[i].span = self.size;
      }
      self.level = height;
    }

    let id = self.alloc(Node {
      value: ZNodeValue {
        score,
        member,
        payload,
      },
      prev: None,
      levels: vec![Level::default(); height],
    });

    for i in 0..height {
      let pred = self.nodes[update[i]].levels[i];
      let hops = rank[0] - rank[i];
      self.nodes[id].levels[i] = Level {
        next: pred.next,
        span: pred.span - hops,
      };
      self.nodes[update[i]].levels[i] = Level {
        next: Some(id),
        span: hops + 1,
      };
    }

    // taller predecessors now jump over one more node
    for i in height..self.level {
      self.nodes[update[i]].levels[i].span += 1;
    }

    self.nodes[id].prev = if update[0] == HEAD {
      None
    } else {
      Some(update[0])
    };
    match self.nodes[id].levels[0].next {
      Some(next) => self.nodes[next].prev = Some(id),
      None => self.tail = Some(id),
    }

    self.size += 1;
    NodeId(id)
  }

  /// Removes the node matching `(score, member)` exactly and returns its
  /// value. Returns `None` and leaves the list untouched when there is none.
  pub fn delete(&mut self, score: i64, member: &str) -> Option<ZNodeValue> {
    let mut update = [HEAD; MAX_LEVEL];

    let mut x = HEAD;
    for i in (0..self.level).rev() {
      while let Some(next) = self.nodes[x].levels[i].next {
        if !self.nodes[next].value.sorts_before(score, member) {
          break;
        }
        x = next;
      }
      update[i] = x;
    }

    let candidate = self.nodes[x].levels[0].next?;
    if !self.nodes[candidate].value.matches(score, member) {
      return None;
    }

    self.unlink(candidate, &update);
    Some(self.release(candidate))
  }

  fn unlink(&mut self, id: usize, update: &[usize; MAX_LEVEL]) {
    for (i, &pred) in update.iter().enumerate().take(self.level) {
      if self.nodes[pred].levels[i].next == Some(id) {
        let removed = self.nodes[id].levels[i];
        let level = &mut self.nodes[pred].levels[i];
        level.span = level.span + removed.span - 1;
        level.next = removed.next;
      } else {
        self.nodes[pred].levels[i].span -= 1;
      }
    }

    let prev = self.nodes[id].prev;
    match self.nodes[id].levels[0].next {
      Some(next) => self.nodes[next].prev = prev,
      None => self.tail = prev,
    }

    while self.level > 0 && self.nodes[HEAD].levels[self.level - 1].next.is_none() {
      self.level -= 1;
    }
    self.size -= 1;
  }

  /// 0-based position of `(score, member)`, or `None` if it is not present.
  pub fn get_rank(&self, score: i64, member: &str) -> Option<usize> {
    let mut rank = 0;
    let mut x = HEAD;
    for i in (0..self.level).rev() {
      while let Some(next) = self.nodes[x].levels[i].next {
        let value = &self.nodes[next].value;
        if !(value.sorts_before(score, member) || value.matches(score, member)) {
          break;
        }
        rank += self.nodes[x].levels[i].span;
        x = next;
      }

      if x != HEAD && self.nodes[x].value.matches(score, member) {
        return Some(rank - 1);
      }
    }
    None
  }

  /// Value at the 0-based position `rank`.
  pub fn get_by_rank(&self, rank: usize) -> Option<&ZNodeValue> {
    self
      .node_by_rank(rank + 1)
      .map(|id| &self.nodes[id].value)
  }

  /// Slot of the node whose span-sum rank (1-based) equals `rank`.
  fn node_by_rank(&self, rank: usize) -> Option<usize> {
    let mut traversed = 0;
    let mut x = HEAD;
    for i in (0..self.level).rev() {
      while let Some(next) = self.nodes[x].levels[i].next {
        let span = self.nodes[x].levels[i].span;
        if traversed + span > rank {
          break;
        }
        traversed += span;
        x = next;
      }

      if traversed == rank {
        return if x == HEAD { None } else { Some(x) };
      }
    }
    None
  }

  /// Values with 0-based ranks in `start..=end`.
  ///
  /// `end` is clamped to the last rank and a negative `start` to 0; an empty
  /// window yields nothing. Forward ranges run from `start` up to `end`;
  /// reverse ranges cover the same window walked from `end` back to `start`.
  pub fn get_range(&self, start: i64, end: i64, reverse: bool) -> Vec<ZNodeValue> {
    let start = start.max(0);
    let end = end.min(self.size as i64 - 1);
    if start > end || end < 0 {
      return Vec::new();
    }

    let count = (end - start + 1) as usize;
    let first = if reverse { end } else { start };

    let mut values = Vec::with_capacity(count);
    let mut cursor = self.node_by_rank(first as usize + 1);
    while let Some(id) = cursor {
      if values.len() == count {
        break;
      }
      let node = &self.nodes[id];
      values.push(node.value.clone());
      cursor = if reverse { node.prev } else { node.levels[0].next };
    }
    values
  }

  /// Values in ascending order.
  pub fn iter(&self) -> impl Iterator<Item = &ZNodeValue> + '_ {
    std::iter::successors(self.nodes[HEAD].levels[0].next, move |&id| {
      self.nodes[id].levels[0].next
    })
    .map(move |id| &self.nodes[id].value)
  }

  /// Values in descending order, following back-references from the tail.
  pub fn iter_rev(&self) -> impl Iterator<Item = &ZNodeValue> + '_ {
    std::iter::successors(self.tail, move |&id| self.nodes[id].prev)
      .map(move |id| &self.nodes[id].value)
  }

  fn random_level(&mut self) -> usize {
    let mut level = 1;
    while level < MAX_LEVEL && self.rng.random_bool(self.level_probability) {
      level += 1;
    }
    level
  }

  fn alloc(&mut self, node: Node) -> usize {
    match self.free.pop() {
      Some(slot) => {
        self.nodes[slot] = node;
        slot
      }
      None => {
        self.nodes.push(node);
        self.nodes.len() - 1
      }
    }
  }

  fn release(&mut self, slot: usize) -> ZNodeValue {
    let node = std::mem::take(&mut self.nodes[slot]);
    self.free.push(slot);
    node.value
  }
}
