//! FlyDB: Redis-style sorted sets on top of a bitcask-inspired key-value store.
//!
//! Each sorted set lives under one key of the backing store as a snapshot.
//! In memory a set is a member dictionary paired with a ranked skip list, so
//! point lookups are O(1) and ordered operations are O(log n).
//!
//! # Features
//!
//! * Sorted sets ordered by integer score, ties broken by member
//! * Rank, reverse rank and rank-window range queries
//! * Append-only log store with crc-checked records, or a volatile in-memory store
//! * Per-key locking so concurrent writers on one set never lose updates
//!
//! # Basic Usage
//!
//! ```
//! use bytes::Bytes;
//! use flydb::{option::{Options, StoreType}, zset::ZSetEngine};
//!
//! let mut opts = Options::default();
//! opts.store_type = StoreType::Memory;
//! let engine = ZSetEngine::open(opts).expect("failed to open flydb");
//!
//! engine.zadd("board", 3, "banana", Bytes::from("v")).expect("failed to zadd");
//! engine.zadd("board", 1, "apple", Bytes::from("v")).expect("failed to zadd");
//!
//! assert_eq!(engine.zrank("board", "banana").unwrap(), 1);
//! assert_eq!(engine.zcard("board").unwrap(), 2);
//!
//! let ranked = engine.zrange("board", 0, 1).unwrap();
//! assert_eq!(ranked[0].member, "apple");
//! ```

mod fio;

pub mod encoding;
pub mod errors;
pub mod option;
pub mod store;
pub mod util;
pub mod zset;
