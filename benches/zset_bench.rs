use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use flydb::{
  option::{Options, StoreType},
  util::rand_kv::{get_test_member, get_test_payload},
  zset::{index::ZSetIndex, ZSetEngine},
};
use rand::Rng;

const SET_SIZE: usize = 1000;

fn memory_engine() -> ZSetEngine {
  let mut option = Options::default();
  option.store_type = StoreType::Memory;
  ZSetEngine::open(option).unwrap()
}

fn bench_zadd(c: &mut Criterion) {
  let engine = memory_engine();
  let mut rnd = rand::rng();

  c.bench_function("flydb-zadd-bench", |b| {
    b.iter(|| {
      let i = rnd.random_range(0..SET_SIZE);
      let res = engine.zadd("bench", i as i64, &get_test_member(i), get_test_payload(i));
      assert!(res.is_ok());
    })
  });
}

fn bench_zrank(c: &mut Criterion) {
  let engine = memory_engine();
  for i in 0..SET_SIZE {
    let res = engine.zadd("bench", i as i64, &get_test_member(i), Bytes::new());
    assert!(res.is_ok());
  }

  let mut rnd = rand::rng();

  c.bench_function("flydb-zrank-bench", |b| {
    b.iter(|| {
      let i = rnd.random_range(0..SET_SIZE);
      let res = engine.zrank("bench", &get_test_member(i));
      assert_eq!(res.unwrap(), i);
    })
  });
}

fn bench_index_insert(c: &mut Criterion) {
  let mut rnd = rand::rng();

  c.bench_function("flydb-index-insert-bench", |b| {
    b.iter(|| {
      let mut index = ZSetIndex::new();
      for i in 0..SET_SIZE {
        index.insert_node(rnd.random_range(0..1_000_000), &get_test_member(i), Bytes::new());
      }
      assert_eq!(index.len(), SET_SIZE);
    })
  });
}

criterion_group!(benches, bench_zadd, bench_zrank, bench_index_insert);
criterion_main!(benches);
