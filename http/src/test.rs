use super::*;
use actix_web::{http::StatusCode, test};
use flydb::option::StoreType;
use serde_json::json;
use tempfile::tempdir;

fn memory_engine() -> Arc<ZSetEngine> {
  let mut opts = Options::default();
  opts.store_type = StoreType::Memory;
  Arc::new(ZSetEngine::open(opts).unwrap())
}

fn seed(engine: &ZSetEngine) {
  engine.zadd("fruit", 3, "banana", Bytes::from("b")).unwrap();
  engine.zadd("fruit", 1, "apple", Bytes::from("a")).unwrap();
  engine.zadd("fruit", 2, "pear", Bytes::from("p")).unwrap();
}

#[actix_web::test]
async fn test_zadd_handler() {
  let temp_dir = tempdir().expect("Failed to create temp dir for zadd test");
  let mut opts = Options::default();
  opts.dir_path = temp_dir.path().to_path_buf();
  let engine = Arc::new(ZSetEngine::open(opts).unwrap());

  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(engine.clone()))
      .service(Scope::new("/flydb").service(zadd_handler)),
  )
  .await;

  let req = test::TestRequest::with_uri("/flydb/zadd")
    .method(actix_web::http::Method::POST)
    .set_json(json!({"key": "fruit", "score": 4, "member": "plum", "payload": "p"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(engine.zscore("fruit", "plum").unwrap(), 4);

  let req = test::TestRequest::with_uri("/flydb/zadd")
    .method(actix_web::http::Method::POST)
    .set_json(json!({"key": "", "score": 1, "member": "plum"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_zscore_and_rank_handlers() {
  let engine = memory_engine();
  seed(&engine);

  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(engine.clone()))
      .service(zset_scope()),
  )
  .await;

  let req = test::TestRequest::with_uri("/flydb/zscore/fruit/pear").to_request();
  let score: i64 = test::call_and_read_body_json(&app, req).await;
  assert_eq!(score, 2);

  let req = test::TestRequest::with_uri("/flydb/zrank/fruit/banana").to_request();
  let rank: usize = test::call_and_read_body_json(&app, req).await;
  assert_eq!(rank, 2);

  let req = test::TestRequest::with_uri("/flydb/zrevrank/fruit/banana").to_request();
  let rank: usize = test::call_and_read_body_json(&app, req).await;
  assert_eq!(rank, 0);

  let req = test::TestRequest::with_uri("/flydb/zscore/fruit/grape").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_zrange_handlers() {
  let engine = memory_engine();
  seed(&engine);

  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(engine.clone()))
      .service(zset_scope()),
  )
  .await;

  let req = test::TestRequest::with_uri("/flydb/zrange/fruit?start=0&end=2").to_request();
  let entries: Vec<MemberEntry> = test::call_and_read_body_json(&app, req).await;
  let members: Vec<_> = entries.iter().map(|e| e.member.as_str()).collect();
  assert_eq!(members, vec!["apple", "pear", "banana"]);
  assert_eq!(entries[0].payload, "a");

  let req = test::TestRequest::with_uri("/flydb/zrevrange/fruit?start=0&end=1").to_request();
  let entries: Vec<MemberEntry> = test::call_and_read_body_json(&app, req).await;
  let members: Vec<_> = entries.iter().map(|e| e.member.as_str()).collect();
  assert_eq!(members, vec!["pear", "apple"]);

  let req = test::TestRequest::with_uri("/flydb/zrange/missing?start=0&end=1").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_zrem_zincrby_zcard_handlers() {
  let engine = memory_engine();
  seed(&engine);

  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(engine.clone()))
      .service(zset_scope()),
  )
  .await;

  let req = test::TestRequest::with_uri("/flydb/zrem")
    .method(actix_web::http::Method::POST)
    .set_json(json!({"key": "fruit", "member": "apple"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let req = test::TestRequest::with_uri("/flydb/zincrby")
    .method(actix_web::http::Method::POST)
    .set_json(json!({"key": "fruit", "member": "pear", "delta": 0}))
    .to_request();
  let score: i64 = test::call_and_read_body_json(&app, req).await;
  assert_eq!(score, 2);

  let req = test::TestRequest::with_uri("/flydb/zcard/fruit").to_request();
  let size: usize = test::call_and_read_body_json(&app, req).await;
  assert_eq!(size, 2);
}

#[test]
fn test_server_options_dir_path() {
  assert_eq!(server_options(None).dir_path, Options::default().dir_path);

  let opts = server_options(Some("/var/lib/flydb".into()));
  assert_eq!(opts.dir_path, std::path::PathBuf::from("/var/lib/flydb"));
  assert_eq!(opts.store_type, Options::default().store_type);
}
