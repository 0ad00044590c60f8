use std::{env, ffi::OsString, io, path::PathBuf, sync::Arc};

use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder, Scope};
use bytes::Bytes;
use flydb::{
  errors::Errors,
  option::Options,
  zset::{skiplist::ZNodeValue, ZSetEngine},
};
use log::{error, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ZAddRequest {
  key: String,
  score: i64,
  member: String,
  #[serde(default)]
  payload: String,
}

#[derive(Debug, Deserialize)]
struct ZRemRequest {
  key: String,
  member: String,
}

#[derive(Debug, Deserialize)]
struct ZIncrByRequest {
  key: String,
  member: String,
  delta: i64,
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
  start: i64,
  end: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct MemberEntry {
  member: String,
  score: i64,
  payload: String,
}

impl From<ZNodeValue> for MemberEntry {
  fn from(value: ZNodeValue) -> Self {
    Self {
      member: value.member,
      score: value.score,
      payload: String::from_utf8_lossy(&value.payload).into_owned(),
    }
  }
}

fn error_response(e: Errors) -> HttpResponse {
  match e {
    Errors::KeyNotFound => HttpResponse::NotFound().body(e.to_string()),
    Errors::KeyIsEmpty => HttpResponse::BadRequest().body(e.to_string()),
    _ => {
      error!("zset operation failed: {}", e);
      HttpResponse::InternalServerError().body(e.to_string())
    }
  }
}

fn range_response(result: flydb::errors::Result<Vec<ZNodeValue>>) -> HttpResponse {
  match result {
    Ok(values) => {
      let entries: Vec<MemberEntry> = values.into_iter().map(MemberEntry::from).collect();
      HttpResponse::Ok().json(entries)
    }
    Err(e) => error_response(e),
  }
}

#[post("/zadd")]
async fn zadd_handler(eng: web::Data<Arc<ZSetEngine>>, req: web::Json<ZAddRequest>) -> impl Responder {
  let req = req.into_inner();
  match eng.zadd(&req.key, req.score, &req.member, Bytes::from(req.payload)) {
    Ok(()) => HttpResponse::Ok().body("OK"),
    Err(e) => error_response(e),
  }
}

#[post("/zrem")]
async fn zrem_handler(eng: web::Data<Arc<ZSetEngine>>, req: web::Json<ZRemRequest>) -> impl Responder {
  match eng.zrem(&req.key, &req.member) {
    Ok(()) => HttpResponse::Ok().body("OK"),
    Err(e) => error_response(e),
  }
}

#[post("/zincrby")]
async fn zincrby_handler(
  eng: web::Data<Arc<ZSetEngine>>,
  req: web::Json<ZIncrByRequest>,
) -> impl Responder {
  match eng.zincrby(&req.key, &req.member, req.delta) {
    Ok(score) => HttpResponse::Ok().json(score),
    Err(e) => error_response(e),
  }
}

#[get("/zscore/{key}/{member}")]
async fn zscore_handler(
  eng: web::Data<Arc<ZSetEngine>>,
  path: web::Path<(String, String)>,
) -> impl Responder {
  let (key, member) = path.into_inner();
  match eng.zscore(&key, &member) {
    Ok(score) => HttpResponse::Ok().json(score),
    Err(e) => error_response(e),
  }
}

#[get("/zrank/{key}/{member}")]
async fn zrank_handler(
  eng: web::Data<Arc<ZSetEngine>>,
  path: web::Path<(String, String)>,
) -> impl Responder {
  let (key, member) = path.into_inner();
  match eng.zrank(&key, &member) {
    Ok(rank) => HttpResponse::Ok().json(rank),
    Err(e) => error_response(e),
  }
}

#[get("/zrevrank/{key}/{member}")]
async fn zrevrank_handler(
  eng: web::Data<Arc<ZSetEngine>>,
  path: web::Path<(String, String)>,
) -> impl Responder {
  let (key, member) = path.into_inner();
  match eng.zrevrank(&key, &member) {
    Ok(rank) => HttpResponse::Ok().json(rank),
    Err(e) => error_response(e),
  }
}

#[get("/zrange/{key}")]
async fn zrange_handler(
  eng: web::Data<Arc<ZSetEngine>>,
  key: web::Path<String>,
  query: web::Query<RangeQuery>,
) -> impl Responder {
  range_response(eng.zrange(&key, query.start, query.end))
}

#[get("/zrevrange/{key}")]
async fn zrevrange_handler(
  eng: web::Data<Arc<ZSetEngine>>,
  key: web::Path<String>,
  query: web::Query<RangeQuery>,
) -> impl Responder {
  range_response(eng.zrevrange(&key, query.start, query.end))
}

#[get("/zcard/{key}")]
async fn zcard_handler(eng: web::Data<Arc<ZSetEngine>>, key: web::Path<String>) -> impl Responder {
  match eng.zcard(&key) {
    Ok(size) => HttpResponse::Ok().json(size),
    Err(e) => error_response(e),
  }
}

fn zset_scope() -> Scope {
  Scope::new("/flydb")
    .service(zadd_handler)
    .service(zrem_handler)
    .service(zincrby_handler)
    .service(zscore_handler)
    .service(zrank_handler)
    .service(zrevrank_handler)
    .service(zrange_handler)
    .service(zrevrange_handler)
    .service(zcard_handler)
}

/// Overrides the default data directory when set.
const DIR_PATH_ENV: &str = "FLYDB_DIR";

fn server_options(dir_path: Option<OsString>) -> Options {
  let mut opts = Options::default();
  if let Some(dir) = dir_path {
    opts.dir_path = PathBuf::from(dir);
  }
  opts
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  env_logger::init();

  let opts = server_options(env::var_os(DIR_PATH_ENV));
  let engine = Arc::new(ZSetEngine::open(opts).map_err(io::Error::other)?);

  info!("flydb http server listening on 127.0.0.1:8080");
  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(engine.clone()))
      .service(zset_scope())
  })
  .bind(("127.0.0.1", 8080))?
  .run()
  .await
}

#[cfg(test)]
mod test;
