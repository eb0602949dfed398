use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;
use vexgate_core::{DocumentStore, Error, Gateway, ResponseCode};

const DEFAULT_DB: &str = "default";

#[derive(Serialize)]
struct AddResponse {
    message: &'static str,
    added: usize,
}

pub struct RestApi;

impl RestApi {
    pub async fn start<S>(gateway: Arc<Gateway<S>>, port: u16) -> std::io::Result<()>
    where
        S: DocumentStore + Send + Sync + 'static,
    {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(gateway.clone()))
                .route("/create", web::post().to(create::<S>))
                .route("/add", web::post().to(add::<S>))
                .route("/search", web::post().to(search::<S>))
                .route("/get", web::post().to(get::<S>))
                .route("/delete", web::post().to(delete::<S>))
                .route("/list", web::post().to(list::<S>))
                .route("/count", web::post().to(count::<S>))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Extract the request envelope: `db` defaults to `"default"` when absent
/// or not a string, `table` is required.
fn envelope(body: &Value) -> Result<(String, String, &Map<String, Value>), HttpResponse> {
    let Some(object) = body.as_object() else {
        return Err(bad_request("request body must be a JSON object"));
    };
    let db = match object.get("db") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            debug!("db is not a string, using the default database");
            DEFAULT_DB.to_string()
        }
        None => DEFAULT_DB.to_string(),
    };
    let table = match object.get("table") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(bad_request("table must be specified")),
    };
    Ok((db, table, object))
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": message }))
}

fn error_response(err: &Error) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    if err.is_client_error() {
        HttpResponse::BadRequest().json(body)
    } else if matches!(err, Error::Timeout) {
        HttpResponse::GatewayTimeout().json(body)
    } else {
        HttpResponse::BadGateway().json(body)
    }
}

async fn create<S: DocumentStore>(
    gateway: web::Data<Arc<Gateway<S>>>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let (db, table, object) = match envelope(&body) {
        Ok(parts) => parts,
        Err(response) => return Ok(response),
    };
    match gateway.create(&db, &table, object).await {
        Ok(status) => Ok(match status.code() {
            ResponseCode::Ok => HttpResponse::Ok().json(json!({"message": "create table success"})),
            ResponseCode::TableExist => {
                HttpResponse::Ok().json(json!({"message": "table already exists"}))
            }
            ResponseCode::InputParameterError => bad_request("input parameters error"),
            ResponseCode::InternalError => {
                HttpResponse::BadGateway().json(json!({"error": status.output_info}))
            }
        }),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn add<S: DocumentStore>(
    gateway: web::Data<Arc<Gateway<S>>>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let (db, table, object) = match envelope(&body) {
        Ok(parts) => parts,
        Err(response) => return Ok(response),
    };
    let Some(docs) = object.get("docs") else {
        return Ok(bad_request("docs must be specified"));
    };
    match gateway.add(&db, &table, docs).await {
        Ok(added) => Ok(HttpResponse::Ok().json(AddResponse {
            message: "add documents success",
            added,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn search<S: DocumentStore>(
    gateway: web::Data<Arc<Gateway<S>>>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let (db, table, object) = match envelope(&body) {
        Ok(parts) => parts,
        Err(response) => return Ok(response),
    };
    match gateway.search(&db, &table, object).await {
        Ok(results) => Ok(HttpResponse::Ok().json(results)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get<S: DocumentStore>(
    gateway: web::Data<Arc<Gateway<S>>>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let (db, table, object) = match envelope(&body) {
        Ok(parts) => parts,
        Err(response) => return Ok(response),
    };
    match gateway.get(&db, &table, object).await {
        Ok(docs) => Ok(HttpResponse::Ok().json(docs)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn delete<S: DocumentStore>(
    gateway: web::Data<Arc<Gateway<S>>>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let (db, table, object) = match envelope(&body) {
        Ok(parts) => parts,
        Err(response) => return Ok(response),
    };
    match gateway.delete(&db, &table, object).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({"message": "delete documents success"}))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn list<S: DocumentStore>(
    gateway: web::Data<Arc<Gateway<S>>>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    // db and table are both optional here; missing parts narrow the
    // listing to databases or tables.
    let Some(object) = body.as_object() else {
        return Ok(bad_request("request body must be a JSON object"));
    };
    let db = object.get("db").and_then(Value::as_str).unwrap_or_default();
    let table = object
        .get("table")
        .and_then(Value::as_str)
        .unwrap_or_default();
    match gateway.list(db, table).await {
        Ok(listing) => Ok(HttpResponse::Ok().json(listing)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn count<S: DocumentStore>(
    gateway: web::Data<Arc<Gateway<S>>>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let (db, table, _) = match envelope(&body) {
        Ok(parts) => parts,
        Err(response) => return Ok(response),
    };
    match gateway.count(&db, &table).await {
        Ok(Some(stats)) => Ok(HttpResponse::Ok().json(stats)),
        Ok(None) => Ok(HttpResponse::Ok().json(json!({"message": "no statistics for table"}))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_defaults_db() {
        let body = json!({"table": "users"});
        let (db, table, _) = envelope(&body).unwrap();
        assert_eq!(db, "default");
        assert_eq!(table, "users");

        // A non-string db also falls back to the default database.
        let body = json!({"db": 7, "table": "users"});
        let (db, _, _) = envelope(&body).unwrap();
        assert_eq!(db, "default");
    }

    #[test]
    fn envelope_requires_table() {
        assert!(envelope(&json!({"db": "default"})).is_err());
        assert!(envelope(&json!({"db": "default", "table": 3})).is_err());
        assert!(envelope(&json!([1, 2])).is_err());
    }
}
