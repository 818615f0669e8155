use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, post, put, web};

use quoter_core::{Quoter, QuoterError};
use serde::Deserialize;

/// Struct representing query parameters for the `/v1/quote` endpoint
#[derive(Deserialize)]
struct QuoteParams {
	/// Number of sentences to build (default 1)
	n: Option<usize>,
}

/// Struct representing query parameters for the save/load endpoints
#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
}

struct SharedData {
	quoter: Quoter,
}

/// Resolves a model name to its save file under `./data`.
///
/// Names are restricted to a safe character set so callers cannot point
/// the server outside its data directory.
fn model_path(query: &ModelQuery) -> Result<PathBuf, String> {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return Err("Missing or empty model name".to_owned()),
	};
	if !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
		return Err(format!("Invalid model name '{}'", name));
	}
	Ok(PathBuf::from(format!("./data/{}.bq", name)))
}

/// HTTP GET endpoint `/v1/quote`
///
/// Builds one or more sentences from the shared model and returns them,
/// one per line.
#[get("/v1/quote")]
async fn get_quote(data: web::Data<Mutex<SharedData>>, query: web::Query<QuoteParams>) -> impl Responder {
	let n = query.n.unwrap_or(1).clamp(1, 100);

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let mut sentences = Vec::with_capacity(n);
	for _ in 0..n {
		match shared_data.quoter.build_sentence() {
			Ok(sentence) => sentences.push(sentence),
			Err(e @ QuoterError::NoOutgoingTransition { .. }) => {
				return HttpResponse::Conflict().body(e.to_string());
			}
			Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
		}
	}
	HttpResponse::Ok().body(sentences.join("\n"))
}

/// HTTP PUT endpoint `/v1/feed`
///
/// Feeds the request body text into the shared model. Counts accumulate
/// across calls.
#[put("/v1/feed")]
async fn put_feed(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.quoter.feed_str(&body);
	HttpResponse::Ok().body(format!("Vocabulary size: {}", shared_data.quoter.word_count()))
}

/// HTTP GET endpoint `/v1/dump`
///
/// Returns the model's words, row sums and transition matrix as JSON.
#[get("/v1/dump")]
async fn get_dump(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(shared_data.quoter.dump())
}

/// HTTP POST endpoint `/v1/save`
///
/// Writes the shared model to `./data/<name>.bq`.
#[post("/v1/save")]
async fn post_save(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let path = match model_path(&query) {
		Ok(p) => p,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match shared_data.quoter.save(&path) {
		Ok(()) => HttpResponse::Ok().body(format!("Saved to {}", path.display())),
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to save model: {}", e)),
	}
}

/// HTTP PUT endpoint `/v1/load`
///
/// Replaces the shared model from `./data/<name>.bq`. A failed load
/// leaves the current model in place.
#[put("/v1/load")]
async fn put_load(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let path = match model_path(&query) {
		Ok(p) => p,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match shared_data.quoter.load(&path) {
		Ok(()) => HttpResponse::Ok().body("Model loaded successfully"),
		Err(e @ QuoterError::Corrupt(_)) => HttpResponse::UnprocessableEntity().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to load model: {}", e)),
	}
}

/// Main entry point for the server.
///
/// Wraps one quoter in a `Mutex` for thread safety and starts an
/// Actix-web HTTP server over it.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Save files live under `./data`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData { quoter: Quoter::new() };
	let shared_model = web::Data::new(Mutex::new(shared_data));
	log::info!("listening on 127.0.0.1:5000");

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_quote)
			.service(put_feed)
			.service(get_dump)
			.service(post_save)
			.service(put_load)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
