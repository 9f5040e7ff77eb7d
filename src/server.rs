//! Minimal HTTP front end.
//!
//! Routes:
//! - `GET /` lists stored cards as JSON, newest first
//! - `POST /cards` stores a JSON [`CardRecord`]
//! - `POST /logos/<filename>` stores an uploaded logo and returns its URL
//! - `GET /logos/<filename>` serves a stored logo
//! - `GET /card/<id>` renders a card as PNG
//! - `GET /delete/<id>` removes a card and redirects to `/`

use crate::storage::{LocalLogoSource, LocalStorage, StorageService};
use crate::store::{CardStore, RecordRepository};
use crate::{CardRecord, CardRenderer, Error, Result};
use serde_json::json;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tiny_http::{Header, Method, Request, Response, Server};

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Uploads larger than this are refused before they are read
const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration for [`CardServer`]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:8080` (port 0 picks a free port)
    pub addr: String,
    /// Directory holding `cards.json` and uploaded logos
    pub data_dir: PathBuf,
    /// Base URL written into uploaded logo URLs; defaults to the bound address
    pub public_url: Option<String>,
    /// Number of request worker threads
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            data_dir: PathBuf::from("data"),
            public_url: None,
            workers: num_cpus::get(),
        }
    }
}

struct App {
    renderer: Arc<CardRenderer>,
    cards: Box<dyn RecordRepository>,
    logos: LocalStorage,
}

pub struct CardServer {
    server: Arc<Server>,
    app: Arc<App>,
    workers: usize,
    base_url: String,
}

impl CardServer {
    /// Bind the listener and open the on-disk stores under `config.data_dir`.
    ///
    /// Logo URLs pointing at this server's own uploads are read from disk
    /// rather than fetched back over HTTP, so a render never waits on a
    /// free worker of the same pool.
    pub fn bind(config: ServerConfig, renderer: CardRenderer) -> Result<Self> {
        let server = Server::http(config.addr.as_str())
            .map_err(|e| Error::InitializationError(format!("Failed to bind {}: {}", config.addr, e)))?;
        let local = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| Error::InitializationError("listener has no IP address".into()))?;
        let base_url = format!("http://{}", local);
        let public = config.public_url.clone().unwrap_or_else(|| base_url.clone());

        let cards = CardStore::open(config.data_dir.join("cards.json"))?;
        let logos = LocalStorage::new(config.data_dir.join("logos"), public)?;
        let uploads = logos.clone();
        let renderer =
            Arc::new(renderer.layer_logo_source(move |remote| LocalLogoSource::new(uploads, remote)));

        Ok(Self {
            server: Arc::new(server),
            app: Arc::new(App { renderer, cards: Box::new(cards), logos }),
            workers: config.workers.max(1),
            base_url,
        })
    }

    /// `http://host:port` the server is listening on
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Serve requests until the process exits.
    pub fn run(self) {
        log::info!("serving cards on {} with {} workers", self.base_url, self.workers);
        let handles: Vec<_> = (0..self.workers)
            .map(|_| {
                let server = Arc::clone(&self.server);
                let app = Arc::clone(&self.app);
                std::thread::spawn(move || {
                    for request in server.incoming_requests() {
                        app.handle(request);
                    }
                })
            })
            .collect();
        for h in handles {
            let _ = h.join();
        }
    }
}

impl App {
    fn handle(&self, mut request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();
        let path = url.split('?').next().unwrap_or("").to_string();
        let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

        let response = match (&method, segments.as_slice()) {
            (Method::Get, []) => self.list(),
            (Method::Post, ["cards"]) => self.create(&mut request),
            (Method::Post, ["logos", name]) => self.upload(&mut request, name),
            (Method::Get, ["logos", name]) => self.serve_logo(name),
            (Method::Get, ["card", id]) => self.card(id),
            (Method::Get, ["delete", id]) => self.delete(id),
            _ => Ok(text(404, "Not Found")),
        };

        let response = response.unwrap_or_else(|e| error_response(&e));
        log::debug!("{} {} -> {}", method, url, response.status_code().0);
        if let Err(e) = request.respond(response) {
            log::warn!("failed to respond to {} {}: {}", method, url, e);
        }
    }

    fn list(&self) -> Result<HttpResponse> {
        let cards = self.cards.list()?;
        Ok(json_response(200, &serde_json::to_value(cards)?))
    }

    fn create(&self, request: &mut Request) -> Result<HttpResponse> {
        let body = read_body(request)?;
        let record: CardRecord = match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => return Ok(text(400, &format!("invalid card: {}", e))),
        };
        match self.cards.save(record) {
            Ok(id) => Ok(json_response(201, &json!({ "id": id }))),
            Err(Error::RepositoryError(msg)) => Ok(text(400, &msg)),
            Err(e) => Err(e),
        }
    }

    fn upload(&self, request: &mut Request, name: &str) -> Result<HttpResponse> {
        let content_type = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.as_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let body = read_body(request)?;
        match self.logos.upload(&body, name, &content_type) {
            Ok(url) => Ok(json_response(201, &json!({ "url": url }))),
            Err(Error::StorageError(msg)) => Ok(text(400, &msg)),
            Err(e) => Err(e),
        }
    }

    fn serve_logo(&self, name: &str) -> Result<HttpResponse> {
        match self.logos.open(name) {
            Ok(Some((bytes, mime))) => Ok(with_header(Response::from_data(bytes), "Content-Type", mime)),
            Ok(None) | Err(Error::StorageError(_)) => Ok(text(404, "Not Found")),
            Err(e) => Err(e),
        }
    }

    fn card(&self, id: &str) -> Result<HttpResponse> {
        let Some(card) = parse_id(id).map(|id| self.cards.get(id)).transpose()?.flatten() else {
            return Ok(text(404, "Not Found"));
        };
        let png = self.renderer.render(&card.record)?;
        Ok(with_header(Response::from_data(png), "Content-Type", "image/png"))
    }

    fn delete(&self, id: &str) -> Result<HttpResponse> {
        let removed = match parse_id(id) {
            Some(id) => self.cards.delete(id)?,
            None => false,
        };
        if !removed {
            return Ok(text(404, "Not Found"));
        }
        Ok(with_header(Response::from_data(Vec::new()).with_status_code(303), "Location", "/"))
    }
}

fn parse_id(s: &str) -> Option<u64> {
    s.parse().ok()
}

fn read_body(request: &mut Request) -> Result<Vec<u8>> {
    if request.body_length().is_some_and(|len| len as u64 > MAX_UPLOAD_BYTES) {
        return Err(Error::StorageError(format!("body exceeds {} bytes", MAX_UPLOAD_BYTES)));
    }
    read_limited(request.as_reader(), MAX_UPLOAD_BYTES)
}

/// Read at most `limit` bytes; a longer body is an error, never a truncated upload.
fn read_limited(reader: impl Read, limit: u64) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader.take(limit + 1).read_to_end(&mut body)?;
    if body.len() as u64 > limit {
        return Err(Error::StorageError(format!("body exceeds {} bytes", limit)));
    }
    Ok(body)
}

fn with_header(response: HttpResponse, name: &str, value: &str) -> HttpResponse {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(h) => response.with_header(h),
        Err(()) => response,
    }
}

fn text(status: u16, body: &str) -> HttpResponse {
    with_header(
        Response::from_string(body).with_status_code(status),
        "Content-Type",
        "text/plain; charset=utf-8",
    )
}

fn json_response(status: u16, value: &serde_json::Value) -> HttpResponse {
    with_header(
        Response::from_string(value.to_string()).with_status_code(status),
        "Content-Type",
        "application/json",
    )
}

fn error_response(err: &Error) -> HttpResponse {
    log::warn!("request failed: {}", err);
    match err {
        Error::StorageError(msg) => text(400, msg),
        _ => text(500, "Internal Server Error"),
    }
}
