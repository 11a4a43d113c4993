use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AdoptapetStubConfig {
    pub api_key: String,
    pub listing_status: u16,
    pub listing_body: String,
    /// Number of 503s served by `pets_at_shelter` before `listing_status`.
    pub listing_failures: usize,
    /// pet_id -> `pet_details` body. Unknown ids get `{}`.
    pub details: HashMap<String, String>,
    /// pet_id -> number of 503s served before the real body.
    pub detail_failures: HashMap<String, usize>,
}

impl AdoptapetStubConfig {
    pub fn new(api_key: &str, listing_body: serde_json::Value) -> Self {
        Self {
            api_key: api_key.to_owned(),
            listing_status: 200,
            listing_body: listing_body.to_string(),
            listing_failures: 0,
            details: HashMap::new(),
            detail_failures: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, pet_id: &str, body: serde_json::Value) -> Self {
        self.details.insert(pet_id.to_owned(), body.to_string());
        self
    }

    /// Serves `body` verbatim, even when it is not JSON.
    pub fn with_raw_detail(mut self, pet_id: &str, body: &str) -> Self {
        self.details.insert(pet_id.to_owned(), body.to_owned());
        self
    }
}

pub struct AdoptapetStub {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AdoptapetStub {
    pub fn spawn(config: AdoptapetStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start adoptapet stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/search");

        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::default();
        let thread_hits = Arc::clone(&hits);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            let mut failures_left = config.detail_failures.clone();
            let mut listing_failures_left = config.listing_failures;
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = url::Url::parse(&format!("http://stub{}", request.url()))
                    .expect("parse stub request url");
                let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
                let path = url.path().to_owned();

                if query.get("key") != Some(&config.api_key)
                    || query.get("output").map(String::as_str) != Some("json")
                {
                    let _ = request.respond(
                        tiny_http::Response::from_string("{\"error\":\"unauthorized\"}")
                            .with_status_code(401),
                    );
                    continue;
                }

                let (status, body) = match path.as_str() {
                    "/search/pets_at_shelter" => {
                        *thread_hits
                            .lock()
                            .expect("lock hits")
                            .entry("pets_at_shelter".to_owned())
                            .or_default() += 1;
                        let window_ok = query.get("start_number").map(String::as_str) == Some("1")
                            && query.get("end_number").map(String::as_str) == Some("500")
                            && query.contains_key("shelter_id");
                        if !window_ok {
                            (400, "{\"error\":\"bad window\"}".to_owned())
                        } else if listing_failures_left > 0 {
                            listing_failures_left -= 1;
                            (503, "{\"error\":\"busy\"}".to_owned())
                        } else {
                            (config.listing_status, config.listing_body.clone())
                        }
                    }
                    "/search/pet_details" => {
                        let pet_id = query.get("pet_id").cloned().unwrap_or_default();
                        *thread_hits
                            .lock()
                            .expect("lock hits")
                            .entry(format!("pet_details:{pet_id}"))
                            .or_default() += 1;

                        match failures_left.get_mut(&pet_id) {
                            Some(left) if *left > 0 => {
                                *left -= 1;
                                (503, "{\"error\":\"busy\"}".to_owned())
                            }
                            _ => (
                                200,
                                config
                                    .details
                                    .get(&pet_id)
                                    .cloned()
                                    .unwrap_or_else(|| "{}".to_owned()),
                            ),
                        }
                    }
                    _ => (404, "not found".to_owned()),
                };

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            hits,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn hits(&self, key: &str) -> usize {
        self.hits
            .lock()
            .expect("lock hits")
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

impl Drop for AdoptapetStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
