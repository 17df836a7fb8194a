//! Local HTTP server standing in for the Google and Telegram APIs in tests.

use actix_web::{dev::ServerHandle, http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::Value;
use std::sync::Mutex;

/// Throwaway RSA key for signing service-account assertions against the local server.
pub const TEST_PRIVATE_KEY: &str = include_str!("testdata/service_account_test_key.pem");

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Raw (still percent-encoded) path.
    pub path: String,
    pub query: String,
    pub body: String,
    pub authorization: Option<String>,
}

impl Recorded {
    pub fn query_has(&self, key: &str, value: &str) -> bool {
        self.query
            .split('&')
            .any(|pair| pair == format!("{}={}", key, value))
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

pub type Responder = fn(&Recorded) -> (u16, Value);

pub struct MockServer {
    pub base: String,
    requests: web::Data<Mutex<Vec<Recorded>>>,
    handle: ServerHandle,
}

impl MockServer {
    /// Binds an ephemeral port; every request is recorded and answered by `responder`.
    pub async fn start(responder: Responder) -> Self {
        let requests = web::Data::new(Mutex::new(Vec::<Recorded>::new()));
        let shared = requests.clone();

        let server = HttpServer::new(move || {
            App::new().app_data(shared.clone()).default_service(web::to(
                move |req: HttpRequest, body: web::Bytes, log: web::Data<Mutex<Vec<Recorded>>>| async move {
                    let recorded = Recorded {
                        method: req.method().to_string(),
                        path: req.path().to_string(),
                        query: req.query_string().to_string(),
                        body: String::from_utf8_lossy(&body).to_string(),
                        authorization: req
                            .headers()
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                    };
                    let (status, reply) = responder(&recorded);
                    log.lock().unwrap().push(recorded);

                    HttpResponse::build(StatusCode::from_u16(status).unwrap()).json(reply)
                },
            ))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let base = format!("http://{}", server.addrs()[0]);
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self { base, requests, handle }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
