//! Minimal HTTP/1.1 server for integration tests.
//!
//! Every connection carries one request. The handler decides the response;
//! all requests are recorded so tests can inspect the headers a getter sent.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Delay before answering.
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
            delay: None,
        }
    }

    pub fn redirect(location: &str) -> Self {
        let mut r = Self::status(302, "");
        r.headers.push(("Location".to_string(), location.to_string()));
        r
    }
}

pub struct TestServer {
    pub url: String,
    pub port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestServer {
    pub(crate) fn new(scheme: &str, port: u16, requests: Arc<Mutex<Vec<RecordedRequest>>>) -> Self {
        Self {
            url: format!("{}://127.0.0.1:{}/", scheme, port),
            port,
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("server saw no request")
    }
}

/// Starts a server in a background thread. `url` is the base URL
/// (e.g. "http://127.0.0.1:12345/"). The server runs until the process exits.
pub fn start<F>(handler: F) -> TestServer
where
    F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let handler = Arc::new(handler);
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let handler = Arc::clone(&handler);
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || {
                let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
                let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
                serve(&mut stream, handler.as_ref(), &recorded)
            });
        }
    });
    TestServer::new("http", port, requests)
}

/// Serves `body` with 200 to every request.
pub fn start_static(body: &'static str) -> TestServer {
    start(move |_| Reply::ok(body))
}

/// A port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().unwrap().port()
}

/// Answers the single request on `stream`. Shared with the TLS server.
pub(crate) fn serve<S, F>(stream: &mut S, handler: &F, recorded: &Mutex<Vec<RecordedRequest>>)
where
    S: Read + Write,
    F: Fn(&RecordedRequest) -> Reply + ?Sized,
{
    let head = match read_head(stream) {
        Some(h) => h,
        None => return,
    };
    let request = match parse_request(&head) {
        Some(r) => r,
        None => return,
    };
    recorded.lock().unwrap().push(request.clone());

    let reply = handler(&request);
    if let Some(delay) = reply.delay {
        thread::sleep(delay);
    }
    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reason(reply.status),
        reply.body.len()
    );
    for (k, v) in &reply.headers {
        response.push_str(&format!("{}: {}\r\n", k, v));
    }
    response.push_str("\r\n");
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&reply.body);
    let _ = stream.flush();
}

/// Reads until the blank line that ends the request head.
fn read_head(stream: &mut impl Read) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if data.windows(4).any(|w| w == b"\r\n\r\n") {
            return String::from_utf8(data).ok();
        }
    }
}

fn parse_request(head: &str) -> Option<RecordedRequest> {
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    Some(RecordedRequest {
        method,
        path,
        headers,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
