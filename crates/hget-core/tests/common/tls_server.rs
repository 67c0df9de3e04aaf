//! HTTPS flavour of the test server: the same one-request-per-connection
//! handler loop behind a rustls session.
//!
//! The server presents `testdata/server-crt.pem` (issued by `testdata/ca.pem`
//! for `127.0.0.1` and `localhost`). With [`ClientAuth::Required`] it also
//! demands a client certificate issued by the same CA.

use super::http_server::{serve, RecordedRequest, Reply, TestServer};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig, ServerConnection, StreamOwned};
use std::io::Write;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuth {
    None,
    Required,
}

fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

fn load_certs(name: &str) -> Vec<CertificateDer<'static>> {
    CertificateDer::pem_file_iter(testdata(name))
        .expect("open certificate")
        .collect::<Result<Vec<_>, _>>()
        .expect("parse certificate")
}

fn server_config(client_auth: ClientAuth) -> Arc<ServerConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ServerConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .expect("protocol versions");
    let builder = match client_auth {
        ClientAuth::None => builder.with_no_client_auth(),
        ClientAuth::Required => {
            let mut roots = RootCertStore::empty();
            roots.add_parsable_certificates(load_certs("ca.pem"));
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .build()
                .expect("client verifier");
            builder.with_client_cert_verifier(verifier)
        }
    };
    let key = PrivateKeyDer::from_pem_file(testdata("server-key.pem")).expect("server key");
    Arc::new(
        builder
            .with_single_cert(load_certs("server-crt.pem"), key)
            .expect("server certificate"),
    )
}

/// Starts an HTTPS server in a background thread; `url` is
/// "https://127.0.0.1:<port>/". Failed handshakes are dropped silently.
pub fn start<F>(client_auth: ClientAuth, handler: F) -> TestServer
where
    F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
{
    let config = server_config(client_auth);
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let handler = Arc::new(handler);
    thread::spawn(move || {
        for tcp in listener.incoming().flatten() {
            let config = Arc::clone(&config);
            let handler = Arc::clone(&handler);
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || {
                let _ = tcp.set_read_timeout(Some(Duration::from_secs(5)));
                let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
                let conn = match ServerConnection::new(config) {
                    Ok(c) => c,
                    Err(_) => return,
                };
                let mut stream = StreamOwned::new(conn, tcp);
                serve(&mut stream, handler.as_ref(), &recorded);
                stream.conn.send_close_notify();
                let _ = stream.flush();
            });
        }
    });
    TestServer::new("https", port, requests)
}

/// Serves `body` with 200 to every request.
pub fn start_static(client_auth: ClientAuth, body: &'static str) -> TestServer {
    start(client_auth, move |_| Reply::ok(body))
}
