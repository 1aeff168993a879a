//! Minimal HTTP endpoint recording the JSON bodies posted to it.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A request received by [`MockCollector`].
#[derive(Clone, Debug)]
pub struct Received {
    pub path: String,
    pub body: serde_json::Value,
}

/// Accepts connections on an ephemeral port and answers each request with
/// the current status code.
#[derive(Clone)]
pub struct MockCollector {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Received>>>,
    status: Arc<Mutex<u16>>,
}

impl MockCollector {
    pub fn start() -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind collector");
        let collector = Self {
            addr: listener.local_addr().expect("collector address"),
            received: Arc::default(),
            status: Arc::new(Mutex::new(200)),
        };
        let shared = collector.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                shared.serve(stream);
            }
        });
        collector
    }

    pub fn log_url(&self) -> String {
        format!("http://{}/api/logs", self.addr)
    }

    pub fn event_url(&self) -> String {
        format!("http://{}/api/events", self.addr)
    }

    pub fn set_status(&self, status: u16) {
        *self.status.lock().expect("status lock") = status;
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().expect("received lock").clone()
    }

    /// `message` fields of the logs received so far.
    pub fn log_messages(&self) -> Vec<String> {
        self.received()
            .iter()
            .filter(|r| r.path == "/api/logs")
            .filter_map(|r| r.body["message"].as_str().map(str::to_owned))
            .collect()
    }

    fn serve(&self, mut stream: TcpStream) {
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
        let Ok(clone) = stream.try_clone() else { return };
        let mut reader = BufReader::new(clone);

        let mut request_line = String::new();
        if reader.read_line(&mut request_line).is_err() {
            return;
        }
        let path = request_line
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_owned();

        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':')
                && key.trim().eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).is_err() {
            return;
        }

        let status = *self.status.lock().expect("status lock");
        if (200..300).contains(&status) {
            let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
            self.received
                .lock()
                .expect("received lock")
                .push(Received { path, body });
        }
        let response =
            format!("HTTP/1.1 {status} Mock\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let _ = stream.write_all(response.as_bytes());
    }
}
