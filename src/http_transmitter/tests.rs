//! Tests for the HTTP transmitter against a local mock server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use crate::cloud_handler::{
    CloudEvent, CloudLog, MeasurementValue, Measurements, TransmitError, Transmitter,
};
use crate::handlers::{HandlerBuildError, HttpTransmitterBuilder};
use crate::level::FemtoLevel;

use super::HttpTransmitter;
use super::transmitter::check_status;

#[derive(Debug)]
struct CapturedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        202 => "Accepted",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    line.split_once(':')
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
}

fn read_http_request(stream: &mut TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .expect("read request line");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        if line.trim().is_empty() {
            break;
        }
        let Some((key, value)) = parse_header_line(&line) else {
            continue;
        };
        if key == "content-length" {
            content_length = value.parse().unwrap_or(0);
        }
        headers.push((key, value));
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).expect("read body");
    }

    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

/// Answer successive requests with `statuses`, one connection each.
fn spawn_mock_server(
    listener: TcpListener,
    statuses: Vec<u16>,
) -> (SocketAddr, mpsc::Receiver<CapturedRequest>) {
    let addr = listener.local_addr().expect("listener has address");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for status in statuses {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let captured = read_http_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status,
                status_text(status)
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = tx.send(captured);
        }
    });

    (addr, rx)
}

#[fixture]
fn tcp_listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

fn builder_for(addr: SocketAddr) -> HttpTransmitterBuilder {
    HttpTransmitterBuilder::new()
        .with_log_url(format!("http://{addr}/api/logs"))
        .with_event_url(format!("http://{addr}/api/events"))
        .with_connect_timeout_ms(2_000)
        .with_write_timeout_ms(5_000)
}

fn transmitter_for(addr: SocketAddr) -> HttpTransmitter {
    builder_for(addr).build().expect("build transmitter")
}

#[rstest]
fn posts_logs_as_json(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let transmitter = transmitter_for(addr);

    transmitter
        .send_log(&CloudLog::new(FemtoLevel::Warning, "battery low"))
        .expect("delivered");

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/api/logs");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    assert_eq!(body["severity"], "Warning");
    assert_eq!(body["message"], "battery low");
    assert!(body.get("exception").is_none());
}

#[rstest]
fn posts_events_to_event_url(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![202]);
    let transmitter = transmitter_for(addr);
    let measurements = Measurements::from([
        ("humidity".to_owned(), MeasurementValue::from(41)),
        ("room".to_owned(), MeasurementValue::from("lab")),
    ]);

    transmitter
        .send_event(&CloudEvent::new(12, "climate", measurements))
        .expect("delivered");

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.path, "/api/events");
    let body: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    assert_eq!(body["eventId"], 12);
    assert_eq!(body["measurements"]["humidity"], 41);
    assert_eq!(body["measurements"]["room"], "lab");
}

#[rstest]
#[case(401)]
#[case(500)]
#[case(503)]
fn non_success_status_is_an_error(tcp_listener: TcpListener, #[case] status: u16) {
    let (addr, _rx) = spawn_mock_server(tcp_listener, vec![status]);
    let transmitter = transmitter_for(addr);

    let err = transmitter
        .send_log(&CloudLog::new(FemtoLevel::Error, "rejected"))
        .expect_err("status must fail");
    assert!(matches!(err, TransmitError::Status(code) if code == status));
}

#[rstest]
fn unreachable_endpoint_is_a_transport_error(tcp_listener: TcpListener) {
    let addr = tcp_listener.local_addr().expect("address");
    drop(tcp_listener);
    let transmitter = transmitter_for(addr);

    let err = transmitter
        .send_log(&CloudLog::new(FemtoLevel::Error, "nobody home"))
        .expect_err("connection refused");
    assert!(matches!(err, TransmitError::Transport(_)));
}

fn captured_with<F>(listener: TcpListener, configure: F) -> CapturedRequest
where
    F: FnOnce(HttpTransmitterBuilder) -> HttpTransmitterBuilder,
{
    let (addr, rx) = spawn_mock_server(listener, vec![200]);
    let transmitter = configure(builder_for(addr)).build().expect("build");
    transmitter
        .send_log(&CloudLog::new(FemtoLevel::Information, "hello"))
        .expect("delivered");
    rx.recv_timeout(Duration::from_secs(5)).expect("request")
}

#[rstest]
fn sends_basic_auth_header(tcp_listener: TcpListener) {
    let captured = captured_with(tcp_listener, |b| b.with_basic_auth("user", "pass"));
    assert_eq!(captured.header("authorization"), Some("Basic dXNlcjpwYXNz"));
}

#[rstest]
fn sends_bearer_token_and_custom_headers(tcp_listener: TcpListener) {
    let captured = captured_with(tcp_listener, |b| {
        b.with_bearer_token("device-token")
            .with_header("X-Device-Id", "sensor-7")
    });
    assert_eq!(captured.header("authorization"), Some("Bearer device-token"));
    assert_eq!(captured.header("x-device-id"), Some("sensor-7"));
}

#[rstest]
#[case(HttpTransmitterBuilder::new().with_event_url("http://h/e"), "requires log_url")]
#[case(HttpTransmitterBuilder::new().with_log_url("http://h/l"), "requires event_url")]
#[case(
    HttpTransmitterBuilder::new().with_log_url("  ").with_event_url("http://h/e"),
    "log_url must not be empty"
)]
#[case(
    HttpTransmitterBuilder::new()
        .with_log_url("ftp://h/l")
        .with_event_url("http://h/e"),
    "http or https"
)]
#[case(
    HttpTransmitterBuilder::new()
        .with_log_url("http://h/l")
        .with_event_url("http://h/e")
        .with_write_timeout_ms(0),
    "write_timeout_ms"
)]
#[case(
    HttpTransmitterBuilder::new()
        .with_log_url("http://h/l")
        .with_event_url("http://h/e")
        .with_bearer_token(" "),
    "bearer token"
)]
fn builder_rejects_invalid_settings(#[case] builder: HttpTransmitterBuilder, #[case] needle: &str) {
    let err = builder.build().expect_err("invalid");
    assert!(matches!(err, HandlerBuildError::InvalidConfig(_)));
    assert!(err.to_string().contains(needle), "unexpected error: {err}");
}

#[rstest]
#[case(200, true)]
#[case(204, true)]
#[case(299, true)]
#[case(301, false)]
#[case(404, false)]
#[case(503, false)]
fn only_2xx_is_success(#[case] status: u16, #[case] ok: bool) {
    assert_eq!(check_status(status).is_ok(), ok);
}
