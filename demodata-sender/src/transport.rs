// Demodata Sender - Transport
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Snapshot delivery over a pluggable transport.

use crate::config::TransportConfig;
use crate::error::{SendError, TransportError};
use crate::retry::{with_retry_metrics, RetryStrategy, DEFAULT_ATTEMPTS};
use demodata::Snapshot;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use std::time::Duration;
use tracing::{debug, info};

/// Delivers one serialized payload.
pub trait Transport {
    /// Send `body` and return the endpoint's response body.
    fn send(&self, body: &str) -> Result<String, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, body: &str) -> Result<String, TransportError> {
        (**self).send(body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, body: &str) -> Result<String, TransportError> {
        (**self).send(body)
    }
}

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    method: Method,
    url: Url,
    headers: HeaderMap,
}

impl HttpTransport {
    /// Build a transport from a configuration.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            // Validated above
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            method: config.http_method()?,
            url: config.url()?,
            headers,
        })
    }

    /// Request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn send(&self, body: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone())
            .body(body.to_owned())
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    /// Endpoint response body
    pub response: String,
    /// Attempts made, the successful one included
    pub attempts: u32,
    /// Time spent, back-off included
    pub elapsed: Duration,
}

/// Serializes snapshots and delivers them with bounded retry.
#[derive(Debug, Clone)]
pub struct Sender<T> {
    transport: T,
    strategy: RetryStrategy,
}

impl<T: Transport> Sender<T> {
    /// Sender with the default delivery policy (3 attempts).
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            strategy: RetryStrategy::delivery(DEFAULT_ATTEMPTS),
        }
    }

    /// Replace the retry policy.
    pub fn with_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Retry policy in use.
    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver an already serialized payload.
    pub fn send_payload(&self, payload: &str) -> Result<SendReport, SendError> {
        debug!(
            bytes = payload.len(),
            max_attempts = self.strategy.max_attempts(),
            "sending payload"
        );

        let result = with_retry_metrics(&self.strategy, || self.transport.send(payload))
            .map_err(|(last, attempts)| SendError::RetriesExhausted { attempts, last })?;

        Ok(SendReport {
            response: result.value,
            attempts: result.attempts,
            elapsed: result.total_duration,
        })
    }

    /// Serialize and deliver a snapshot, logging the payload and response.
    pub fn send_snapshot(&self, snapshot: &Snapshot) -> Result<SendReport, SendError> {
        let payload = snapshot.to_json()?;
        let report = self.send_payload(&payload)?;

        info!("Sent payload: {}", payload);
        info!(attempts = report.attempts, "Endpoint response: {}", report.response);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// One-shot HTTP server returning `status` and `body`; yields the
    /// request line, headers and body it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                request.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut payload = vec![0; content_length];
            reader.read_exact(&mut payload).unwrap();
            request.push_str(&String::from_utf8(payload).unwrap());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            request
        });

        (endpoint, handle)
    }

    #[test]
    fn test_http_post() {
        let (endpoint, server) = serve_once("200 OK", r#"{"ok":true}"#);
        let mut config = TransportConfig::new(endpoint);
        config.path = "/ingest".to_string();
        config
            .headers
            .insert("x-device-id".to_string(), "demo-01".to_string());

        let transport = HttpTransport::new(&config).unwrap();
        let response = transport.send(r#"{"schemaVersion":"1.0"}"#).unwrap();
        assert_eq!(response, r#"{"ok":true}"#);

        let request = server.join().unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /ingest HTTP/1.1\r\n"));
        assert!(lower.contains("content-type: application/json"));
        assert!(lower.contains("x-device-id: demo-01"));
        assert!(request.ends_with(r#"{"schemaVersion":"1.0"}"#));
    }

    #[test]
    fn test_http_error_status() {
        let (endpoint, server) = serve_once("503 Service Unavailable", "busy");
        let transport = HttpTransport::new(&TransportConfig::new(endpoint)).unwrap();

        let err = transport.send("{}").unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("unexpected error: {other}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let transport = HttpTransport::new(&TransportConfig::new(endpoint)).unwrap();
        assert!(matches!(
            transport.send("{}").unwrap_err(),
            TransportError::Http(_)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = HttpTransport::new(&TransportConfig::new("nowhere")).unwrap_err();
        assert!(matches!(err, TransportError::Config(_)));
    }
}
