//! HTTP batch sender
//!
//! POSTs each batch as a JSON array. Lines that are not JSON (when a text
//! formatter was configured) are sent as JSON strings.

use super::batch::{BatchSender, BatchTransport};
use crate::core::{LoggerError, Result};
use reqwest::blocking::Client;
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Batched HTTP transport
pub type HttpTransport = BatchTransport<HttpSender>;

pub struct HttpSender {
    endpoint: String,
    client: Client,
    headers: Vec<(String, String)>,
    bearer_token: Option<String>,
}

impl HttpSender {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::builder(endpoint).build()
    }

    /// # Example
    ///
    /// ```no_run
    /// use fanout_logger::transports::{HttpSender, HttpTransport};
    /// use std::time::Duration;
    ///
    /// let sender = HttpSender::builder("https://logs.example.com/ingest")
    ///     .header("X-Source", "billing")
    ///     .bearer_token("s3cr3t")
    ///     .timeout(Duration::from_secs(5))
    ///     .build()?;
    /// let transport = HttpTransport::new(sender)?;
    /// # Ok::<(), fanout_logger::LoggerError>(())
    /// ```
    pub fn builder(endpoint: impl Into<String>) -> HttpSenderBuilder {
        HttpSenderBuilder {
            endpoint: endpoint.into(),
            timeout: DEFAULT_HTTP_TIMEOUT,
            headers: Vec::new(),
            bearer_token: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn body(batch: &[String]) -> Vec<serde_json::Value> {
        batch
            .iter()
            .map(|line| {
                serde_json::from_str(line).unwrap_or_else(|_| serde_json::Value::String(line.clone()))
            })
            .collect()
    }
}

impl BatchSender for HttpSender {
    fn name(&self) -> &str {
        "http"
    }

    fn send(&self, batch: &[String]) -> Result<()> {
        let mut request = self.client.post(&self.endpoint).json(&Self::body(batch));
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }
        if let Some(ref token) = self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoggerError::transport(
                "http",
                format!("{} responded with {}", self.endpoint, status),
            ));
        }
        Ok(())
    }
}

#[must_use]
pub struct HttpSenderBuilder {
    endpoint: String,
    timeout: Duration,
    headers: Vec<(String, String)>,
    bearer_token: Option<String>,
}

impl HttpSenderBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<HttpSender> {
        if self.endpoint.is_empty() {
            return Err(LoggerError::config("http", "endpoint must not be empty"));
        }
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(HttpSender {
            endpoint: self.endpoint,
            client,
            headers: self.headers,
            bearer_token: self.bearer_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Accept one request, answer with `status`, and return its headers and body
    fn serve_once(status: &'static str) -> (String, thread::JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/ingest", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut headers = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                headers.push_str(&line);
            }

            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = stream;
            write!(stream, "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status)
                .unwrap();
            (headers, String::from_utf8(body).unwrap())
        });

        (url, handle)
    }

    #[test]
    fn test_posts_json_array_with_headers() {
        let (url, server) = serve_once("200 OK");
        let sender = HttpSender::builder(url)
            .header("X-Source", "tests")
            .bearer_token("tok")
            .build()
            .unwrap();

        sender
            .send(&[r#"{"message":"a"}"#.to_string(), "plain line".to_string()])
            .unwrap();

        let (headers, body) = server.join().unwrap();
        let headers = headers.to_ascii_lowercase();
        assert!(headers.contains("x-source: tests"));
        assert!(headers.contains("authorization: bearer tok"));

        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed[0]["message"], "a");
        assert_eq!(parsed[1], "plain line");
    }

    #[test]
    fn test_non_success_status_is_error() {
        let (url, server) = serve_once("503 Service Unavailable");
        let sender = HttpSender::new(url).unwrap();

        let err = sender.send(&["{}".to_string()]).unwrap_err();
        assert!(err.to_string().contains("503"));
        server.join().unwrap();
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        assert!(HttpSender::new("").is_err());
    }
}
