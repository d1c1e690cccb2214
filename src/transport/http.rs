//! Minimal HTTP/1.1 front end for the engine.
//!
//! One thread per connection, one request per connection. Routes:
//! `/simulate` returns the full [`AggregateResults`], `/summary` returns a
//! [`RunSummary`] of the same run.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use log::{error, info, warn};
use uuid::Uuid;

use super::codec::{decode_configuration, encode_json};
use super::config::ServerConfig;
use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::execution::simulation_engine::SimulationEngine;
use crate::core::summary::RunSummary;
use crate::core::types::AggregateResults;

/// A response ready to be written to the socket
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }

    pub fn text(status: u16, message: impl std::fmt::Display) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: format!("{}\n", message).into_bytes(),
        }
    }

    pub fn from_error(err: &SimulationError) -> Self {
        let status = if err.is_client_error() { 400 } else { 500 };
        Self::text(status, err)
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            413 => "Payload Too Large",
            431 => "Request Header Fields Too Large",
            _ => "Internal Server Error",
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        )
        .into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// A parsed request: only what routing needs
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

/// Why a request could not be read off the socket
#[derive(Debug)]
pub enum RequestError {
    Malformed(String),
    HeadersTooLarge,
    TooLarge(usize),
    Io(io::Error),
}

impl From<io::Error> for RequestError {
    fn from(err: io::Error) -> Self {
        RequestError::Io(err)
    }
}

/// Read the request line, headers and a `Content-Length` body.
///
/// The request line and headers together may use at most `max_header_bytes`.
pub fn read_request<R: BufRead>(
    reader: &mut R,
    max_header_bytes: usize,
    max_body_bytes: usize,
) -> Result<HttpRequest, RequestError> {
    let mut header_budget = max_header_bytes;
    let request_line = read_header_line(reader, &mut header_budget)?
        .ok_or_else(|| RequestError::Malformed("empty request".to_string()))?;

    // Parse: POST /simulate HTTP/1.1
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method.to_string(), target),
        _ => {
            return Err(RequestError::Malformed(format!(
                "bad request line {:?}",
                request_line.trim_end()
            )))
        }
    };
    let path = target.split('?').next().unwrap_or(target).to_string();

    let mut content_length = 0usize;
    while let Some(line) = read_header_line(reader, &mut header_budget)? {
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| {
                    RequestError::Malformed(format!("bad Content-Length {:?}", value.trim()))
                })?;
            }
        }
    }

    if content_length > max_body_bytes {
        return Err(RequestError::TooLarge(content_length));
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    Ok(HttpRequest { method, path, body })
}

/// Read one CRLF-terminated line without consuming more than `budget` bytes.
///
/// Returns `None` at end of input.
fn read_header_line<R: BufRead>(
    reader: &mut R,
    budget: &mut usize,
) -> Result<Option<String>, RequestError> {
    let mut raw = Vec::new();
    let read = reader.by_ref().take(*budget as u64).read_until(b'\n', &mut raw)?;
    if read == 0 {
        return if *budget == 0 {
            Err(RequestError::HeadersTooLarge)
        } else {
            Ok(None)
        };
    }

    *budget -= read;
    if *budget == 0 && !raw.ends_with(b"\n") {
        return Err(RequestError::HeadersTooLarge);
    }

    String::from_utf8(raw)
        .map(Some)
        .map_err(|_| RequestError::Malformed("header is not valid UTF-8".to_string()))
}

/// Discard at most `limit` bytes of a refused body; returns the bytes dropped.
fn drain_refused_body<R: Read>(reader: &mut R, length: usize, limit: usize) -> u64 {
    let bound = length.min(limit) as u64;
    io::copy(&mut reader.take(bound), &mut io::sink()).unwrap_or(0)
}

/// Dispatch a request to the engine and build the response.
///
/// Any method is accepted on the simulation routes.
pub fn route(engine: &SimulationEngine, request: &HttpRequest) -> HttpResponse {
    let outcome = match request.path.as_str() {
        "/simulate" => simulate(engine, &request.body).and_then(|results| encode_json(&results)),
        "/summary" => summarize(engine, &request.body).and_then(|summary| encode_json(&summary)),
        _ => return HttpResponse::text(404, format!("no route for {}", request.path)),
    };

    match outcome {
        Ok(body) => HttpResponse::json(body),
        Err(err) => HttpResponse::from_error(&err),
    }
}

fn simulate(engine: &SimulationEngine, body: &[u8]) -> SimulationResult<AggregateResults> {
    let configuration = decode_configuration(body)?;
    engine.run(&configuration)
}

fn summarize(engine: &SimulationEngine, body: &[u8]) -> SimulationResult<RunSummary> {
    let configuration = decode_configuration(body)?;
    let results = engine.run(&configuration)?;
    RunSummary::from_results(&results, configuration.top_n)
}

/// Blocking HTTP server that runs the engine for each request
pub struct SimulationServer {
    listener: TcpListener,
    engine: Arc<SimulationEngine>,
    config: ServerConfig,
}

impl SimulationServer {
    pub fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(&config.bind_address)?;
        let engine = Arc::new(SimulationEngine::new(config.engine.clone()));
        Ok(Self {
            listener,
            engine,
            config,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    pub fn serve(self) -> io::Result<()> {
        info!("Server started at {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!("accept failed: {}", e);
                    continue;
                }
            };

            let engine = Arc::clone(&self.engine);
            let config = self.config.clone();
            thread::spawn(move || {
                if let Err(e) = handle_connection(stream, &engine, &config) {
                    error!("connection error: {}", e);
                }
            });
        }

        Ok(())
    }
}

fn handle_connection(
    stream: TcpStream,
    engine: &SimulationEngine,
    config: &ServerConfig,
) -> io::Result<()> {
    let request_id = Uuid::new_v4();
    stream.set_read_timeout(Some(config.read_timeout))?;

    let mut reader = BufReader::new(&stream);
    let limits = (config.max_header_bytes, config.max_body_bytes);
    let response = match read_request(&mut reader, limits.0, limits.1) {
        Ok(request) => {
            let response = route(engine, &request);
            if response.status == 200 {
                info!(
                    "[{}] {} {} -> {} ({} bytes)",
                    request_id,
                    request.method,
                    request.path,
                    response.status,
                    response.body.len()
                );
            } else {
                warn!(
                    "[{}] {} {} -> {}: {}",
                    request_id,
                    request.method,
                    request.path,
                    response.status,
                    String::from_utf8_lossy(&response.body).trim_end()
                );
            }
            response
        }
        Err(RequestError::Malformed(reason)) => {
            warn!("[{}] malformed request: {}", request_id, reason);
            HttpResponse::text(400, reason)
        }
        Err(RequestError::HeadersTooLarge) => {
            warn!("[{}] headers exceed {} bytes", request_id, config.max_header_bytes);
            HttpResponse::text(
                431,
                format!("request line and headers exceed {} bytes", config.max_header_bytes),
            )
        }
        Err(RequestError::TooLarge(length)) => {
            warn!("[{}] body of {} bytes refused", request_id, length);
            // Unread input at close turns into a reset that can swallow the response.
            drain_refused_body(&mut reader, length, config.max_body_bytes);
            HttpResponse::text(
                413,
                format!("request body exceeds {} bytes", config.max_body_bytes),
            )
        }
        Err(RequestError::Io(e)) => return Err(e),
    };

    let mut writer = &stream;
    writer.write_all(&response.to_bytes())?;
    writer.flush()
}
