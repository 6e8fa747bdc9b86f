// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Builds a `storesync` command isolated from the caller's environment.
///
/// The device id lives in `temp` so tests never touch the home directory.
pub fn storesync(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("storesync");
    cmd.current_dir(temp.path())
        .env("STORESYNC_DEVICE_ID_FILE", temp.path().join("device-id"))
        .env_remove("STORESYNC_AUTH_TOKEN")
        .env_remove("STORESYNC_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized temp directory
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    storesync(&temp).arg("init").assert().success();
    temp
}

/// Rewrites the project config with a single fast-retrying store.
pub fn write_config(temp: &TempDir, endpoint: &str, max_retries: u32, strategy: &str) {
    let config = format!(
        r#"[stores.favorites]
endpoint = "{endpoint}"
strategy = "{strategy}"
max_retries = {max_retries}
base_delay_ms = 10
debounce_ms = 10
request_timeout_ms = 2000
"#
    );
    std::fs::write(temp.path().join(".storesync/config.toml"), config).unwrap();
}

/// Writes a JSON file into the temp dir and returns its name.
pub fn write_json(temp: &TempDir, name: &str, content: &str) -> String {
    std::fs::write(temp.path().join(name), content).unwrap();
    name.to_string()
}

/// Minimal HTTP server answering each request with the next scripted reply.
///
/// Replies default to `200 {"success":true}` once the script runs out.
pub struct StubServer {
    port: u16,
    replies: Arc<Mutex<VecDeque<(u16, String)>>>,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let replies = Arc::new(Mutex::new(VecDeque::new()));
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let (script, seen) = (Arc::clone(&replies), Arc::clone(&bodies));
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let reply = script.lock().unwrap().pop_front();
                let (status, body) = reply.unwrap_or((200, r#"{"success":true}"#.to_string()));
                if let Some(request) = serve(stream, status, &body) {
                    seen.lock().unwrap().push(request);
                }
            }
        });

        StubServer { port, replies, bodies }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/api/sync/favorites", self.port)
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back((status, body.to_string()));
    }

    /// Request bodies received so far, parsed as JSON.
    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .map(|b| serde_json::from_str(b).unwrap())
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }
}

fn serve(stream: TcpStream, status: u16, body: &str) -> Option<String> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut request_body = vec![0; content_length];
    reader.read_exact(&mut request_body).ok()?;

    let mut stream = stream;
    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).ok()?;
    Some(String::from_utf8_lossy(&request_body).into_owned())
}

/// An endpoint nothing listens on.
pub fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api/sync/favorites")
}
