//! Shared test helpers for integration tests
//!
//! `StubServer` is a tiny HTTP/1.1 responder on a loopback port: each route
//! answers with a canned status and JSON body, and every request is recorded
//! so tests can check what the CLI actually sent.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

/// Helper to get a clm command
pub fn clm() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("clm"));
    cmd.env_remove("CLM_CONFIG")
        .env_remove("CLM_API_BASE_URL")
        .env_remove("CLM_TIMEOUT_SECS")
        .env_remove("CLM_PAGE_SIZE")
        .env_remove("RUST_LOG");
    cmd
}

#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new(method: &'static str, path: impl Into<String>, status: u16, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            body: body.to_string(),
        }
    }

    pub fn get(path: impl Into<String>, body: Value) -> Self {
        Self::new("GET", path, 200, body)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

pub struct StubServer {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &routes, &recorded);
            }
        });

        Self { port, requests }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests other than GET
    pub fn mutations(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != "GET")
            .collect()
    }
}

fn handle(stream: TcpStream, routes: &[Route], recorded: &Mutex<Vec<RecordedRequest>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
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

    let mut body = vec![0u8; content_length];
    let _ = reader.read_exact(&mut body);

    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, body) = routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, json!({"detail": "Not Found"}).to_string()));

    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

// ============================================================================
// Fixtures
// ============================================================================

pub const CONTRACTS_PATH: &str = "/api/new_contract_request/api/contracts_request_list";
pub const SUMMARY_PATH: &str = "/api/new_contract_request/contracts/summary";
pub const AUDIT_PATH: &str = "/api/admin/audit-logs";
pub const CHECKLIST_PATH: &str = "/api/closeout_report/checklist/default";

pub fn edit_path(id: i64) -> String {
    format!("/api/new_contract_request/api/contracts/{}/edit", id)
}

pub fn delete_path(id: i64) -> String {
    format!("/api/new_contract_request/api/contracts/{}/delete", id)
}

pub fn contracts() -> Value {
    json!([
        {
            "id": 1,
            "title": "Road resurfacing",
            "agency": "Department of Commerce",
            "contract_type": "Construction",
            "value": 1000.0,
            "status": "intake",
            "created_at": "2024-03-15T09:30:00"
        },
        {
            "id": 2,
            "title": "Cloud hosting",
            "agency": "Department of Defense",
            "contract_type": "Software License",
            "value": 5000.0,
            "status": "approved",
            "created_at": "2024-02-01T12:00:00",
            "file_path": "uploads/contracts/hosting-sow.pdf"
        },
        {
            "id": 3,
            "title": "Bridge inspection",
            "agency": "Department of Commerce",
            "contract_type": "Consulting",
            "value": 250000.0,
            "status": "evaluation",
            "created_at": "2024-01-20T08:15:00"
        }
    ])
}

pub fn audit_logs() -> Value {
    json!([
        {
            "id": 1,
            "timestamp": "2024-03-15 14:30:22",
            "user": "john.smith@agency.gov",
            "action": "Contract Risk Assessment",
            "ai_decision": "High Risk - Recommend Legal Review",
            "confidence": 87,
            "details": "Contract contains unusual termination clauses",
            "category": "risk"
        },
        {
            "id": 2,
            "timestamp": "2024-03-15 13:45:10",
            "user": "sarah.johnson@agency.gov",
            "action": "Vendor Qualification",
            "ai_decision": "Approved - Low Risk Vendor",
            "confidence": 94,
            "details": "Vendor has strong performance history",
            "category": "approval"
        },
        {
            "id": 3,
            "timestamp": "2024-03-14 16:05:00",
            "user": "john.smith@agency.gov",
            "action": "Compliance Check",
            "ai_decision": "Pending Review - Insufficient Data",
            "confidence": 45,
            "details": "Missing financial statements, with \"draft\" notes",
            "category": "pending"
        }
    ])
}

pub fn checklist() -> Value {
    json!({
        "checklist": [
            {"id": 1, "text": "Final deliverables accepted", "checked": true, "required": true},
            {"id": 2, "text": "Final invoice paid", "checked": false, "required": true},
            {"id": 3, "text": "Lessons learned recorded", "checked": false, "required": false}
        ]
    })
}

/// Stub backend with every list endpoint plus any extra routes
pub fn backend(extra: Vec<Route>) -> StubServer {
    let mut routes = extra;
    routes.push(Route::get(CONTRACTS_PATH, contracts()));
    routes.push(Route::get(AUDIT_PATH, audit_logs()));
    routes.push(Route::get(CHECKLIST_PATH, checklist()));
    StubServer::start(routes)
}

/// A `clm` command pointed at the stub server
pub fn clm_at(server: &StubServer) -> Command {
    let mut cmd = clm();
    cmd.env("CLM_API_BASE_URL", server.url())
        .env("CLM_TIMEOUT_SECS", "5");
    cmd
}

/// Write a config file into a temp dir
pub fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
