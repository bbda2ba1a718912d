//! Minimal canned-response HTTP server for crawl tests.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub content_type: &'static str,
    pub location: Option<String>,
    pub body: String,
}

impl Page {
    pub fn html(body: &str) -> Self {
        Page {
            status: 200,
            content_type: "text/html; charset=utf-8",
            location: None,
            body: body.to_string(),
        }
    }

    pub fn plain(body: &str) -> Self {
        Page {
            status: 200,
            content_type: "text/plain",
            location: None,
            body: body.to_string(),
        }
    }

    pub fn redirect(to: &str) -> Self {
        Page {
            status: 302,
            content_type: "text/html",
            location: Some(to.to_string()),
            body: String::new(),
        }
    }
}

/// Serves `pages` keyed by request path on an ephemeral localhost port
/// and returns the base URL. Unknown paths answer 404. The accept loop
/// runs on a detached thread for the rest of the test process.
pub fn serve(pages: HashMap<String, Page>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    let pages = Arc::new(pages);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let pages = Arc::clone(&pages);
            thread::spawn(move || handle(stream, &pages));
        }
    });
    base
}

fn handle(mut stream: TcpStream, pages: &HashMap<String, Page>) {
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buffer) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buffer[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/");

    let response = match pages.get(path) {
        Some(page) => {
            let mut head = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                page.status,
                page.content_type,
                page.body.len(),
            );
            if let Some(location) = &page.location {
                head.push_str(&format!("Location: {}\r\n", location));
            }
            format!("{}\r\n{}", head, page.body)
        }
        None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            .to_string(),
    };
    let _ = stream.write_all(response.as_bytes());
}
