#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use apiqa::TestContext;
use apiqa::config::{Config, Overrides, URL_API_USERS};
use apiqa::http::ClientConfig;

/// Serve one canned response and hand back the raw request text.
pub fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
            request.push_str(&line);
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
        request.push_str(&String::from_utf8_lossy(&body));

        let mut stream = stream;
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });
    (address, handle)
}

pub fn context(base_url: &str) -> TestContext {
    let mut properties = HashMap::new();
    properties.insert(URL_API_USERS.to_string(), base_url.to_string());
    let mut ctx = TestContext::new(Arc::new(Config::new(properties, Overrides::default())));
    ctx.set_client_config(ClientConfig {
        use_system_proxy: false,
        ..ClientConfig::default()
    });
    ctx
}
