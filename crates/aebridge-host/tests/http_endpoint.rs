//! Drives the simulated host over real HTTP, the way the bridge client does

use std::io::{Read, Write};
use std::net::TcpStream;

use aebridge_host::spawn_ephemeral;
use pretty_assertions::assert_eq;

/// Minimal HTTP/1.1 POST, to keep the host crate free of client dependencies
fn post(port: u16, code: &str) -> String {
    let body = serde_json::json!({ "to_eval": code }).to_string();
    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    write!(
        stream,
        "POST / HTTP/1.1\r\n\
         Host: 127.0.0.1\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{}",
        body.len(),
        body
    )
    .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    assert!(head.starts_with("HTTP/1.1 200"), "unexpected response: {head}");
    body.to_string()
}

#[test]
fn test_prelude_then_registration() {
    let host = spawn_ephemeral().unwrap();
    assert_eq!(post(host.port(), "if (typeof $._pydobe === 'undefined') {}\ntrue;"), "true");

    let body = post(host.port(), "var tmp = app;\nExtendJSON.stringify(__pydobeDescribe(tmp));");
    let descriptor: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(descriptor["objectType"], "Application");
    assert_eq!(descriptor["pydobeId"], "p1");
}

#[test]
fn test_each_host_is_independent() {
    let first = spawn_ephemeral().unwrap();
    let second = spawn_ephemeral().unwrap();
    assert_ne!(first.port(), second.port());

    post(first.port(), "app.project.bitsPerChannel = 32;");
    assert_eq!(post(first.port(), "app.project.bitsPerChannel;"), "32");
    assert_eq!(post(second.port(), "app.project.bitsPerChannel;"), "8");
}
