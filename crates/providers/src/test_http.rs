//! Scripted HTTP fixture for client tests.
//!
//! Binds a local TCP listener and answers each incoming connection with
//! the next canned response, closing the connection afterwards so the
//! client reconnects per attempt. Enough HTTP for reqwest to parse; no
//! server framework needed in the test tree.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Spawn a listener that serves `responses` in order, one per connection.
/// Returns the base URL to point a client at.
pub async fn spawn_script(responses: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            // Drain the request head + body; scripted responses don't
            // depend on its contents.
            let mut buf = vec![0u8; 64 * 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}

/// Build a minimal HTTP/1.1 response with the given status line and body.
pub fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}
