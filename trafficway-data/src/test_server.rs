//! Single-shot HTTP listeners for adapter tests.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    (listener, format!("http://{addr}"))
}

/// Answer the first request with `status` and `body`.
///
/// The receiver yields the request line (method, path and query).
pub(crate) async fn serve_once(
    status: &'static str,
    body: &str,
) -> (String, oneshot::Receiver<String>) {
    let (listener, base) = bind().await;
    let (seen_tx, seen_rx) = oneshot::channel();
    let body = body.to_owned();
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut buffer = vec![0_u8; 8192];
        let read = socket.read(&mut buffer).await.unwrap_or(0);
        let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default());
        let request_line = request.lines().next().unwrap_or_default().to_owned();
        seen_tx.send(request_line).ok();
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.ok();
        socket.shutdown().await.ok();
    });
    (base, seen_rx)
}

/// Base URL of a port nothing listens on.
pub(crate) async fn refused_base_url() -> String {
    let (listener, base) = bind().await;
    drop(listener);
    base
}

/// Base URL of a listener that accepts connections and never answers.
pub(crate) async fn silent_base_url() -> String {
    let (listener, base) = bind().await;
    tokio::spawn(async move {
        let held = listener.accept().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(held);
    });
    base
}
