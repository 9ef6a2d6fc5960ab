//! Loopback HTTP stub for exercising the remote adapters.

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned answer returned for every request.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

/// Serve `response` on an ephemeral local port until the runtime stops.
///
/// Must be called from within a Tokio runtime.
pub async fn spawn_stub_server(response: StubResponse) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            if let Err(err) = answer(stream, &response).await {
                eprintln!("stub server failed to answer: {err}");
            }
        }
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    listener.local_addr().expect("listener address")
}

async fn answer(mut stream: TcpStream, response: &StubResponse) -> io::Result<()> {
    let request = read_request(&mut stream).await?;
    let head_only = request.starts_with("HEAD ");
    let reply = format!(
        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        if head_only { "" } else { response.body.as_str() },
    );
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await
}

/// Read one request, including any body announced by `content-length`.
async fn read_request(stream: &mut TcpStream) -> io::Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed mid-request",
            ));
        }
        buffer.extend(chunk.iter().take(read));
        let text = String::from_utf8_lossy(&buffer);
        if let Some((head, body)) = text.split_once("\r\n\r\n")
            && body.len() >= content_length(head)
        {
            return Ok(text.into_owned());
        }
    }
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
