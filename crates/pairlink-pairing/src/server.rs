use crate::{Error, QrImage, Result, page};
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderValue, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use pairlink_core::SessionId;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use url::Url;

/// Pause after a failed accept, e.g. when out of file descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// State shared between the presenter and the HTTP handler
pub struct PairingState {
    session_id: SessionId,
    image: RwLock<Option<QrImage>>,
}

impl PairingState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            image: RwLock::new(None),
        }
    }

    /// Replace the current image; the previous one is discarded
    pub async fn set_image(&self, image: QrImage) {
        *self.image.write().await = Some(image);
    }

    pub async fn has_image(&self) -> bool {
        self.image.read().await.is_some()
    }

    async fn response(&self) -> Response<Full<Bytes>> {
        match self.image.read().await.as_ref() {
            Some(image) => build_response(
                StatusCode::OK,
                "text/html; charset=utf-8",
                page::render(image, &self.session_id),
            ),
            None => build_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "text/plain; charset=utf-8",
                page::NOT_READY_BODY.to_string(),
            ),
        }
    }
}

fn build_response(
    status: StatusCode,
    content_type: &'static str,
    body: String,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Local HTTP server serving the pairing page on every path
pub struct PairingServer {
    addr: SocketAddr,
    url: Url,
    task: JoinHandle<()>,
}

impl PairingServer {
    /// Bind to 127.0.0.1 on `port` (0 picks a free port) and start serving
    pub async fn start(port: u16, state: Arc<PairingState>) -> Result<Self> {
        let addr: SocketAddr = ([127, 0, 0, 1], port).into();

        tracing::info!("Starting pairing server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Server(format!("Failed to bind {}: {}", addr, e)))?;
        let addr = listener.local_addr()?;
        let url = Url::parse(&format!("http://localhost:{}/", addr.port()))
            .map_err(|e| Error::Server(format!("Invalid server URL: {}", e)))?;

        let task = tokio::spawn(accept_loop(listener, state));

        tracing::debug!("Pairing server listening on {}", addr);

        Ok(Self { addr, url, task })
    }

    /// Address the listener is bound to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Root URL of the pairing page
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Drop for PairingServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop(listener: TcpListener, state: Arc<PairingState>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Pairing server accept failed: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        tracing::trace!("Pairing page requested by {}", peer);

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let service = service_fn(move |_req: Request<Incoming>| {
                let state = Arc::clone(&state);
                async move { Ok::<_, Infallible>(state.response().await) }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::debug!("Pairing connection error: {}", e);
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pairlink_core::PairingCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    /// Issue a raw HTTP/1.1 request and return (status code, body)
    pub(crate) async fn http_get(addr: SocketAddr, path: &str) -> (u16, String) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        let status = head
            .split_whitespace()
            .nth(1)
            .unwrap()
            .parse::<u16>()
            .unwrap();
        (status, body.to_string())
    }

    #[tokio::test]
    async fn test_not_ready_before_image() {
        let state = Arc::new(PairingState::new(SessionId::new("a1b2c3d4")));
        let server = PairingServer::start(0, state).await.unwrap();

        let (status, body) = http_get(server.addr(), "/").await;

        assert_eq!(status, 503);
        assert_eq!(body, "QR code not ready");
    }

    #[tokio::test]
    async fn test_serves_page_on_any_path() {
        let state = Arc::new(PairingState::new(SessionId::new("a1b2c3d4")));
        let image = QrImage::encode(&PairingCode::new("code")).unwrap();
        state.set_image(image).await;
        let server = PairingServer::start(0, Arc::clone(&state)).await.unwrap();

        for path in ["/", "/favicon.ico", "/some/deep/path"] {
            let (status, body) = http_get(server.addr(), path).await;
            assert_eq!(status, 200);
            assert!(body.contains("a1b2c3d4"));
            assert!(body.contains("data:image/svg+xml;base64,"));
        }
    }

    #[tokio::test]
    async fn test_second_bind_on_same_port_fails() {
        let state = Arc::new(PairingState::new(SessionId::new("a1b2c3d4")));
        let first = PairingServer::start(0, Arc::clone(&state)).await.unwrap();

        let second = PairingServer::start(first.addr().port(), state).await;

        assert!(matches!(second, Err(Error::Server(_))));
    }

    #[tokio::test]
    async fn test_url_points_at_root() {
        let state = Arc::new(PairingState::new(SessionId::new("a1b2c3d4")));
        let server = PairingServer::start(0, state).await.unwrap();

        assert_eq!(
            server.url().as_str(),
            format!("http://localhost:{}/", server.addr().port())
        );
    }
}
