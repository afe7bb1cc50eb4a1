// Viewer server for the networked mode.
// One route, `/`: a plain GET gets the viewer page, a WebSocket upgrade on the
// same path subscribes to the capture loop's broadcast.

use crate::error::Error;
use crate::transport::{Publisher, ViewerMessage};
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{Html, IntoResponse, Response},
    routing::get,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// The static viewer page, compiled into the binary.
pub const INDEX_HTML: &str = include_str!("../static/index.html");

pub fn router(publisher: Publisher) -> Router {
    Router::new().route("/", get(index)).with_state(publisher)
}

async fn index(State(publisher): State<Publisher>, ws: Option<WebSocketUpgrade>) -> Response {
    match ws {
        Some(ws) => {
            // Subscribe before the upgrade finishes so the viewer's stream starts now.
            let rx = publisher.subscribe();
            ws.on_upgrade(move |socket| handle_viewer(socket, rx))
        }
        None => Html(INDEX_HTML).into_response(),
    }
}

/// Forward broadcast messages to one viewer until either side goes away.
async fn handle_viewer(mut socket: WebSocket, mut rx: tokio::sync::broadcast::Receiver<ViewerMessage>) {
    log::info!("Viewer connected");

    loop {
        tokio::select! {
            // Viewers never send anything meaningful; watch for close only.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        log::debug!("Viewer socket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
            outgoing = rx.recv() => {
                let msg = match outgoing {
                    Ok(msg) => msg,
                    Err(RecvError::Lagged(skipped)) => {
                        log::debug!("Viewer lagging, skipped {skipped} messages");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let text = match msg.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("Dropping unserialisable message: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    }

    log::info!("Viewer disconnected");
}

/// Bind `addr`, returning the listener and the address actually bound.
pub async fn bind(addr: &str) -> Result<(TcpListener, SocketAddr), Error> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    Ok((listener, local))
}

/// Serve viewers until `stop` is cancelled.
pub async fn serve(listener: TcpListener, publisher: Publisher, stop: CancellationToken) -> Result<(), Error> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Viewer page at http://{addr}/");
    }
    axum::serve(listener, router(publisher))
        .with_graceful_shutdown(async move {
            stop.cancelled().await;
            log::info!("Viewer server shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::PointerUpdate;
    use futures_util::StreamExt;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    async fn start() -> (SocketAddr, Publisher, CancellationToken) {
        let publisher = Publisher::new();
        let stop = CancellationToken::new();
        let (listener, addr) = bind("127.0.0.1:0").await.unwrap();
        tokio::spawn(serve(listener, publisher.clone(), stop.clone()));
        (addr, publisher, stop)
    }

    async fn wait_for_viewers(publisher: &Publisher, n: usize) {
        for _ in 0..200 {
            if publisher.viewer_count() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("viewer never subscribed");
    }

    #[tokio::test]
    async fn plain_get_serves_the_page() {
        let (addr, _publisher, stop) = start().await;
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut body = String::new();
        stream.read_to_string(&mut body).await.unwrap();
        assert!(body.starts_with("HTTP/1.1 200"));
        assert!(body.contains("text/html"));
        assert!(body.contains("<canvas"));
        stop.cancel();
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let (addr, _publisher, stop) = start().await;
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /api HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut body = String::new();
        stream.read_to_string(&mut body).await.unwrap();
        assert!(body.starts_with("HTTP/1.1 404"));
        stop.cancel();
    }

    #[tokio::test]
    async fn viewer_receives_only_messages_after_connecting() {
        let (addr, publisher, stop) = start().await;
        publisher.publish(ViewerMessage::VideoFeed("before".into()));

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/")).await.unwrap();
        wait_for_viewers(&publisher, 1).await;

        publisher.publish(ViewerMessage::HandData(PointerUpdate::none()));
        publisher.publish(ViewerMessage::VideoFeed("after".into()));

        let first = ws.next().await.unwrap().unwrap();
        assert_eq!(
            first,
            WsMessage::Text(r#"{"event":"hand_data","data":{"x":null,"y":null,"gesture":"none"}}"#.into())
        );
        let second = ws.next().await.unwrap().unwrap();
        assert_eq!(second, WsMessage::Text(r#"{"event":"video_feed","data":"after"}"#.into()));
        stop.cancel();
    }

    #[tokio::test]
    async fn every_viewer_gets_the_broadcast() {
        let (addr, publisher, stop) = start().await;
        let url = format!("ws://{addr}/");
        let (mut a, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        let (mut b, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        wait_for_viewers(&publisher, 2).await;

        publisher.publish(ViewerMessage::VideoFeed("x".into()));
        for ws in [&mut a, &mut b] {
            let msg = ws.next().await.unwrap().unwrap();
            assert_eq!(msg, WsMessage::Text(r#"{"event":"video_feed","data":"x"}"#.into()));
        }
        stop.cancel();
    }

    #[tokio::test]
    async fn disconnect_releases_the_subscription() {
        let (addr, publisher, stop) = start().await;
        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/")).await.unwrap();
        wait_for_viewers(&publisher, 1).await;
        ws.close(None).await.unwrap();
        for _ in 0..200 {
            if publisher.viewer_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(publisher.viewer_count(), 0);
        stop.cancel();
    }
}
