use std::time::Duration;

use models::EntityKind;
use service::storage::{FileStorage, Storage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use uuid::Uuid;

use server::startup::serve;
use server::state::AppState;

#[tokio::test]
async fn shutdown_waits_for_in_flight_write_sessions() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("hbnb_shutdown_{}.json", Uuid::new_v4()));
    let state = AppState::new(FileStorage::open(&path).await?);

    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, state.clone(), async move {
        let _ = stop_rx.await;
    }));

    // Park the write session so the request below is still running at shutdown.
    let gate = state.sessions.clone();
    let held = gate.write().await;

    let body = r#"{"name": "Oregon"}"#;
    let mut stream = TcpStream::connect(addr).await?;
    let request = format!(
        "POST /api/v1/states HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await?;
    let reader = tokio::spawn(async move {
        let mut response = String::new();
        stream.read_to_string(&mut response).await.map(|_| response)
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let _ = stop_tx.send(());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!server.is_finished(), "server stopped with a request in flight");

    drop(held);
    let response = tokio::time::timeout(Duration::from_secs(5), reader).await???;
    assert!(response.starts_with("HTTP/1.1 201"), "{response}");
    tokio::time::timeout(Duration::from_secs(5), server).await???;

    let reopened = FileStorage::open(&path).await?;
    assert_eq!(reopened.count(Some(EntityKind::State)).await, 1);

    let _ = tokio::fs::remove_file(&path).await;
    Ok(())
}
