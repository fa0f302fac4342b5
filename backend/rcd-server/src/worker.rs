use crate::Dispatcher;

use rcd_protocol::{Response, read_request};

use std::time::Duration;

use log::{debug, error, warn};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How long a cancelled worker gets to write its failure before it is aborted.
pub const WATCHDOG_GRACE: Duration = Duration::from_secs(1);

/// Handle one connection in its own task, under a watchdog.
///
/// When the watchdog fires the worker's token is cancelled so pending waits
/// fail and the client still gets an answer; a worker that ignores the
/// cancellation is aborted after [`WATCHDOG_GRACE`].
pub fn spawn_worker(
    stream: TcpStream,
    dispatcher: Dispatcher,
    parent: &CancellationToken,
    watchdog: Duration,
) -> JoinHandle<()> {
    let cancel = parent.child_token();
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| String::from("unknown peer"));

    let mut worker = tokio::spawn(serve_connection(stream, dispatcher, cancel.clone()));

    tokio::spawn(async move {
        let outcome = match tokio::time::timeout(watchdog, &mut worker).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    "Connection from {peer} exceeded the {}s watchdog, cancelling",
                    watchdog.as_secs()
                );
                cancel.cancel();
                match tokio::time::timeout(WATCHDOG_GRACE, &mut worker).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        error!("Connection from {peer} ignored cancellation, aborting");
                        worker.abort();
                        worker.await
                    }
                }
            }
        };

        match outcome {
            Ok(()) => debug!("Connection from {peer} closed"),
            Err(e) if e.is_cancelled() => warn!("Connection from {peer} aborted"),
            Err(e) => error!("Connection from {peer} panicked: {e}"),
        }
    })
}

/// Read one request, run it and write the one response.
pub async fn serve_connection(
    mut stream: TcpStream,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
) {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let response = match read_request(&mut reader).await {
        Ok(request) => dispatcher.dispatch(request, cancel).await,
        Err(e) => {
            warn!("Rejecting request: {e}");
            Response::failure(e.to_string())
        }
    };

    if let Err(e) = response.write_to(&mut write_half).await {
        warn!("Cannot write response: {e}");
        return;
    }
    if let Err(e) = write_half.shutdown().await {
        debug!("Cannot shut down connection: {e}");
    }
}
