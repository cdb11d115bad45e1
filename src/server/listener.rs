use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::http::connection::serve_connection;
use crate::server::Handler;

/// A running server. Accepting happens on a background task.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    accept_task: Option<JoinHandle<()>>,
}

impl Server {
    /// Binds `port` on all interfaces and starts accepting.
    ///
    /// Returns as soon as the socket is bound; every accepted connection is
    /// served on its own task. Port 0 picks an ephemeral port, see
    /// [`Server::local_addr`].
    pub async fn serve<H: Handler>(port: u16, handler: H) -> anyhow::Result<Server> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let closed = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());

        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::new(handler),
            Arc::clone(&closed),
            Arc::clone(&shutdown),
        ));

        Ok(Server {
            local_addr,
            closed,
            shutdown,
            accept_task: Some(accept_task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting and releases the listening socket.
    ///
    /// Connections already being served run to completion. Calling this
    /// more than once is a no-op.
    pub async fn close(&mut self) -> anyhow::Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.shutdown.notify_one();

        if let Some(task) = self.accept_task.take() {
            task.await.context("accept loop terminated abnormally")?;
        }
        info!("Server on {} closed", self.local_addr);
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.shutdown.notify_one();
        }
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    loop {
        let accepted = tokio::select! {
            res = listener.accept() => res,
            _ = shutdown.notified() => break,
        };

        match accepted {
            Ok((socket, peer)) => {
                info!("Accepted connection from {}", peer);

                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    if let Err(e) = serve_connection(socket, handler.as_ref()).await {
                        error!("Connection error from {}: {:#}", peer, e);
                    }
                });
            }
            Err(e) => {
                // Accept errors after close() are expected.
                if closed.load(Ordering::Acquire) {
                    break;
                }
                warn!(error = %e, "Error accepting connection");
            }
        }
    }

    debug!("Accept loop stopped");
}
