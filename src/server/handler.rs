use std::future::Future;

use tokio::io::AsyncWrite;

use crate::http::request::Request;
use crate::http::writer::ResponseWriter;

/// Application callback invoked once per successfully parsed request.
///
/// The handler owns the whole response: it must drive `writer` through a
/// valid sequence (status line, headers, body, optional trailers). An error
/// is logged by the server and the connection is closed.
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        writer: &mut ResponseWriter<W>,
        request: &Request,
    ) -> impl Future<Output = anyhow::Result<()>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}
