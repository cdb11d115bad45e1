use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::Error;
use crate::http::parser::ParseError;
use crate::http::request::Request;
use crate::http::response::{default_headers, StatusCode};
use crate::http::writer::{ResponseWriter, WriterError};
use crate::server::Handler;

/// Drives a single connection: parse one request, answer it, close.
///
/// A request that fails to parse is answered with a 400 carrying the error
/// text and never reaches `handler`. The stream is shut down on every path.
pub async fn serve_connection<S, H>(stream: S, handler: &H) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
    H: Handler,
{
    let (mut reader, writer) = tokio::io::split(stream);
    let mut writer = ResponseWriter::new(writer);

    let result = match Request::from_reader(&mut reader).await {
        Ok(request) => {
            debug!(
                method = %request.method(),
                target = %request.target(),
                headers = request.headers.len(),
                "Dispatching request"
            );
            handler.handle(&mut writer, &request).await
        }
        Err(Error::Parse(e)) => {
            warn!(error = %e, "Rejecting malformed request");
            write_bad_request(&mut writer, e).await.map_err(Into::into)
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = writer.into_inner().shutdown().await {
        debug!(error = %e, "Shutdown after response failed");
    }

    result
}

async fn write_bad_request<W>(writer: &mut ResponseWriter<W>, e: ParseError) -> Result<(), WriterError>
where
    W: AsyncWrite + Unpin,
{
    let body = Error::Parse(e).to_string();

    writer.write_status_line(StatusCode::BadRequest).await?;
    writer.write_headers(&default_headers(body.len())).await?;
    writer.write_body(body.as_bytes()).await?;
    writer.flush().await
}
