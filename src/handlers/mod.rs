//! Bundled request handlers used by the `httpfromtcp` binary.

pub mod proxy;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::AsyncWrite;
use url::Url;

use crate::config::Config;
use crate::http::request::Request;
use crate::http::response::{default_headers, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::Handler;

pub const BAD_REQUEST_PAGE: &str = "<html>
<head>
<title>400 Bad Request</title>
</head>
<body>
<h1>Bad Request</h1>
<p>Your request honestly kinda sucked.</p>
</body>
</html>
";

pub const INTERNAL_ERROR_PAGE: &str = "<html>
<head>
<title>500 Internal Server Error</title>
</head>
<body>
<h1>Internal Server Error</h1>
<p>Okay, you know what? This one is on me.</p>
</body>
</html>
";

pub const OK_PAGE: &str = "<html>
<head>
<title>200 OK</title>
</head>
<body>
<h1>Success!</h1>
<p>Your request was an absolute banger.</p>
</body>
</html>
";

const VIDEO_FILE: &str = "vim.mp4";

/// Dispatches on the request target.
///
/// - `/yourproblem` → 400 page
/// - `/myproblem` → 500 page
/// - `/httpbin/...` → chunked proxy to the configured upstream
/// - `/video` → `vim.mp4` from the assets directory
/// - anything else → 200 page
#[derive(Debug, Clone)]
pub struct Router {
    upstream: Url,
    assets_dir: PathBuf,
}

impl Router {
    pub fn new(cfg: &Config) -> Result<Self> {
        let upstream = Url::parse(&cfg.upstream)
            .with_context(|| format!("invalid upstream URL {:?}", cfg.upstream))?;

        Ok(Self {
            upstream,
            assets_dir: PathBuf::from(&cfg.assets_dir),
        })
    }

    /// Upstream URL for the part of the target after `/httpbin`.
    pub fn upstream_url(&self, rest: &str) -> Result<Url> {
        self.upstream
            .join(rest.trim_start_matches('/'))
            .with_context(|| format!("invalid upstream path {:?}", rest))
    }

    async fn proxy<W>(&self, writer: &mut ResponseWriter<W>, rest: &str) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let url = self.upstream_url(rest)?;
        tracing::info!(upstream = %url, "Proxying request");

        match proxy::open(&url).await {
            Ok(upstream) => proxy::relay(writer, upstream).await,
            Err(e) => {
                tracing::warn!(upstream = %url, error = %e, "Upstream unavailable");
                respond_html(writer, StatusCode::InternalServerError, INTERNAL_ERROR_PAGE).await
            }
        }
    }

    async fn video<W>(&self, writer: &mut ResponseWriter<W>) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let path = self.assets_dir.join(VIDEO_FILE);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read video");
                return respond_html(writer, StatusCode::InternalServerError, INTERNAL_ERROR_PAGE)
                    .await;
            }
        };

        let mut headers = default_headers(data.len());
        headers.replace("Content-Type", "video/mp4");

        writer.write_status_line(StatusCode::Ok).await?;
        writer.write_headers(&headers).await?;
        writer.write_body(&data).await?;
        Ok(())
    }
}

impl Handler for Router {
    async fn handle<W>(&self, writer: &mut ResponseWriter<W>, request: &Request) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = request.target();

        if let Some(rest) = target.strip_prefix("/httpbin") {
            return self.proxy(writer, rest).await;
        }

        match target {
            "/yourproblem" => respond_html(writer, StatusCode::BadRequest, BAD_REQUEST_PAGE).await,
            "/myproblem" => {
                respond_html(writer, StatusCode::InternalServerError, INTERNAL_ERROR_PAGE).await
            }
            "/video" => self.video(writer).await,
            _ => respond_html(writer, StatusCode::Ok, OK_PAGE).await,
        }
    }
}

/// Writes a complete `text/html` response.
pub async fn respond_html<W>(writer: &mut ResponseWriter<W>, status: StatusCode, page: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut headers = default_headers(page.len());
    headers.replace("Content-Type", "text/html");

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    Ok(())
}
