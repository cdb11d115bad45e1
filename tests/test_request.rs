use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use httpfromtcp::error::Error;
use httpfromtcp::http::parser::ParseError;
use httpfromtcp::http::request::Request;
use tokio::io::{AsyncRead, ReadBuf};

/// Hands out at most `step` bytes per read.
struct ChunkReader {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl ChunkReader {
    fn new(data: impl AsRef<[u8]>, step: usize) -> Self {
        Self {
            data: data.as_ref().to_vec(),
            pos: 0,
            step,
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let end = (this.pos + this.step)
            .min(this.data.len())
            .min(this.pos + buf.remaining());
        buf.put_slice(&this.data[this.pos..end]);
        this.pos = end;
        Poll::Ready(Ok(()))
    }
}

async fn read_request(data: &str, step: usize) -> Result<Request, Error> {
    read_request_bytes(data.as_bytes(), step).await
}

async fn read_request_bytes(data: &[u8], step: usize) -> Result<Request, Error> {
    let mut reader = ChunkReader::new(data, step);
    Request::from_reader(&mut reader).await
}

#[tokio::test]
async fn test_good_get_request_line() {
    let req = read_request("GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n", 3)
        .await
        .unwrap();

    assert_eq!(req.method(), "GET");
    assert_eq!(req.target(), "/");
    assert_eq!(req.request_line.http_version, "1.1");
}

#[tokio::test]
async fn test_good_get_request_line_with_path() {
    let req = read_request("GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n", 1)
        .await
        .unwrap();

    assert_eq!(req.method(), "GET");
    assert_eq!(req.target(), "/coffee");
}

#[tokio::test]
async fn test_request_without_headers() {
    let req = read_request("GET /foo HTTP/1.1\r\n\r\n", 4).await.unwrap();

    assert_eq!(req.method(), "GET");
    assert_eq!(req.target(), "/foo");
    assert_eq!(req.request_line.http_version, "1.1");
    assert!(req.headers.is_empty());
}

#[tokio::test]
async fn test_read_granularity_does_not_matter() {
    let raw = "POST /api/v1/items?page=2 HTTP/1.1\r\nHost: localhost:42069\r\nAccept: */*\r\nX-Tag: a\r\nx-tag: b\r\nContent-Type: application/json\r\n\r\n";

    let expected = read_request(raw, raw.len()).await.unwrap();
    for step in 1..raw.len() {
        let parsed = read_request(raw, step).await.unwrap();
        assert_eq!(parsed, expected, "step {}", step);
    }

    assert_eq!(expected.header("x-tag"), Some("a, b"));
    assert_eq!(expected.headers.len(), 4);
}

#[tokio::test]
async fn test_headers_parsed_from_stream() {
    let req = read_request("GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n", 3)
        .await
        .unwrap();

    assert_eq!(req.header("host"), Some("localhost:42069"));
    assert_eq!(req.header("User-Agent"), Some("curl/7.81.0"));
    assert_eq!(req.header("accept"), Some("*/*"));
}

#[tokio::test]
async fn test_duplicate_headers_from_stream() {
    let req = read_request("GET / HTTP/1.1\r\nSet-Person: lane\r\nSet-Person: prime\r\n\r\n", 5)
        .await
        .unwrap();

    assert_eq!(req.header("set-person"), Some("lane, prime"));
}

#[tokio::test]
async fn test_header_value_spaces_removed() {
    let req = read_request("GET / HTTP/1.1\r\nFoo: a b c\r\n\r\n", 2).await.unwrap();

    assert_eq!(req.header("foo"), Some("abc"));
}

#[tokio::test]
async fn test_missing_end_of_headers_is_incomplete() {
    let result = read_request("GET / HTTP/1.1\r\nHost: localhost:42069\r\n", 3).await;

    assert!(matches!(result, Err(Error::Parse(ParseError::IncompleteRequest))));
}

#[tokio::test]
async fn test_empty_stream_is_incomplete() {
    let result = read_request("", 8).await;

    assert!(matches!(result, Err(Error::Parse(ParseError::IncompleteRequest))));
}

#[tokio::test]
async fn test_invalid_number_of_parts_in_request_line() {
    let result = read_request("/coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n", 3).await;

    assert!(matches!(
        result,
        Err(Error::Parse(ParseError::RequestLineIncomplete { .. }))
    ));
}

#[tokio::test]
async fn test_invalid_method_from_stream() {
    let result = read_request("get /coffee HTTP/1.1\r\n\r\n", 3).await;

    assert!(matches!(result, Err(Error::Parse(ParseError::InvalidMethod { .. }))));
}

#[tokio::test]
async fn test_invalid_version_from_stream() {
    let result = read_request("GET /coffee HTTP/2.0\r\n\r\n", 3).await;

    assert!(matches!(
        result,
        Err(Error::Parse(ParseError::UnsupportedVersion { .. }))
    ));
}

#[tokio::test]
async fn test_malformed_header_from_stream() {
    let result = read_request("GET / HTTP/1.1\r\nHost : localhost:42069\r\n\r\n", 3).await;

    assert!(matches!(
        result,
        Err(Error::Parse(ParseError::SpaceBeforeColon { .. }))
    ));
}

#[tokio::test]
async fn test_bytes_after_headers_are_left_alone() {
    let req = read_request("GET / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello", 64)
        .await
        .unwrap();

    assert_eq!(req.content_length(), 5);
}

#[tokio::test]
async fn test_content_length_missing_or_invalid() {
    let req = read_request("GET / HTTP/1.1\r\nContent-Length: lots\r\n\r\n", 7)
        .await
        .unwrap();
    assert_eq!(req.content_length(), 0);

    let req = read_request("GET / HTTP/1.1\r\n\r\n", 7).await.unwrap();
    assert_eq!(req.content_length(), 0);
}

#[tokio::test]
async fn test_latin1_header_value_accepted() {
    let req = read_request_bytes(b"GET / HTTP/1.1\r\nX-Name: caf\xe9\r\nHost: a\r\n\r\n", 3)
        .await
        .unwrap();

    assert_eq!(req.header("x-name"), Some("caf\u{FFFD}"));
    assert_eq!(req.header("host"), Some("a"));
}

#[tokio::test]
async fn test_non_utf8_target_accepted() {
    let req = read_request_bytes(b"GET /caf\xe9 HTTP/1.1\r\n\r\n", 1).await.unwrap();

    assert_eq!(req.method(), "GET");
    assert_eq!(req.target(), "/caf\u{FFFD}");
}

#[tokio::test]
async fn test_non_ascii_method_rejected() {
    let result = read_request_bytes(b"G\xc9T / HTTP/1.1\r\n\r\n", 4).await;

    assert!(matches!(result, Err(Error::Parse(ParseError::InvalidMethod { .. }))));
}

#[tokio::test]
async fn test_non_ascii_header_name_rejected() {
    let result = read_request_bytes(b"GET / HTTP/1.1\r\nN\xe4me: x\r\n\r\n", 4).await;

    assert!(matches!(
        result,
        Err(Error::Parse(ParseError::InvalidHeaderName { .. }))
    ));
}
