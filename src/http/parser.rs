use thiserror::Error;
use tracing::debug;

use crate::http::headers::{find_crlf, Headers};
use crate::http::request::{Request, RequestLine};

const SUPPORTED_VERSION: &str = "HTTP/1.1";

/// Reasons a request is rejected before it reaches a handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("request line not complete: {line:?}")]
    RequestLineIncomplete { line: String },

    #[error("invalid method: {method:?}")]
    InvalidMethod { method: String },

    #[error("unsupported http version: {version:?}")]
    UnsupportedVersion { version: String },

    #[error("malformed header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("space between header name and colon: {line:?}")]
    SpaceBeforeColon { line: String },

    #[error("invalid token in header name: {name:?}")]
    InvalidHeaderName { name: String },

    #[error("trying to parse data in a done state")]
    AlreadyDone,

    #[error("incomplete request")]
    IncompleteRequest,
}

/// Progress of a [`RequestParser`]. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Initialized,
    ParsingHeaders,
    Done,
}

/// Incremental request parser.
///
/// Feed it the unconsumed prefix of a growing buffer; each call reports how
/// many bytes it used so the caller can discard them before reading more.
#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    request_line: Option<RequestLine>,
    headers: Headers,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Initialized,
            request_line: None,
            headers: Headers::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Consumes as much of `data` as the current state allows.
    ///
    /// Returns the total number of bytes used, which may be less than
    /// `data.len()` when a line is only partially buffered.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            return Err(ParseError::AlreadyDone);
        }

        let mut total = 0;
        while !self.is_done() {
            let n = self.parse_single(&data[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }

        Ok(total)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => {
                let Some((line, n)) = parse_request_line(data)? else {
                    return Ok(0);
                };

                debug!(
                    method = %line.method,
                    target = %line.request_target,
                    "Parsed request line"
                );
                self.request_line = Some(line);
                self.state = ParserState::ParsingHeaders;
                Ok(n)
            }

            ParserState::ParsingHeaders => {
                let (n, done) = self.headers.parse(data)?;
                if done {
                    self.state = ParserState::Done;
                }
                Ok(n)
            }

            ParserState::Done => Err(ParseError::AlreadyDone),
        }
    }

    /// Hands over the parsed request once the parser is done.
    pub fn finish(self) -> Result<Request, ParseError> {
        match (self.state, self.request_line) {
            (ParserState::Done, Some(request_line)) => Ok(Request {
                request_line,
                headers: self.headers,
            }),
            _ => Err(ParseError::IncompleteRequest),
        }
    }
}

/// Extracts the request line from the front of `data`.
///
/// `Ok(None)` means the line terminator has not arrived yet.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(idx) = find_crlf(data) else {
        return Ok(None);
    };

    let line = String::from_utf8_lossy(&data[..idx]);
    let request_line = request_line_from_str(&line)?;

    Ok(Some((request_line, idx + 2)))
}

fn request_line_from_str(line: &str) -> Result<RequestLine, ParseError> {
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(ParseError::RequestLineIncomplete { line: line.to_string() });
    };

    if method.is_empty() || !method.bytes().all(|c| c.is_ascii_uppercase()) {
        return Err(ParseError::InvalidMethod { method: method.to_string() });
    }

    if version != SUPPORTED_VERSION {
        return Err(ParseError::UnsupportedVersion { version: version.to_string() });
    }

    Ok(RequestLine {
        method: method.to_string(),
        request_target: target.to_string(),
        http_version: "1.1".to_string(),
    })
}
