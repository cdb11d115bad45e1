use std::collections::HashMap;

use crate::http::parser::ParseError;

const CRLF: &[u8] = b"\r\n";

/// Symbols allowed in a header name besides ASCII letters and digits.
const TOKEN_SYMBOLS: &[u8] = b"!#$%&'*+-.^_`|~";

/// HTTP header map.
///
/// Names are stored lowercase, so every lookup is case-insensitive. Setting a
/// name that is already present folds the new value onto the old one with
/// `", "` instead of overwriting it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Adds a header, folding onto an existing value of the same name.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpfromtcp::http::headers::Headers;
    /// let mut headers = Headers::new();
    /// headers.set("Accept", "text/html");
    /// headers.set("accept", "text/plain");
    /// assert_eq!(headers.get("ACCEPT"), Some("text/html, text/plain"));
    /// ```
    pub fn set(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) {
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.as_ref();

        match self.entries.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                self.entries.insert(name, value.to_string());
            }
        }
    }

    /// Sets a header value unconditionally, discarding any previous value.
    pub fn replace(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Deletes a header, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses a single header line from the front of `data`.
    ///
    /// Returns the number of bytes consumed and whether the blank line that
    /// terminates the header block was reached. `Ok((0, false))` means no
    /// complete line is buffered yet and the caller must supply more bytes.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(idx) = find_crlf(data) else {
            return Ok((0, false));
        };

        if idx == 0 {
            return Ok((CRLF.len(), true));
        }

        // Values may carry obs-text; names are held to the token set below.
        let line = String::from_utf8_lossy(&data[..idx]);
        let (name, value) = parse_header_line(&line)?;
        self.set(name, value);

        Ok((idx + CRLF.len(), false))
    }
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}

fn parse_header_line(line: &str) -> Result<(&str, String), ParseError> {
    let (raw_name, raw_value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::MalformedHeader { line: line.to_string() })?;

    if raw_name.ends_with(' ') {
        return Err(ParseError::SpaceBeforeColon { line: line.to_string() });
    }

    let name = raw_name.trim();
    if name.is_empty() || !name.bytes().all(is_token_char) {
        return Err(ParseError::InvalidHeaderName { name: name.to_string() });
    }

    // Every space goes, not only the surrounding ones.
    let value = raw_value.replace(' ', "");

    Ok((name, value))
}

fn is_token_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || TOKEN_SYMBOLS.contains(&c)
}
