//! HTTP-Protokoll für den Remote-Farbspeicher
//!
//! Baut die Requests und zerlegt die Responses des Farbindex-Dienstes:
//! - `GET /get_color_index/` → `{"color_index": <int>}`
//! - `POST /set_color_index/?color_index=<int>`
//!
//! Die Requests nutzen HTTP/1.0 mit `Connection: close`, damit der Server
//! kein Chunked Encoding schickt und die Antwort mit dem Verbindungsende
//! komplett ist.

use core::fmt::Write;

use serde::Deserialize;

use crate::traits::RemoteError;

/// Pfad zum Lesen des Farbindex
pub const GET_COLOR_INDEX_PATH: &str = "/get_color_index/";

/// Pfad zum Setzen des Farbindex (Index kommt als Query-Parameter)
pub const SET_COLOR_INDEX_PATH: &str = "/set_color_index/";

/// Maximale Größe eines Requests in Bytes
pub const REQUEST_BUFFER_SIZE: usize = 256;

/// Fertig formatierter HTTP-Request
pub type HttpRequest = heapless::String<REQUEST_BUFFER_SIZE>;

/// Zerlegte HTTP-Response (Body zeigt in den Empfangspuffer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse<'a> {
    pub status: u16,
    pub body: &'a [u8],
}

impl HttpResponse<'_> {
    /// 2xx-Status → Ok, sonst `RemoteError::HttpStatus`
    pub fn ensure_success(&self) -> Result<(), RemoteError> {
        if (200..300).contains(&self.status) {
            Ok(())
        } else {
            Err(RemoteError::HttpStatus(self.status))
        }
    }
}

#[derive(Deserialize)]
struct ColorIndexBody {
    color_index: i32,
}

// Manche Server liefern den Index als String ("2")
#[derive(Deserialize)]
struct ColorIndexTextBody<'a> {
    color_index: &'a str,
}

/// Baut `GET /get_color_index/`
pub fn get_color_index_request(host: &str) -> Result<HttpRequest, RemoteError> {
    let mut request = HttpRequest::new();
    write!(
        request,
        "GET {GET_COLOR_INDEX_PATH} HTTP/1.0\r\n\
         Host: {host}\r\n\
         Accept: application/json\r\n\
         Connection: close\r\n\
         \r\n"
    )
    .map_err(|_| RemoteError::RequestTooLarge)?;
    Ok(request)
}

/// Baut `POST /set_color_index/?color_index=<index>` (leerer Body)
pub fn set_color_index_request(host: &str, index: usize) -> Result<HttpRequest, RemoteError> {
    let mut request = HttpRequest::new();
    write!(
        request,
        "POST {SET_COLOR_INDEX_PATH}?color_index={index} HTTP/1.0\r\n\
         Host: {host}\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\
         \r\n"
    )
    .map_err(|_| RemoteError::RequestTooLarge)?;
    Ok(request)
}

/// Zerlegt eine rohe HTTP-Response in Status-Code und Body
///
/// Header werden nicht ausgewertet; der Body ist alles nach der ersten
/// Leerzeile.
pub fn parse_response(raw: &[u8]) -> Result<HttpResponse<'_>, RemoteError> {
    let header_end = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or(RemoteError::MalformedResponse)?;

    let head = core::str::from_utf8(&raw[..header_end])
        .map_err(|_| RemoteError::MalformedResponse)?;
    let status_line = head.lines().next().ok_or(RemoteError::MalformedResponse)?;

    let mut parts = status_line.split_ascii_whitespace();
    let version = parts.next().ok_or(RemoteError::MalformedResponse)?;
    if !version.starts_with("HTTP/1.") {
        return Err(RemoteError::MalformedResponse);
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or(RemoteError::MalformedResponse)?;

    Ok(HttpResponse {
        status,
        body: &raw[header_end + 4..],
    })
}

/// Liest `color_index` aus dem JSON-Body (Zahl oder Zahl als String)
pub fn parse_color_index(body: &[u8]) -> Result<i32, RemoteError> {
    if let Ok((parsed, _)) = serde_json_core::from_slice::<ColorIndexBody>(body) {
        return Ok(parsed.color_index);
    }

    let (parsed, _) = serde_json_core::from_slice::<ColorIndexTextBody>(body)
        .map_err(|_| RemoteError::MalformedResponse)?;
    parsed
        .color_index
        .trim()
        .parse::<i32>()
        .map_err(|_| RemoteError::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request_line() {
        let request = get_color_index_request("lamp.example").unwrap();
        assert!(request.starts_with("GET /get_color_index/ HTTP/1.0\r\n"));
        assert!(request.contains("Host: lamp.example\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_set_request_carries_index_in_query() {
        let request = set_color_index_request("lamp.example", 2).unwrap();
        assert!(request.starts_with("POST /set_color_index/?color_index=2 HTTP/1.0\r\n"));
        assert!(request.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn test_oversized_host_rejected() {
        let host = core::str::from_utf8(&[b'x'; REQUEST_BUFFER_SIZE]).unwrap();
        assert_eq!(
            get_color_index_request(host).unwrap_err(),
            RemoteError::RequestTooLarge
        );
    }

    #[test]
    fn test_parse_response_splits_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"color_index\": 1}";
        let response = parse_response(raw).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"{\"color_index\": 1}");
    }

    #[test]
    fn test_parse_color_index_number_and_string() {
        assert_eq!(parse_color_index(b"{\"color_index\": 2}"), Ok(2));
        assert_eq!(parse_color_index(b"{\"color_index\": \"2\"}"), Ok(2));
        assert_eq!(parse_color_index(b"{\"color_index\": -1}"), Ok(-1));
    }
}
