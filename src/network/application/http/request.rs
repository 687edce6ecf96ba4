use crate::network::error::Error;
use core::fmt::Write;
use heapless::String;

/// Maximum length of the server address (IP or host name).
pub const MAX_HOST_LEN: usize = 64;
/// Maximum length of the request path.
pub const MAX_PATH_LEN: usize = 128;
/// Maximum length of the query string (without the leading `?`).
pub const MAX_QUERY_LEN: usize = 64;
/// Maximum length of the request body.
pub const MAX_BODY_LEN: usize = 256;

const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    /// The request-line token for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

/// Characters that would end the request line early.
const TARGET_BREAKERS: [char; 4] = [' ', '\t', '\r', '\n'];

/// One HTTP call waiting in, or being served from, the request queue.
///
/// All fields are owned copies so the request can outlive the caller's buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub host: String<MAX_HOST_LEN>,
    pub port: u16,
    pub method: Method,
    pub path: String<MAX_PATH_LEN>,
    pub query: Option<String<MAX_QUERY_LEN>>,
    pub body: Option<String<MAX_BODY_LEN>>,
}

impl Request {
    /// Creates a request without body or query string.
    ///
    /// An empty path is sent as `/`.
    pub fn new(host: &str, port: u16, method: Method, path: &str) -> Result<Self, Error> {
        if host.is_empty() || port == 0 || host.contains(['"', '\r', '\n', ' ']) {
            return Err(Error::InvalidAddress);
        }
        if path.contains(TARGET_BREAKERS) {
            return Err(Error::InvalidAddress);
        }
        Ok(Self {
            host: String::try_from(host).map_err(|_| Error::CapacityExceeded)?,
            port,
            method,
            path: String::try_from(path).map_err(|_| Error::CapacityExceeded)?,
            query: None,
            body: None,
        })
    }

    /// Attaches a body; a `Content-Length` header is sent with it.
    pub fn with_body(mut self, body: &str) -> Result<Self, Error> {
        self.body = Some(String::try_from(body).map_err(|_| Error::CapacityExceeded)?);
        Ok(self)
    }

    /// Attaches a query string, appended to the path after `?`.
    ///
    /// Fails with [`Error::InvalidAddress`] on whitespace or line breaks; the caller
    /// percent-encodes those.
    pub fn with_query(mut self, query: &str) -> Result<Self, Error> {
        if query.contains(TARGET_BREAKERS) {
            return Err(Error::InvalidAddress);
        }
        self.query = Some(String::try_from(query).map_err(|_| Error::CapacityExceeded)?);
        Ok(self)
    }

    /// Writes the complete HTTP/1.1 payload.
    ///
    /// The same routine feeds [`encoded_len`](Self::encoded_len), so the length
    /// announced to the modem always matches the bytes that follow.
    pub fn write_payload<W: Write>(&self, w: &mut W, user_agent: &str) -> core::fmt::Result {
        // --- Request line ---
        w.write_str(self.method.as_str())?;
        w.write_char(' ')?;
        if self.path.is_empty() {
            w.write_char('/')?;
        } else {
            w.write_str(&self.path)?;
        }
        if let Some(query) = &self.query {
            write!(w, "?{}", query)?;
        }
        w.write_str(" HTTP/1.1\r\n")?;

        // --- Headers ---
        if self.port == DEFAULT_PORT {
            write!(w, "Host: {}\r\n", self.host)?;
        } else {
            write!(w, "Host: {}:{}\r\n", self.host, self.port)?;
        }
        w.write_str("Connection: close\r\n")?;
        if !user_agent.is_empty() {
            write!(w, "User-Agent: {}\r\n", user_agent)?;
        }

        // --- Body ---
        match &self.body {
            Some(body) => write!(w, "Content-Length: {}\r\n\r\n{}", body.len(), body),
            None => w.write_str("\r\n"),
        }
    }

    /// Exact number of bytes [`write_payload`](Self::write_payload) produces.
    pub fn encoded_len(&self, user_agent: &str) -> usize {
        let mut counter = ByteCounter(0);
        // ByteCounter never fails
        let _ = self.write_payload(&mut counter, user_agent);
        counter.0
    }
}

struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(request: &Request, user_agent: &str) -> String<1024> {
        let mut out = String::new();
        request.write_payload(&mut out, user_agent).unwrap();
        out
    }

    #[test]
    fn test_get_payload() {
        let request = Request::new("10.0.0.2", 80, Method::Get, "/status").unwrap();
        assert_eq!(
            render(&request, "libat").as_str(),
            "GET /status HTTP/1.1\r\nHost: 10.0.0.2\r\nConnection: close\r\nUser-Agent: libat\r\n\r\n"
        );
    }

    #[test]
    fn test_post_payload_with_query_and_port() {
        let request = Request::new("example.com", 8080, Method::Post, "/api")
            .unwrap()
            .with_query("id=7")
            .unwrap()
            .with_body("hello")
            .unwrap();
        assert_eq!(
            render(&request, "").as_str(),
            "POST /api?id=7 HTTP/1.1\r\nHost: example.com:8080\r\nConnection: close\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn test_encoded_len_matches_payload() {
        for body_len in [0usize, 9, 10, 99, 100, 255] {
            let body: String<MAX_BODY_LEN> = (0..body_len).map(|_| 'x').collect();
            let request = Request::new("192.168.4.1", 80, Method::Post, "/upload")
                .unwrap()
                .with_body(&body)
                .unwrap();
            assert_eq!(
                request.encoded_len("agent"),
                render(&request, "agent").len(),
                "body length {}",
                body_len
            );
        }
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let request = Request::new("host", 80, Method::Head, "").unwrap();
        assert!(render(&request, "").starts_with("HEAD / HTTP/1.1\r\n"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            Request::new("", 80, Method::Get, "/").unwrap_err(),
            Error::InvalidAddress
        );
        assert_eq!(
            Request::new("host", 0, Method::Get, "/").unwrap_err(),
            Error::InvalidAddress
        );
        assert_eq!(
            Request::new("a\"b", 80, Method::Get, "/").unwrap_err(),
            Error::InvalidAddress
        );

        let long_path: String<256> = (0..MAX_PATH_LEN + 1).map(|_| 'p').collect();
        assert_eq!(
            Request::new("host", 80, Method::Get, &long_path).unwrap_err(),
            Error::CapacityExceeded
        );
    }

    #[test]
    fn test_rejects_line_breaks_in_target() {
        assert_eq!(
            Request::new("host", 80, Method::Get, "/a HTTP/1.1\r\nX-Injected: 1\r\n").unwrap_err(),
            Error::InvalidAddress
        );
        assert_eq!(
            Request::new("host", 80, Method::Get, "/a b").unwrap_err(),
            Error::InvalidAddress
        );

        let request = Request::new("host", 80, Method::Get, "/search").unwrap();
        assert_eq!(
            request.clone().with_query("q=1\r\nHost: evil").unwrap_err(),
            Error::InvalidAddress
        );
        assert_eq!(request.clone().with_query("q=a b").unwrap_err(), Error::InvalidAddress);

        let mut payload: String<256> = String::new();
        request
            .with_query("q=a%20b")
            .unwrap()
            .write_payload(&mut payload, "")
            .unwrap();
        assert!(payload.starts_with("GET /search?q=a%20b HTTP/1.1\r\n"));
    }

    #[test]
    fn test_oversize_path() {
        let long_path: String<256> = (0..MAX_PATH_LEN + 1).map(|_| 'p').collect();
        assert_eq!(
            Request::new("host", 80, Method::Get, &long_path).unwrap_err(),
            Error::CapacityExceeded
        );
    }
}
