use http::{HeaderMap, HeaderValue, Method, Uri};
use serde::de::DeserializeOwned;

/// An inbound HTTP request, reduced to what the route handlers need:
/// method, URI, and headers. This service never reads request bodies.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl Request {
    pub fn new<S: AsRef<str>>(method: Method, path_and_query: S) -> Self {
        let uri = path_and_query
            .as_ref()
            .parse::<Uri>()
            .expect("invalid request path");
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
        }
    }

    /// Build a request from an already-parsed pingora request header.
    pub(crate) fn from_parts(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    pub fn header<K, V>(mut self, k: K, v: V) -> Self
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: std::fmt::Debug,
        V::Error: std::fmt::Debug,
    {
        if let (Ok(key), Ok(value)) = (k.try_into(), v.try_into()) {
            self.headers.insert(key, value);
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        &self.headers
    }

    /// Deserialize the query string into `T`. A missing query string parses
    /// as empty input.
    pub fn parse_query<T: DeserializeOwned>(&self) -> Result<T, serde_urlencoded::de::Error> {
        serde_urlencoded::from_str(self.uri.query().unwrap_or(""))
    }

    /// The host the client addressed: the `Host` header, or the URI
    /// authority for HTTP/2 requests carrying one.
    pub fn host(&self) -> Option<&str> {
        self.headers
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.uri.authority().map(|a| a.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct LenQuery {
        len: Option<String>,
    }

    #[test]
    fn query_deserializes() {
        let req = Request::new(Method::GET, "/password.txt?len=12");
        let q: LenQuery = req.parse_query().expect("query parses");
        assert_eq!(q.len.as_deref(), Some("12"));
    }

    #[test]
    fn missing_query_parses_as_empty() {
        let req = Request::new(Method::GET, "/password.txt");
        let q: LenQuery = req.parse_query().expect("empty query parses");
        assert!(q.len.is_none());
    }

    #[test]
    fn host_comes_from_header() {
        let req = Request::new(Method::GET, "/").header("host", "example.com:8080");
        assert_eq!(req.host(), Some("example.com:8080"));
    }

    #[test]
    fn host_absent_without_header_or_authority() {
        let req = Request::new(Method::GET, "/");
        assert_eq!(req.host(), None);
    }
}
