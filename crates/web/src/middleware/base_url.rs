use axum::{extract, http::HeaderMap, middleware::Next, response::IntoResponse};
use std::sync::Arc;

/// Where the client reached us, so that links survive reverse proxies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    proto: String,
    host: String,
    prefix: String,
}

impl BaseUrl {
    pub fn new<P, H, X>(proto: P, host: H, prefix: X) -> Self
    where
        P: Into<String>,
        H: Into<String>,
        X: Into<String>,
    {
        Self {
            proto: proto.into(),
            host: host.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let proto = header("x-forwarded-proto").unwrap_or("http");
        let host = header("x-forwarded-host")
            .or_else(|| header("host"))
            .unwrap_or("localhost");
        let prefix = header("x-forwarded-prefix").unwrap_or("");

        Self::new(proto, host, prefix)
    }

    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!(
            "{}://{}{}{}",
            self.proto,
            self.host,
            self.prefix,
            path.into()
        )
    }
}

pub async fn base_url_middleware(mut req: extract::Request, next: Next) -> impl IntoResponse {
    let base_url = BaseUrl::from_headers(req.headers());
    req.extensions_mut().insert(Arc::new(base_url));

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn defaults_without_headers() {
        let base_url = BaseUrl::from_headers(&HeaderMap::new());
        assert_eq!(base_url, BaseUrl::new("http", "localhost", ""));
        assert_eq!(
            base_url.full_url("/api/ping"),
            "http://localhost/api/ping"
        );
    }

    #[test]
    fn forwarded_headers_win_over_host() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("10.0.0.2:8080"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("farm.example"));
        headers.insert("x-forwarded-prefix", HeaderValue::from_static("/demarcation"));

        let base_url = BaseUrl::from_headers(&headers);
        assert_eq!(
            base_url.full_url("/api/v1/session"),
            "https://farm.example/demarcation/api/v1/session"
        );
    }
}
