use std::{collections::HashMap, hash::BuildHasher};

use http::{HeaderMap, Request, header};
use tower_cookies::{Cookie, Cookies, cookie::CookieJar};

/// Something a raw session cookie value can be looked up in.
///
/// Values are returned percent-decoded, exactly as they were handed to the cookie serializer.
pub trait CookieSource {
    fn cookie_value(&self, name: &str) -> Option<String>;
}

impl CookieSource for Cookies {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get(name).map(|cookie| cookie.value().to_owned())
    }
}

impl CookieSource for CookieJar {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get(name).map(|cookie| cookie.value().to_owned())
    }
}

impl CookieSource for HeaderMap {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse_encoded)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_owned())
    }
}

impl<B> CookieSource for Request<B> {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.headers().cookie_value(name)
    }
}

impl<S: BuildHasher> CookieSource for HashMap<String, String, S> {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn header_map_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; session=test"));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(headers.cookie_value("session").as_deref(), Some("test"));
        assert_eq!(headers.cookie_value("other").as_deref(), Some("1"));
        assert_eq!(headers.cookie_value("missing"), None);
    }

    #[test]
    fn header_map_percent_decodes() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("session=s%3Aabc%3D.ff"));

        assert_eq!(headers.cookie_value("session").as_deref(), Some("s:abc=.ff"));
    }

    #[test]
    fn request_delegates_to_headers() {
        let req = Request::builder()
            .header(header::COOKIE, "session=test;")
            .body(())
            .expect("request builds successfully");

        assert_eq!(req.cookie_value("session").as_deref(), Some("test"));
    }

    #[test]
    fn map_and_jar_sources() {
        let map = HashMap::from([("session".to_owned(), "test".to_owned())]);
        assert_eq!(map.cookie_value("session").as_deref(), Some("test"));

        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new("session", "test"));
        assert_eq!(jar.cookie_value("session").as_deref(), Some("test"));
        assert_eq!(jar.cookie_value("other"), None);
    }
}
