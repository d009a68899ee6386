use actix_web::HttpRequest;

use crate::constants::UNKNOWN_CLIENT;

/// Rate-limit key for a request: the first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the shared `unknown` bucket.
pub fn get_client_key(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    };

    if let Some(forwarded) = header("x-forwarded-for").filter(|v| !v.trim().is_empty()) {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        return if first.is_empty() {
            UNKNOWN_CLIENT.to_string()
        } else {
            first.to_string()
        };
    }

    header("x-real-ip")
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn prefers_first_forwarded_hop() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " 198.51.100.4 , 10.0.0.1"))
            .insert_header(("X-Real-IP", "10.0.0.2"))
            .to_http_request();
        assert_eq!(get_client_key(&req), "198.51.100.4");
    }

    #[test]
    fn falls_back_to_real_ip() {
        let req = TestRequest::default()
            .insert_header(("X-Real-IP", "192.0.2.9"))
            .to_http_request();
        assert_eq!(get_client_key(&req), "192.0.2.9");
    }

    #[test]
    fn empty_forwarded_header_is_unknown() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " ,10.0.0.1"))
            .insert_header(("X-Real-IP", "192.0.2.9"))
            .to_http_request();
        assert_eq!(get_client_key(&req), UNKNOWN_CLIENT);
    }

    #[test]
    fn blank_forwarded_header_is_ignored() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", ""))
            .insert_header(("X-Real-IP", "192.0.2.77"))
            .to_http_request();
        assert_eq!(get_client_key(&req), "192.0.2.77");

        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "   "))
            .to_http_request();
        assert_eq!(get_client_key(&req), UNKNOWN_CLIENT);
    }

    #[test]
    fn no_headers_share_the_unknown_bucket() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(get_client_key(&req), UNKNOWN_CLIENT);
    }
}
