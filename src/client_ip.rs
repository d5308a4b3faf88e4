use std::net::SocketAddr;

use axum::http::HeaderMap;

// Shared quota bucket for callers with no resolvable address
pub const UNKNOWN_CLIENT: &str = "unknown";

// Resolve the identity a request is rate-limited under. Behind a proxy or
// load balancer the original caller is the first X-Forwarded-For entry;
// otherwise fall back to the direct peer address.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            // A degenerate header like " ,1.2.3.4" falls through to the
            // peer address rather than using "" as an identity, so all
            // such callers don't share one quota bucket
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "10.0.0.1:55555".parse().unwrap()
    }

    #[test]
    fn forwarded_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "1.2.3.4".parse().unwrap());
        assert_eq!(resolve_client_ip(&headers, Some(peer())), "1.2.3.4");
    }

    #[test]
    fn first_forwarded_entry_wins_and_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            " 1.2.3.4 , 5.6.7.8, 9.9.9.9".parse().unwrap(),
        );
        assert_eq!(resolve_client_ip(&headers, Some(peer())), "1.2.3.4");
    }

    #[test]
    fn falls_back_to_peer_address() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_client_ip(&headers, Some(peer())), "10.0.0.1");
    }

    #[test]
    fn falls_back_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_client_ip(&headers, None), UNKNOWN_CLIENT);
    }

    #[test]
    fn empty_forwarded_header_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "".parse().unwrap());
        assert_eq!(resolve_client_ip(&headers, Some(peer())), "10.0.0.1");
    }

    #[test]
    fn empty_first_forwarded_entry_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", " ,1.2.3.4".parse().unwrap());
        assert_eq!(resolve_client_ip(&headers, Some(peer())), "10.0.0.1");
    }
}
