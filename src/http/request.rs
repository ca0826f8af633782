//! Request inspection for the guard middleware.
//!
//! # Responsibilities
//! - Derive the client address (forwarded headers, then socket peer)
//! - Collect headers, client address and session identity into a
//!   [`RequestContext`]
//!
//! # Design Decisions
//! - Forwarded headers are honoured only when configured; otherwise any
//!   client could pick its own address
//! - IPv4-mapped IPv6 peers are normalized so dual-stack listeners still
//!   match IPv4 lists

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use std::net::{IpAddr, SocketAddr};

use crate::profile::{RequestContext, SessionId};

/// Header carrying CSRF tokens in both directions.
pub const CSRF_TOKEN_HEADER: &str = "x-csrf-token";

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Client address of a request.
///
/// With `trust_forwarded` set, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`; unparsable values fall through to the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> Option<IpAddr> {
    let forwarded = trust_forwarded
        .then(|| {
            header_ip(headers, X_FORWARDED_FOR, |v| v.split(',').next())
                .or_else(|| header_ip(headers, X_REAL_IP, Some))
        })
        .flatten();

    forwarded.or(peer.map(|p| p.ip())).map(normalize)
}

fn header_ip<'a>(
    headers: &'a HeaderMap,
    name: &str,
    pick: impl FnOnce(&'a str) -> Option<&'a str>,
) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    pick(value)?.trim().parse().ok()
}

fn normalize(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

/// Build the context profiles see for `req`.
pub fn request_context(req: &Request<Body>, trust_forwarded: bool) -> RequestContext {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let session = req.extensions().get::<SessionId>().map(|s| s.0.clone());

    RequestContext::new(req.headers().clone())
        .with_client_ip(client_ip(req.headers(), peer, trust_forwarded))
        .with_session_id(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, v.parse().unwrap());
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("10.9.9.9:4000".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let h = headers(&[(X_FORWARDED_FOR, " 192.168.0.1 , 10.0.0.1"), (X_REAL_IP, "172.16.0.1")]);
        assert_eq!(client_ip(&h, peer(), true), Some(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1))));
    }

    #[test]
    fn test_real_ip_fallback() {
        let h = headers(&[(X_FORWARDED_FOR, "unknown"), (X_REAL_IP, "172.16.0.1")]);
        assert_eq!(client_ip(&h, peer(), true), Some(IpAddr::V4(Ipv4Addr::new(172, 16, 0, 1))));
    }

    #[test]
    fn test_untrusted_headers_ignored() {
        let h = headers(&[(X_FORWARDED_FOR, "192.168.0.1")]);
        assert_eq!(client_ip(&h, peer(), false), Some(IpAddr::V4(Ipv4Addr::new(10, 9, 9, 9))));
        assert_eq!(client_ip(&h, None, false), None);
    }

    #[test]
    fn test_ipv4_mapped_peer_normalized() {
        let mapped: SocketAddr = "[::ffff:192.168.0.2]:80".parse().unwrap();
        assert_eq!(
            client_ip(&HeaderMap::new(), Some(mapped), false),
            Some(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 2)))
        );
    }

    #[test]
    fn test_request_context() {
        let mut req = Request::builder()
            .header(CSRF_TOKEN_HEADER, "tok")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(peer().unwrap()));
        req.extensions_mut().insert(SessionId("s-1".into()));

        let ctx = request_context(&req, false);
        assert_eq!(ctx.client_ip(), Some(IpAddr::V4(Ipv4Addr::new(10, 9, 9, 9))));
        assert_eq!(ctx.session_id(), Some("s-1"));
        assert_eq!(ctx.csrf_token(), Some("tok"));
    }
}
