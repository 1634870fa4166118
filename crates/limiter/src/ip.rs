// Copyright 2025 Palisade Contributors
// SPDX-License-Identifier: Apache-2.0

//! Caller-IP resolution for rate-limit keys.
//!
//! Trusted proxy headers are consulted in a fixed precedence order before
//! falling back to the transport-level peer address, so the same caller
//! always lands on the same key regardless of which hop recorded them.

use palisade_core::RequestContext;

/// Proxy headers consulted for the caller IP, most trusted first.
pub const IP_HEADER_PRECEDENCE: [&str; 5] = [
    "X-Forwarded-For",
    "Proxy-Client-IP",
    "WL-Proxy-Client-IP",
    "HTTP_CLIENT_IP",
    "HTTP_X_FORWARDED_FOR",
];

/// Resolve the caller's IP for key composition.
///
/// Multi-value headers contribute their first non-empty token that is not
/// the literal `unknown`. When no header and no peer address yields
/// anything, the literal `unknown` keeps key composition deterministic.
pub fn client_ip(ctx: &RequestContext) -> String {
    for header in IP_HEADER_PRECEDENCE {
        if let Some(value) = ctx.header(header) {
            for part in value.split(',') {
                let candidate = part.trim();
                if !candidate.is_empty() && !candidate.eq_ignore_ascii_case("unknown") {
                    return candidate.to_string();
                }
            }
        }
    }
    ctx.peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9))
    }

    #[test]
    fn test_forwarded_for_beats_peer_address() {
        let ctx = RequestContext::builder()
            .header("X-Forwarded-For", "1.2.3.4")
            .peer_addr(peer())
            .build();
        assert_eq!(client_ip(&ctx), "1.2.3.4");
    }

    #[test]
    fn test_precedence_order_among_headers() {
        let ctx = RequestContext::builder()
            .header("Proxy-Client-IP", "5.6.7.8")
            .header("X-Forwarded-For", "1.2.3.4")
            .build();
        assert_eq!(client_ip(&ctx), "1.2.3.4");

        let ctx = RequestContext::builder()
            .header("WL-Proxy-Client-IP", "9.9.9.9")
            .header("Proxy-Client-IP", "5.6.7.8")
            .build();
        assert_eq!(client_ip(&ctx), "5.6.7.8");
    }

    #[test]
    fn test_multi_value_takes_first_usable_token() {
        let ctx = RequestContext::builder()
            .header("X-Forwarded-For", "unknown, , 1.2.3.4, 5.6.7.8")
            .build();
        assert_eq!(client_ip(&ctx), "1.2.3.4");
    }

    #[test]
    fn test_all_unknown_header_falls_through_to_peer() {
        let ctx = RequestContext::builder()
            .header("X-Forwarded-For", "unknown")
            .peer_addr(peer())
            .build();
        assert_eq!(client_ip(&ctx), "10.0.0.9");
    }

    #[test]
    fn test_no_source_yields_literal_unknown() {
        let ctx = RequestContext::default();
        assert_eq!(client_ip(&ctx), "unknown");
    }
}
