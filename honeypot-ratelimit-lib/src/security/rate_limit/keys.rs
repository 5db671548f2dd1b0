use std::net::IpAddr;

/// Anything the rate limiter can derive its two keys from.
///
/// Implement this for the request type of the embedding service to evaluate it directly.
pub trait RateLimitKeys {
    /// Key for the identity dimension.
    fn identity_key(&self) -> String;

    /// Key for the content dimension.
    fn content_key(&self) -> &str;
}

/// The request fields the limiter consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    /// Address of the honeypot listener that received the request
    pub honeypot_ip: IpAddr,
    /// Destination port on the honeypot
    pub port: u16,
    /// Address the request came from
    pub source_ip: IpAddr,
    /// Normalized content fingerprint computed upstream
    pub base_hash: String,
}

impl RateLimitKeys for InboundRequest {
    fn identity_key(&self) -> String {
        identity_key(self.honeypot_ip, self.port, self.source_ip)
    }

    fn content_key(&self) -> &str {
        &self.base_hash
    }
}

/// Build the identity key for a listener/attacker pair.
///
/// Limits are scoped per listener and port rather than per attacker globally: one source
/// probing many simulated services gets a separate budget on each.
pub fn identity_key(honeypot_ip: IpAddr, port: u16, source_ip: IpAddr) -> String {
    format!("{honeypot_ip}-{port}-{source_ip}")
}
