//! # Endpoint addresses and reachability scope.
//!
//! An [`Endpoint`] is the (host, port) pair a supervisor connects or listens
//! on. It is supplied at construction and immutable for the supervisor's
//! life.
//!
//! [`AddressScope`] classifies the host into a reachability domain, which
//! drives how aggressively a supervisor retries:
//! - `Loopback` — numeric 127.0.0.0/8
//! - `Private`  — numeric 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
//! - `Public`   — any other dotted-quad
//! - `Other`    — non-numeric hostnames (DNS resolution cost unknown)
//!
//! The scope is computed once from the host string; no DNS lookup is
//! performed.

use crate::error::ConfigError;

/// A (host, port) network address.
///
/// `host` may be a dotted-quad IP or a hostname. Validated on construction:
/// the host must be non-empty and the port non-zero.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint, validating host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConfigError> {
        let host = host.into();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        Ok(Self { host, port })
    }

    /// The host part (dotted-quad or hostname).
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port part (always in 1..=65535).
    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Classifies this endpoint's host into a reachability scope.
    #[inline]
    pub fn scope(&self) -> AddressScope {
        AddressScope::classify(&self.host)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Reachability domain of an endpoint's host.
///
/// Used to pick a default [`RetryPolicy`](crate::RetryPolicy): nearby
/// endpoints retry quickly, distant ones back off further.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressScope {
    /// 127.0.0.0/8.
    Loopback,
    /// RFC 1918 ranges (10/8, 172.16/12, 192.168/16).
    Private,
    /// Any other numeric dotted-quad.
    Public,
    /// Non-numeric hostname.
    Other,
}

impl AddressScope {
    /// Classifies a host string.
    ///
    /// A host parses as numeric only if it is a well-formed dotted-quad with
    /// all octets in range; anything else (including `"localhost"`) is
    /// [`AddressScope::Other`].
    pub fn classify(host: &str) -> Self {
        let Some([a, b, _, _]) = parse_quad(host) else {
            return AddressScope::Other;
        };
        match (a, b) {
            (127, _) => AddressScope::Loopback,
            (10, _) => AddressScope::Private,
            (172, 16..=31) => AddressScope::Private,
            (192, 168) => AddressScope::Private,
            _ => AddressScope::Public,
        }
    }
}

/// Parses a strict dotted-quad (`a.b.c.d`, each octet 0..=255).
fn parse_quad(host: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = host.split('.');
    for slot in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}
