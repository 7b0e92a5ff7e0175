//! Host list type.
//!
//! Hosts are kept as the strings the user wrote. Resolution happens at probe
//! time, so an unresolvable entry only affects its own results.

use std::fmt;
use std::net::IpAddr;

/// A single target as written on the command line or in a hosts file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host(String);

impl Host {
    /// Wrap a host string, trimming whitespace. Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address if the host is an IPv4 or IPv6 literal.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        let s = self.0.as_str();
        let unbracketed = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);
        unbracketed.parse().ok()
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of hosts. Repeats are kept; each occurrence is its own scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet {
    hosts: Vec<Host>,
}

impl HostSet {
    /// A set holding exactly one host.
    pub fn single(host: Host) -> Self {
        Self { hosts: vec![host] }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Host> {
        self.hosts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter()
    }
}

impl FromIterator<Host> for HostSet {
    fn from_iter<I: IntoIterator<Item = Host>>(iter: I) -> Self {
        Self {
            hosts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_host_trims_and_rejects_blank() {
        assert_eq!(Host::new("  127.0.0.1  ").unwrap().as_str(), "127.0.0.1");
        assert!(Host::new("   ").is_none());
        assert!(Host::new("").is_none());
    }

    #[test]
    fn test_ip_literals() {
        let v4 = Host::new("127.0.0.1").unwrap();
        assert_eq!(v4.ip_literal(), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));

        let v6 = Host::new("::1").unwrap();
        assert_eq!(v6.ip_literal(), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));

        let bracketed = Host::new("[::1]").unwrap();
        assert_eq!(bracketed.ip_literal(), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));

        assert!(Host::new("localhost").unwrap().ip_literal().is_none());
    }

    #[test]
    fn test_host_set_keeps_repeats_in_order() {
        let hosts: HostSet = ["localhost", "127.0.0.1", "localhost"]
            .iter()
            .filter_map(|h| Host::new(h))
            .collect();
        let names: Vec<&str> = hosts.iter().map(Host::as_str).collect();
        assert_eq!(names, vec!["localhost", "127.0.0.1", "localhost"]);
    }
}
