use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A network range in CIDR notation, IPv4 or IPv6
///
/// Host bits in the textual form are masked off on parse, so
/// `10.1.2.3/16` and `10.1.0.0/16` describe the same range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr {
    network: IpAddr,
    prefix_len: u8,
}

impl Cidr {
    /// Parse a CIDR string like "10.250.0.0/16" or "fd00:10::/64"
    pub fn parse(cidr_str: &str) -> Result<Self> {
        let (addr, prefix) = cidr_str.split_once('/').ok_or_else(|| {
            CoreError::invalid_cidr(cidr_str, "missing '/<prefix length>' suffix")
        })?;

        let address: IpAddr = addr
            .parse()
            .map_err(|_| CoreError::invalid_cidr(cidr_str, format!("invalid address '{}'", addr)))?;

        let prefix_len: u8 = prefix.parse().map_err(|_| {
            CoreError::invalid_cidr(cidr_str, format!("invalid prefix length '{}'", prefix))
        })?;

        let max_len = max_prefix_len(&address);
        if prefix_len > max_len {
            return Err(CoreError::invalid_cidr(
                cidr_str,
                format!("prefix length {} is out of range 0-{}", prefix_len, max_len),
            ));
        }

        let (first, _) = range_bounds(as_u128(address), max_len - prefix_len);

        Ok(Self {
            network: from_u128(first, &address),
            prefix_len,
        })
    }

    /// Network (first) address of the range
    pub fn network(&self) -> IpAddr {
        self.network
    }

    /// Prefix length in bits
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Last address of the range (broadcast address for IPv4)
    pub fn last_address(&self) -> IpAddr {
        let (_, last) = self.bounds();
        from_u128(last, &self.network)
    }

    /// Check whether `ip` lies inside this range
    pub fn contains(&self, ip: IpAddr) -> bool {
        if ip.is_ipv4() != self.network.is_ipv4() {
            return false;
        }
        let (first, last) = self.bounds();
        let value = as_u128(ip);
        first <= value && value <= last
    }

    /// Two ranges overlap iff they share at least one address.
    /// Ranges of different address families never overlap.
    pub fn overlaps(&self, other: &Cidr) -> bool {
        if self.network.is_ipv4() != other.network.is_ipv4() {
            return false;
        }
        let (a_first, a_last) = self.bounds();
        let (b_first, b_last) = other.bounds();
        a_first <= b_last && b_first <= a_last
    }

    fn bounds(&self) -> (u128, u128) {
        let host_bits = max_prefix_len(&self.network) - self.prefix_len;
        range_bounds(as_u128(self.network), host_bits)
    }
}

impl FromStr for Cidr {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cidr {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Cidr> for String {
    fn from(cidr: Cidr) -> Self {
        cidr.to_string()
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

fn max_prefix_len(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn as_u128(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(v4) as u128,
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn from_u128(value: u128, family: &IpAddr) -> IpAddr {
    match family {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::from(value as u32)),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::from(value)),
    }
}

/// First and last address of the range containing `value` with `host_bits` free bits
fn range_bounds(value: u128, host_bits: u8) -> (u128, u128) {
    let host_mask = if host_bits >= 128 {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    };
    let first = value & !host_mask;
    (first, first | host_mask)
}
