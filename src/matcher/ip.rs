//! IP addresses and CIDR blocks as ordered integer ranges.
//!
//! IPv4 addresses live in the IPv4-mapped IPv6 space so both families share
//! one ordering.

use std::net::{IpAddr, Ipv6Addr};

use crate::ast::{RangeBound, RangeValue, Scalar};

/// Inclusive range of addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRange {
    pub start: u128,
    pub end: u128,
}

impl IpRange {
    pub fn overlaps(&self, other: &IpRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Build from range bounds; `*` leaves that side open.
    pub fn from_bounds<'a, I>(bounds: I) -> Option<IpRange>
    where
        I: IntoIterator<Item = &'a RangeBound>,
    {
        let mut range = IpRange {
            start: 0,
            end: u128::MAX,
        };
        for bound in bounds {
            let RangeValue::Value(scalar) = &bound.value else {
                continue;
            };
            let Scalar::String(text) = scalar else {
                return None;
            };
            let address = address_value(text.parse().ok()?);
            let inclusive = bound.operator.is_inclusive();
            if bound.operator.is_lower() {
                range.start = if inclusive { address } else { address.checked_add(1)? };
            } else {
                range.end = if inclusive { address } else { address.checked_sub(1)? };
            }
        }
        Some(range)
    }
}

fn address_value(address: IpAddr) -> u128 {
    let v6: Ipv6Addr = match address {
        IpAddr::V4(v4) => v4.to_ipv6_mapped(),
        IpAddr::V6(v6) => v6,
    };
    u128::from(v6)
}

/// Parse an address (`10.0.0.1`, `::1`) or a CIDR block (`10.0.0.0/8`).
pub fn parse_ip_range(input: &str) -> Option<IpRange> {
    let input = input.trim();
    let Some((address, prefix)) = input.split_once('/') else {
        let value = address_value(input.parse().ok()?);
        return Some(IpRange {
            start: value,
            end: value,
        });
    };

    let address: IpAddr = address.parse().ok()?;
    let prefix: u32 = prefix.parse().ok()?;
    let prefix = match address {
        IpAddr::V4(_) if prefix <= 32 => prefix + 96,
        IpAddr::V6(_) if prefix <= 128 => prefix,
        _ => return None,
    };

    let host_bits = 128 - prefix;
    let mask = if host_bits == 128 { 0 } else { u128::MAX << host_bits };
    let start = address_value(address) & mask;
    Some(IpRange {
        start,
        end: start | !mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RangeOperator;

    #[test]
    fn test_cidr() {
        let block = parse_ip_range("192.168.0.0/16").unwrap();
        assert!(block.overlaps(&parse_ip_range("192.168.10.1").unwrap()));
        assert!(!block.overlaps(&parse_ip_range("192.169.0.1").unwrap()));

        let all = parse_ip_range("0.0.0.0/0").unwrap();
        assert!(all.overlaps(&parse_ip_range("8.8.8.8").unwrap()));
        assert!(!all.overlaps(&parse_ip_range("2001:db8::1").unwrap()));

        assert!(parse_ip_range("10.0.0.0/33").is_none());
        assert!(parse_ip_range("not-an-ip").is_none());
    }

    #[test]
    fn test_ipv6() {
        let block = parse_ip_range("2001:db8::/32").unwrap();
        assert!(block.overlaps(&parse_ip_range("2001:db8:ffff::1").unwrap()));
        assert!(!block.overlaps(&parse_ip_range("2001:db9::1").unwrap()));
    }

    #[test]
    fn test_bounds() {
        let left = RangeBound::new(
            RangeOperator::Gt,
            RangeValue::Value(Scalar::String("10.0.0.1".into())),
        );
        let right = RangeBound::new(
            RangeOperator::Lte,
            RangeValue::Value(Scalar::String("10.0.0.5".into())),
        );
        let range = IpRange::from_bounds([&left, &right]).unwrap();
        assert!(!range.overlaps(&parse_ip_range("10.0.0.1").unwrap()));
        assert!(range.overlaps(&parse_ip_range("10.0.0.2").unwrap()));
        assert!(range.overlaps(&parse_ip_range("10.0.0.5").unwrap()));
        assert!(!range.overlaps(&parse_ip_range("10.0.0.6").unwrap()));
    }
}
