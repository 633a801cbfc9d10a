//! IP address ranges: textual CIDR and the RFC 5280 binary form
//!
//! In a name constraint, an `iPAddress` entry is the address followed by a network mask of the
//! same length (RFC 5280 4.2.1.10):
//!
//! <pre>
//! IPv4:  4 bytes address || 4 bytes mask   (8 bytes)
//! IPv6: 16 bytes address || 16 bytes mask  (32 bytes)
//! </pre>
//!
//! The mask must be a contiguous run of 1-bits followed by 0-bits. The human-facing form of
//! such an entry is the CIDR notation, for ex. `10.0.0.0/8` or `2001:db8::/48`.
//!
//! # Examples
//!
//! ```rust
//! use x509_name_constraints::cidr::{parse_cidr, IpFamily};
//!
//! let cidr = parse_cidr("203.0.113.7/24").expect("valid CIDR");
//! assert_eq!(cidr.family(), IpFamily::V4);
//! assert_eq!(cidr.as_bytes(), &[203, 0, 113, 0, 255, 255, 255, 0]);
//! assert_eq!(cidr.to_string(), "203.0.113.0/24");
//! ```

use crate::error::{NameConstraintsError, Result};

use nom::bytes::complete::take_till1;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, verify};
use nom::sequence::{separated_pair, tuple};
use nom::IResult;
use std::convert::TryFrom;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family of an IP constraint or candidate address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Length in bytes of an address of this family
    pub const fn address_len(self) -> usize {
        match self {
            IpFamily::V4 => 4,
            IpFamily::V6 => 16,
        }
    }

    /// Maximum prefix length for this family
    pub const fn max_prefix(self) -> u8 {
        match self {
            IpFamily::V4 => 32,
            IpFamily::V6 => 128,
        }
    }

    /// Family of a raw address, from its length
    pub const fn from_address_len(len: usize) -> Option<IpFamily> {
        match len {
            4 => Some(IpFamily::V4),
            16 => Some(IpFamily::V6),
            _ => None,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => f.write_str("IPv4"),
            IpFamily::V6 => f.write_str("IPv6"),
        }
    }
}

/// An IP address range, stored in RFC 5280 binary form
///
/// A `Cidr` always holds a valid prefix mask, and its address is always masked (`A & M == A`),
/// so two ranges of the same family are equal iff their bytes are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cidr {
    V4([u8; 8]),
    V6([u8; 32]),
}

impl Cidr {
    /// Build a range from its RFC 5280 binary form (address followed by mask)
    ///
    /// Fails with `IllegalParameter` if the length is neither 8 nor 32, and with `MalformedCidr`
    /// if the mask is not a contiguous prefix. Address bits outside the mask are cleared.
    pub fn from_rfc5280(bytes: &[u8]) -> Result<Cidr> {
        let mut cidr = match bytes.len() {
            8 => {
                let mut b = [0u8; 8];
                b.copy_from_slice(bytes);
                Cidr::V4(b)
            }
            32 => {
                let mut b = [0u8; 32];
                b.copy_from_slice(bytes);
                Cidr::V6(b)
            }
            _ => return Err(NameConstraintsError::IllegalParameter),
        };
        prefix_from_mask(cidr.mask())?;
        cidr.normalize();
        Ok(cidr)
    }

    /// Build a range from an address and a prefix length
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Cidr> {
        match addr {
            IpAddr::V4(a) => Cidr::from_parts(&a.octets(), u32::from(prefix)),
            IpAddr::V6(a) => Cidr::from_parts(&a.octets(), u32::from(prefix)),
        }
    }

    /// The range covering every address of `family` (all-zeros address and mask)
    pub const fn universal(family: IpFamily) -> Cidr {
        match family {
            IpFamily::V4 => Cidr::V4([0; 8]),
            IpFamily::V6 => Cidr::V6([0; 32]),
        }
    }

    fn from_parts(address: &[u8], prefix: u32) -> Result<Cidr> {
        let width = address.len();
        let mask = mask_from_prefix(prefix, width)?;
        let mut bytes = Vec::with_capacity(2 * width);
        bytes.extend_from_slice(address);
        bytes.extend_from_slice(&mask);
        Cidr::from_rfc5280(&bytes)
    }

    pub fn family(&self) -> IpFamily {
        match self {
            Cidr::V4(_) => IpFamily::V4,
            Cidr::V6(_) => IpFamily::V6,
        }
    }

    /// RFC 5280 binary form
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Cidr::V4(b) => b,
            Cidr::V6(b) => b,
        }
    }

    pub fn address(&self) -> &[u8] {
        let b = self.as_bytes();
        &b[..b.len() / 2]
    }

    pub fn mask(&self) -> &[u8] {
        let b = self.as_bytes();
        &b[b.len() / 2..]
    }

    /// Prefix length (number of leading 1-bits of the mask)
    pub fn prefix(&self) -> u8 {
        // mask is contiguous
        self.mask().iter().map(|b| b.count_ones() as u8).sum()
    }

    /// Test if the raw address `ip` (4 or 16 bytes) belongs to this range.
    ///
    /// An address of the other family never matches.
    pub fn contains(&self, ip: &[u8]) -> bool {
        ip_in_cidr(ip, self.as_bytes())
    }

    /// Test if `ip` belongs to this range
    pub fn contains_addr(&self, ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(a) => self.contains(&a.octets()),
            IpAddr::V6(a) => self.contains(&a.octets()),
        }
    }

    /// Intersection of two ranges
    ///
    /// Two prefix ranges are either disjoint or nested, so the intersection is either empty or
    /// the more specific (longer prefix) of the two.
    pub fn intersect(&self, other: &Cidr) -> Option<Cidr> {
        if self.family() != other.family() {
            return None;
        }
        let width = self.family().address_len();
        let (a, b) = (self.as_bytes(), other.as_bytes());
        let overlap = (0..width).all(|i| (a[i] ^ b[i]) & a[i + width] & b[i + width] == 0);
        if !overlap {
            return None;
        }
        if self.prefix() >= other.prefix() {
            Some(*self)
        } else {
            Some(*other)
        }
    }

    fn normalize(&mut self) {
        let bytes: &mut [u8] = match self {
            Cidr::V4(b) => b,
            Cidr::V6(b) => b,
        };
        let width = bytes.len() / 2;
        let (addr, mask) = bytes.split_at_mut(width);
        mask_in_place(addr, mask);
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cidr::V4(b) => {
                let addr = Ipv4Addr::new(b[0], b[1], b[2], b[3]);
                write!(f, "{}/{}", addr, self.prefix())
            }
            Cidr::V6(b) => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&b[..16]);
                write!(f, "{}/{}", Ipv6Addr::from(octets), self.prefix())
            }
        }
    }
}

impl fmt::Debug for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cidr({})", self)
    }
}

impl FromStr for Cidr {
    type Err = NameConstraintsError;

    fn from_str(s: &str) -> Result<Cidr> {
        parse_cidr(s)
    }
}

impl TryFrom<&[u8]> for Cidr {
    type Error = NameConstraintsError;

    fn try_from(bytes: &[u8]) -> Result<Cidr> {
        Cidr::from_rfc5280(bytes)
    }
}

fn octet(i: &str) -> IResult<&str, u8> {
    // no leading zeroes, like inet_pton
    map_res(
        verify(digit1, |s: &str| s.len() == 1 || !s.starts_with('0')),
        |s: &str| s.parse::<u8>(),
    )(i)
}

fn dotted_quad(i: &str) -> IResult<&str, [u8; 4]> {
    let (i, (a, _, b, _, c, _, d)) = tuple((
        octet,
        char('.'),
        octet,
        char('.'),
        octet,
        char('.'),
        octet,
    ))(i)?;
    Ok((i, [a, b, c, d]))
}

fn prefix_length(i: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(i)
}

fn cidr_parts(i: &str) -> IResult<&str, (&str, u32)> {
    separated_pair(take_till1(|c: char| c == '/'), char('/'), prefix_length)(i)
}

/// Parse a textual CIDR (`ADDR/PREFIX`) into its RFC 5280 binary form.
///
/// The address is IPv6 if it contains a colon, IPv4 (dotted-quad) otherwise. The prefix must be
/// in `0..=32` for IPv4 and `0..=128` for IPv6. Address bits outside the prefix are cleared.
///
/// Any lexical or range error is reported as `MalformedCidr`.
pub fn parse_cidr(text: &str) -> Result<Cidr> {
    let (_, (addr, prefix)) =
        all_consuming(cidr_parts)(text).map_err(|_| NameConstraintsError::MalformedCidr)?;
    if addr.contains(':') {
        let ip = Ipv6Addr::from_str(addr).map_err(|_| NameConstraintsError::MalformedCidr)?;
        Cidr::from_parts(&ip.octets(), prefix)
    } else {
        let (_, quad) =
            all_consuming(dotted_quad)(addr).map_err(|_| NameConstraintsError::MalformedCidr)?;
        Cidr::from_parts(&quad, prefix)
    }
}

/// Count the leading 1-bits of a network mask (4 or 16 bytes).
///
/// Fails with `MalformedCidr` if the mask has another length, or if it is not a contiguous run
/// of 1-bits followed by 0-bits.
pub fn prefix_from_mask(mask: &[u8]) -> Result<u8> {
    if IpFamily::from_address_len(mask.len()).is_none() {
        return Err(NameConstraintsError::MalformedCidr);
    }
    let mut prefix = 0u8;
    let mut iter = mask.iter();
    for &byte in iter.by_ref() {
        if byte == 0xff {
            prefix += 8;
            continue;
        }
        let ones = byte.leading_ones();
        if byte << ones != 0 {
            return Err(NameConstraintsError::MalformedCidr);
        }
        prefix += ones as u8;
        break;
    }
    if iter.any(|&b| b != 0) {
        return Err(NameConstraintsError::MalformedCidr);
    }
    Ok(prefix)
}

/// Build a network mask of `width` bytes (4 or 16), with `prefix` leading 1-bits
pub fn mask_from_prefix(prefix: u32, width: usize) -> Result<Vec<u8>> {
    let family = IpFamily::from_address_len(width).ok_or(NameConstraintsError::IllegalParameter)?;
    if prefix > u32::from(family.max_prefix()) {
        return Err(NameConstraintsError::MalformedCidr);
    }
    let mut mask = vec![0u8; width];
    let mut remaining = prefix;
    for byte in mask.iter_mut() {
        if remaining >= 8 {
            *byte = 0xff;
            remaining -= 8;
        } else {
            *byte = !(0xffu8 >> remaining);
            break;
        }
    }
    Ok(mask)
}

/// Apply `mask` to `addr` (bitwise AND, byte by byte)
pub fn mask_in_place(addr: &mut [u8], mask: &[u8]) {
    for (a, m) in addr.iter_mut().zip(mask.iter()) {
        *a &= *m;
    }
}

/// Format a raw address (4 or 16 bytes)
pub fn ip_to_text(addr: &[u8]) -> Result<String> {
    if let Ok(octets) = <[u8; 4]>::try_from(addr) {
        return Ok(Ipv4Addr::from(octets).to_string());
    }
    if let Ok(octets) = <[u8; 16]>::try_from(addr) {
        return Ok(Ipv6Addr::from(octets).to_string());
    }
    Err(NameConstraintsError::IllegalParameter)
}

/// Format a range in RFC 5280 binary form (8 or 32 bytes) as `ADDR/PREFIX`
pub fn cidr_to_text(cidr: &[u8]) -> Result<String> {
    if cidr.len() != 8 && cidr.len() != 32 {
        return Err(NameConstraintsError::IllegalParameter);
    }
    let (addr, mask) = cidr.split_at(cidr.len() / 2);
    let prefix = prefix_from_mask(mask)?;
    Ok(format!("{}/{}", ip_to_text(addr)?, prefix))
}

/// Test if the raw address `ip` belongs to the range `cidr` (RFC 5280 binary form).
///
/// `ip.len()` must be half of `cidr.len()`, so addresses of different families never match.
pub fn ip_in_cidr(ip: &[u8], cidr: &[u8]) -> bool {
    let width = ip.len();
    if cidr.len() != 2 * width {
        return false;
    }
    let (addr, mask) = cidr.split_at(width);
    ip.iter()
        .zip(addr.iter())
        .zip(mask.iter())
        .all(|((i, a), m)| (i ^ a) & m == 0)
}
