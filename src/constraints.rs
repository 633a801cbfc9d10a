//! Name constraints set: the `permitted` and `excluded` lists of a CA
//!
//! <pre>
//! NameConstraints ::= SEQUENCE {
//!     permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
//!     excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }
//! </pre>

use crate::cidr::{parse_cidr, prefix_from_mask};
use crate::error::{NameConstraintsError, Result};
use crate::general_name::{GeneralNameKind, GeneralNameValue};
use std::fmt;

/// Check that a name constraint entry (`kind`, `name`) can be stored in a set.
///
/// The supported kinds are `DNSName`, `RFC822Name`, `DirectoryName`, `URI` and `IPAddress`.
/// IP ranges must be 8 (IPv4) or 32 (IPv6) bytes long, and their mask must be a contiguous
/// prefix.
pub fn validate_entry(kind: GeneralNameKind, name: &[u8]) -> Result<()> {
    if !kind.is_supported() {
        return Err(NameConstraintsError::UnknownGeneralName(kind.tag()));
    }
    if kind == GeneralNameKind::IPAddress {
        if name.len() != 8 && name.len() != 32 {
            return Err(NameConstraintsError::IllegalParameter);
        }
        prefix_from_mask(&name[name.len() / 2..])?;
    }
    Ok(())
}

/// Name constraints of a CA, or accumulated along a certification path.
///
/// Entries are kept in insertion order. Each set owns its entries: cloning a set copies all of
/// them.
///
/// # Examples
///
/// ```rust
/// use x509_name_constraints::{CheckResult, GeneralNameKind, NameConstraints};
///
/// # fn main() -> Result<(), x509_name_constraints::error::NameConstraintsError> {
/// let mut nc = NameConstraints::new();
/// nc.add_permitted(GeneralNameKind::DNSName, b"example.com")?;
/// nc.add_excluded_cidr("10.0.0.0/8")?;
///
/// assert_eq!(nc.check(GeneralNameKind::DNSName, b"www.example.com"), CheckResult::Acceptable);
/// assert_eq!(nc.check(GeneralNameKind::DNSName, b"www.example.org"), CheckResult::Rejected);
/// assert_eq!(nc.check(GeneralNameKind::IPAddress, &[10, 1, 2, 3]), CheckResult::Rejected);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameConstraints {
    pub(crate) permitted: Vec<GeneralNameValue>,
    pub(crate) excluded: Vec<GeneralNameValue>,
}

impl NameConstraints {
    /// Create an empty set (no permitted nor excluded entries)
    #[inline]
    pub const fn new() -> Self {
        NameConstraints {
            permitted: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Add a name constraint to the list of permitted constraints.
    ///
    /// For `IPAddress`, `name` is the address in network byte order followed by its network mask
    /// (4 bytes each for IPv4, 16 bytes each for IPv6). On error, the set is not modified.
    pub fn add_permitted(&mut self, kind: GeneralNameKind, name: &[u8]) -> Result<()> {
        validate_entry(kind, name)?;
        push_entry(&mut self.permitted, GeneralNameValue::new(kind, name)?)
    }

    /// Add a name constraint to the list of excluded constraints.
    ///
    /// See [`NameConstraints::add_permitted`] for the format of `name`.
    pub fn add_excluded(&mut self, kind: GeneralNameKind, name: &[u8]) -> Result<()> {
        validate_entry(kind, name)?;
        push_entry(&mut self.excluded, GeneralNameValue::new(kind, name)?)
    }

    /// Add a permitted IP range, given in CIDR notation (for ex. `192.0.2.0/24`)
    pub fn add_permitted_cidr(&mut self, cidr: &str) -> Result<()> {
        let cidr = parse_cidr(cidr)?;
        push_entry(&mut self.permitted, GeneralNameValue::IPAddress(cidr))
    }

    /// Add an excluded IP range, given in CIDR notation (for ex. `2001:db8::/32`)
    pub fn add_excluded_cidr(&mut self, cidr: &str) -> Result<()> {
        let cidr = parse_cidr(cidr)?;
        push_entry(&mut self.excluded, GeneralNameValue::IPAddress(cidr))
    }

    /// Get the permitted constraint at index `idx`.
    ///
    /// The name is valid for the lifetime of the set, until it is next modified. Returns
    /// `RequestedDataNotAvailable` if `idx` is past the end of the list.
    pub fn permitted_at(&self, idx: usize) -> Result<(GeneralNameKind, &[u8])> {
        self.permitted
            .get(idx)
            .map(GeneralNameValue::as_pair)
            .ok_or(NameConstraintsError::RequestedDataNotAvailable)
    }

    /// Get the excluded constraint at index `idx`.
    ///
    /// Returns `RequestedDataNotAvailable` if `idx` is past the end of the list.
    pub fn excluded_at(&self, idx: usize) -> Result<(GeneralNameKind, &[u8])> {
        self.excluded
            .get(idx)
            .map(GeneralNameValue::as_pair)
            .ok_or(NameConstraintsError::RequestedDataNotAvailable)
    }

    #[inline]
    pub fn permitted(&self) -> &[GeneralNameValue] {
        &self.permitted
    }

    #[inline]
    pub fn excluded(&self) -> &[GeneralNameValue] {
        &self.excluded
    }

    /// Return `true` if both lists are empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.permitted.is_empty() && self.excluded.is_empty()
    }

    /// Return `true` if neither list contains a constraint of the given kind
    pub fn is_empty_for(&self, kind: GeneralNameKind) -> bool {
        !self
            .permitted
            .iter()
            .chain(self.excluded.iter())
            .any(|v| v.kind() == kind)
    }

    /// Remove all constraints, and release the memory used by entries
    pub fn clear(&mut self) {
        self.permitted = Vec::new();
        self.excluded = Vec::new();
    }

    /// Consume the set, returning the `(permitted, excluded)` lists
    pub fn into_parts(self) -> (Vec<GeneralNameValue>, Vec<GeneralNameValue>) {
        (self.permitted, self.excluded)
    }
}

pub(crate) fn push_entry(list: &mut Vec<GeneralNameValue>, value: GeneralNameValue) -> Result<()> {
    list.try_reserve(1)?;
    list.push(value);
    Ok(())
}

impl fmt::Display for NameConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.permitted.is_empty() {
            writeln!(f, "Permitted:")?;
            for v in &self.permitted {
                writeln!(f, "\t{}", v)?;
            }
        }
        if !self.excluded.is_empty() {
            writeln!(f, "Excluded:")?;
            for v in &self.excluded {
                writeln!(f, "\t{}", v)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn validate_entries() {
        assert_eq!(validate_entry(GeneralNameKind::DNSName, b""), Ok(()));
        assert_eq!(validate_entry(GeneralNameKind::DirectoryName, &hex!("30 00")), Ok(()));
        assert_eq!(
            validate_entry(GeneralNameKind::RegisteredID, &hex!("2a 03")),
            Err(NameConstraintsError::UnknownGeneralName(8))
        );
        assert_eq!(
            validate_entry(GeneralNameKind::IPAddress, &[0; 31]),
            Err(NameConstraintsError::IllegalParameter)
        );
        assert_eq!(
            validate_entry(GeneralNameKind::IPAddress, &hex!("0a 00 00 00 ff 00 ff 00")),
            Err(NameConstraintsError::MalformedCidr)
        );
    }

    #[test]
    fn add_and_read_back() {
        let mut nc = NameConstraints::new();
        assert!(nc.is_empty());
        nc.add_permitted(GeneralNameKind::DNSName, b"example.com").expect("dns");
        nc.add_permitted_cidr("192.0.2.0/24").expect("ip");
        nc.add_excluded(GeneralNameKind::RFC822Name, b".example.net").expect("email");

        assert_eq!(
            nc.permitted_at(0),
            Ok((GeneralNameKind::DNSName, &b"example.com"[..]))
        );
        assert_eq!(
            nc.permitted_at(1),
            Ok((GeneralNameKind::IPAddress, &hex!("c0 00 02 00 ff ff ff 00")[..]))
        );
        assert_eq!(
            nc.permitted_at(2),
            Err(NameConstraintsError::RequestedDataNotAvailable)
        );
        assert_eq!(
            nc.excluded_at(0),
            Ok((GeneralNameKind::RFC822Name, &b".example.net"[..]))
        );
        assert_eq!(
            nc.excluded_at(1),
            Err(NameConstraintsError::RequestedDataNotAvailable)
        );

        assert!(!nc.is_empty_for(GeneralNameKind::DNSName));
        assert!(!nc.is_empty_for(GeneralNameKind::RFC822Name));
        assert!(nc.is_empty_for(GeneralNameKind::URI));

        nc.clear();
        assert!(nc.is_empty());
    }

    #[test]
    fn failed_add_keeps_set() {
        let mut nc = NameConstraints::new();
        nc.add_excluded_cidr("2001:DB8::/34").expect("ip");
        let before = nc.clone();
        let mut bad = parse_cidr("2001:DB8::/34").expect("ip").as_bytes().to_vec();
        bad[30] = 0x02;
        assert_eq!(
            nc.add_excluded(GeneralNameKind::IPAddress, &bad),
            Err(NameConstraintsError::MalformedCidr)
        );
        assert_eq!(
            nc.add_permitted(GeneralNameKind::IPAddress, &bad[..31]),
            Err(NameConstraintsError::IllegalParameter)
        );
        assert_eq!(
            nc.add_permitted_cidr("10.0.0.0/40"),
            Err(NameConstraintsError::MalformedCidr)
        );
        assert_eq!(nc, before);
    }

    #[test]
    fn clone_is_deep() {
        let mut nc = NameConstraints::new();
        nc.add_permitted(GeneralNameKind::URI, b"https://example.com").expect("uri");
        let copy = nc.clone();
        nc.clear();
        assert_eq!(copy.permitted().len(), 1);
        assert_eq!(copy.permitted()[0].as_bytes(), b"https://example.com");
    }

    #[test]
    fn display_dump() {
        let mut nc = NameConstraints::new();
        nc.add_permitted(GeneralNameKind::DNSName, b".example.com").expect("dns");
        nc.add_excluded_cidr("2001:DB8::/32").expect("ip");
        assert_eq!(
            nc.to_string(),
            "Permitted:\n\tDNSName(.example.com)\nExcluded:\n\tIPAddress(2001:db8::/32)\n"
        );
    }
}
