//! Merging the name constraints of successive CAs of a certification path
//!
//! The merged set accepts a name only if both input sets accept it: permitted lists are
//! intersected, and excluded lists are concatenated.
//!
//! Permitted entries are grouped in classes (DNS names, e-mail addresses, IPv4 ranges, IPv6
//! ranges). For each class present in both inputs, only the pairwise intersections of the
//! entries are kept. `DirectoryName` and `URI` entries are copied unchanged, as are classes
//! restricted by only one input, with one exception for IP ranges: a family permitted only by
//! the second input, while the first input permits some IP range, is not copied. When a class is
//! restricted and its intersection is empty, or in that exception, a universal excluded entry is
//! added for the class so that no name of the class is accepted anymore.
//!
//! Because of that exception the result depends on the order of the inputs when they permit
//! different IP families.

use crate::cidr::{Cidr, IpFamily};
use crate::constraints::{push_entry, NameConstraints};
use crate::error::{NameConstraintsError, Result};
use crate::general_name::{GeneralNameKind, GeneralNameValue};
use crate::matching::{dns_name_matches, email_matches};
use log::debug;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum MergeClass {
    DNS,
    Email,
    IPv4,
    IPv6,
}

impl MergeClass {
    fn of(value: &GeneralNameValue) -> Option<MergeClass> {
        match value {
            GeneralNameValue::DNSName(_) => Some(MergeClass::DNS),
            GeneralNameValue::RFC822Name(_) => Some(MergeClass::Email),
            GeneralNameValue::IPAddress(cidr) => match cidr.family() {
                IpFamily::V4 => Some(MergeClass::IPv4),
                IpFamily::V6 => Some(MergeClass::IPv6),
            },
            _ => None,
        }
    }

    /// Excluded entry rejecting every name of the class
    fn universal(self) -> GeneralNameValue {
        match self {
            MergeClass::DNS => GeneralNameValue::DNSName(Vec::new()),
            MergeClass::Email => GeneralNameValue::RFC822Name(Vec::new()),
            MergeClass::IPv4 => GeneralNameValue::IPAddress(Cidr::universal(IpFamily::V4)),
            MergeClass::IPv6 => GeneralNameValue::IPAddress(Cidr::universal(IpFamily::V6)),
        }
    }
}

fn try_clone(value: &GeneralNameValue) -> Result<GeneralNameValue> {
    GeneralNameValue::new(value.kind(), value.as_bytes())
}

/// Intersection of two permitted entries of the same class
fn intersect_entries(
    a: &GeneralNameValue,
    b: &GeneralNameValue,
) -> Result<Option<GeneralNameValue>> {
    let matches: fn(&[u8], &[u8]) -> bool = match (a, b) {
        (GeneralNameValue::DNSName(_), GeneralNameValue::DNSName(_)) => dns_name_matches,
        (GeneralNameValue::RFC822Name(_), GeneralNameValue::RFC822Name(_)) => email_matches,
        (GeneralNameValue::IPAddress(x), GeneralNameValue::IPAddress(y)) => {
            return Ok(x.intersect(y).map(GeneralNameValue::IPAddress))
        }
        _ => return Err(NameConstraintsError::Internal),
    };
    // subtrees are either nested or disjoint: keep the narrowest one
    if matches(b.as_bytes(), a.as_bytes()) {
        try_clone(b).map(Some)
    } else if matches(a.as_bytes(), b.as_bytes()) {
        try_clone(a).map(Some)
    } else {
        Ok(None)
    }
}

/// Intersect permitted lists `a` and `b`, adding universal exclusions to `excluded` for classes
/// whose intersection is empty.
fn intersect_permitted(
    a: Vec<GeneralNameValue>,
    b: &[GeneralNameValue],
    excluded: &mut Vec<GeneralNameValue>,
) -> Result<Vec<GeneralNameValue>> {
    let b_classes: BTreeSet<MergeClass> = b.iter().filter_map(MergeClass::of).collect();
    let a_kinds: BTreeSet<GeneralNameKind> = a.iter().map(GeneralNameValue::kind).collect();

    // classes restricted by at least one side, and classes with a non-empty intersection
    let mut contested = BTreeSet::new();
    let mut intersected = BTreeSet::new();

    let mut dest = Vec::new();
    let mut deferred = Vec::new();

    for value in a {
        match MergeClass::of(&value) {
            Some(class) if b_classes.contains(&class) => {
                contested.insert(class);
                deferred.push(value);
            }
            _ => push_entry(&mut dest, value)?,
        }
    }

    for value in b {
        let class = match MergeClass::of(value) {
            Some(class) if a_kinds.contains(&value.kind()) => class,
            _ => {
                push_entry(&mut dest, try_clone(value)?)?;
                continue;
            }
        };
        contested.insert(class);
        for other in deferred.iter().filter(|v| MergeClass::of(v) == Some(class)) {
            if let Some(entry) = intersect_entries(other, value)? {
                intersected.insert(class);
                if !dest.contains(&entry) {
                    push_entry(&mut dest, entry)?;
                }
            }
        }
    }

    for class in contested.difference(&intersected) {
        let universal = class.universal();
        debug!(
            "empty intersection of {:?} constraints, adding excluded {}",
            class, universal
        );
        push_entry(excluded, universal)?;
    }

    Ok(dest)
}

impl NameConstraints {
    /// Merge the constraints of `other` into `self`, as when processing the next CA of a
    /// certification path.
    ///
    /// A name is accepted by the result only if it is accepted by both sets. Both sets are
    /// consumed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use x509_name_constraints::{CheckResult, GeneralNameKind, NameConstraints};
    ///
    /// # fn main() -> Result<(), x509_name_constraints::error::NameConstraintsError> {
    /// let mut ca = NameConstraints::new();
    /// ca.add_permitted_cidr("10.0.0.0/8")?;
    /// let mut sub_ca = NameConstraints::new();
    /// sub_ca.add_permitted_cidr("10.1.0.0/16")?;
    ///
    /// let merged = ca.merge(sub_ca)?;
    /// assert_eq!(merged.permitted()[0].to_string(), "IPAddress(10.1.0.0/16)");
    /// assert_eq!(merged.check(GeneralNameKind::IPAddress, &[10, 2, 0, 1]), CheckResult::Rejected);
    /// # Ok(())
    /// # }
    /// ```
    pub fn merge(self, other: NameConstraints) -> Result<NameConstraints> {
        let (a_permitted, a_excluded) = self.into_parts();
        let (b_permitted, b_excluded) = other.into_parts();

        let mut excluded = a_excluded;
        let permitted = intersect_permitted(a_permitted, &b_permitted, &mut excluded)?;

        excluded.try_reserve(b_excluded.len())?;
        excluded.extend(b_excluded);

        Ok(NameConstraints {
            permitted,
            excluded,
        })
    }
}
