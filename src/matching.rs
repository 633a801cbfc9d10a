//! Subtree matching predicates for DNS names, e-mail addresses and IP addresses
//!
//! All comparisons are byte-exact: no case folding or Unicode normalization is done here.
//! Callers wanting case-insensitive matching should lowercase names and constraints before
//! inserting or checking them.

use crate::cidr::{ip_in_cidr, Cidr};
use log::trace;

/// Test if DNS name `name` is within the subtree defined by `constraint`.
///
/// A name matches if it is equal to the constraint, or if the constraint is a suffix of the name
/// aligned on a label boundary (`host.example.com` is within `example.com`, `badexample.com` is
/// not). A leading `.` in the constraint is ignored for the suffix test, so `.example.com`
/// matches the subdomains of `example.com` but not `example.com` itself.
///
/// A zero-length constraint matches every name.
pub fn dns_name_matches(name: &[u8], constraint: &[u8]) -> bool {
    trace!(
        "matching {} with DNS constraint {}",
        String::from_utf8_lossy(name),
        String::from_utf8_lossy(constraint)
    );
    if constraint.is_empty() || name == constraint {
        return true;
    }
    dns_ends_with(name, constraint)
}

fn dns_ends_with(name: &[u8], suffix: &[u8]) -> bool {
    if suffix.len() >= name.len() {
        return false;
    }
    let tree = match suffix {
        [b'.', rest @ ..] => rest,
        _ => suffix,
    };
    name.ends_with(tree) && name[name.len() - tree.len() - 1] == b'.'
}

/// Test if e-mail address `name` is within the subtree defined by `constraint`.
///
/// Three forms of constraint are accepted (RFC 5280 4.2.1.10):
/// - a full mailbox (`user@example.com`), matching only this address
/// - a host (`example.com`), matching all mailboxes on that host
/// - a domain starting with a dot (`.example.com`), matching all mailboxes of all subdomains
///
/// A zero-length constraint matches every address.
pub fn email_matches(name: &[u8], constraint: &[u8]) -> bool {
    trace!(
        "matching {} with e-mail constraint {}",
        String::from_utf8_lossy(name),
        String::from_utf8_lossy(constraint)
    );
    if constraint.is_empty() || name == constraint {
        return true;
    }
    email_ends_with(name, constraint)
}

fn email_ends_with(name: &[u8], suffix: &[u8]) -> bool {
    if suffix.len() >= name.len() {
        return false;
    }
    if suffix.len() > 1 && suffix[0] == b'.' {
        // .domain.com
        return name.ends_with(suffix);
    }
    name.ends_with(suffix) && name[name.len() - suffix.len() - 1] == b'@'
}

/// Test if raw IP address `ip` (4 or 16 bytes) belongs to the range `constraint`.
///
/// Addresses and ranges of different families never match.
#[inline]
pub fn ip_matches(ip: &[u8], constraint: &Cidr) -> bool {
    ip_in_cidr(ip, constraint.as_bytes())
}
