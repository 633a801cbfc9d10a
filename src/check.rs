//! Checking names against name constraints (RFC 5280 6.1.3 (b))
//!
//! A name is checked in three steps:
//! - if any excluded entry of the same kind matches, the name is rejected
//! - otherwise, if any permitted entry of the same kind matches, the name is accepted
//! - otherwise, the name is rejected if at least one permitted entry of that kind exists
//!
//! Names of kinds that cannot be matched (`DirectoryName`, `URI`, and unsupported kinds) are
//! rejected if at least one excluded entry of their kind exists, and accepted otherwise.

use crate::constraints::NameConstraints;
use crate::error::{ConstraintViolation, Result};
use crate::general_name::{GeneralNameKind, GeneralNameValue};
use crate::matching::{dns_name_matches, email_matches, ip_matches};
use crate::objects::{OID_KP_SERVER_AUTH, OID_PKCS9_EMAIL_ADDRESS, OID_X509_COMMON_NAME};
use asn1_rs::Oid;
use log::{debug, warn};
use std::net::IpAddr;

/// Result of checking a name against constraints
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckResult {
    Acceptable,
    Rejected,
}

impl CheckResult {
    #[inline]
    pub const fn is_acceptable(self) -> bool {
        matches!(self, CheckResult::Acceptable)
    }
}

/// Access to the names of a certificate.
///
/// Implemented by the certificate type of the caller, so that constraints can be checked without
/// depending on a specific X.509 parser.
pub trait CertificateNames {
    /// Subject alternative names as `(kind, raw value)` pairs, in certificate order.
    ///
    /// The raw value of an `IPAddress` is the 4 or 16 address bytes, the value of a
    /// `DirectoryName` is the DER encoding of the name. Returns an empty list if the certificate
    /// has no SubjectAltName extension.
    fn subject_alt_names(&self) -> Result<Vec<(GeneralNameKind, &[u8])>>;

    /// Values of all the attributes of the subject DN with type `oid`, in order
    fn subject_rdn_values(&self, oid: &Oid<'_>) -> Result<Vec<&[u8]>>;

    /// Return `true` if the certificate can be used for the key purpose `purpose`
    fn has_key_purpose(&self, purpose: &Oid<'_>) -> bool;
}

impl NameConstraints {
    /// Check if name `name` of kind `kind` is allowed by these constraints.
    ///
    /// For `IPAddress`, `name` is the raw address (4 bytes for IPv4, 16 bytes for IPv6).
    ///
    /// This never fails: unsupported kinds are rejected if any constraint of that kind is
    /// excluded, and accepted otherwise.
    pub fn check(&self, kind: GeneralNameKind, name: &[u8]) -> CheckResult {
        match kind {
            GeneralNameKind::DNSName => self.check_matching(kind, |c| dns_name_matches(name, c)),
            GeneralNameKind::RFC822Name => self.check_matching(kind, |c| email_matches(name, c)),
            GeneralNameKind::IPAddress => self.check_ip(name),
            _ => self.check_unsupported(kind),
        }
    }

    /// Check if IP address `ip` is allowed by these constraints
    pub fn check_ip_addr(&self, ip: &IpAddr) -> CheckResult {
        match ip {
            IpAddr::V4(ip) => self.check_ip(&ip.octets()),
            IpAddr::V6(ip) => self.check_ip(&ip.octets()),
        }
    }

    fn check_matching<F>(&self, kind: GeneralNameKind, matches: F) -> CheckResult
    where
        F: Fn(&[u8]) -> bool,
    {
        let of_kind = |v: &&GeneralNameValue| v.kind() == kind;

        // a zero-length excluded entry matches everything
        if self
            .excluded
            .iter()
            .filter(of_kind)
            .any(|v| matches(v.as_bytes()))
        {
            return CheckResult::Rejected;
        }

        // zero-length permitted entries do not restrict the kind
        let mut restricted = false;
        for v in self.permitted.iter().filter(of_kind) {
            if v.as_bytes().is_empty() {
                continue;
            }
            restricted = true;
            if matches(v.as_bytes()) {
                return CheckResult::Acceptable;
            }
        }

        if restricted {
            CheckResult::Rejected
        } else {
            CheckResult::Acceptable
        }
    }

    fn check_ip(&self, ip: &[u8]) -> CheckResult {
        if ip.len() != 4 && ip.len() != 16 {
            return self.check_unsupported(GeneralNameKind::IPAddress);
        }
        let same_family = |v: &&GeneralNameValue| match v {
            GeneralNameValue::IPAddress(cidr) => cidr.family().address_len() == ip.len(),
            _ => false,
        };
        let cidr = |v: &GeneralNameValue| match v {
            GeneralNameValue::IPAddress(cidr) => ip_matches(ip, cidr),
            _ => false,
        };

        if self.excluded.iter().filter(same_family).any(cidr) {
            return CheckResult::Rejected;
        }
        let mut permitted = self.permitted.iter().filter(same_family).peekable();
        if permitted.peek().is_none() {
            return CheckResult::Acceptable;
        }
        if permitted.any(cidr) {
            CheckResult::Acceptable
        } else {
            CheckResult::Rejected
        }
    }

    fn check_unsupported(&self, kind: GeneralNameKind) -> CheckResult {
        if self.excluded.iter().any(|v| v.kind() == kind) {
            CheckResult::Rejected
        } else {
            CheckResult::Acceptable
        }
    }

    /// Check if all names of kind `kind` in certificate `cert` are allowed by these constraints.
    ///
    /// Names are taken from the SubjectAltName extension. If the certificate has no alternative
    /// name of the requested kind, the subject DN is used instead:
    /// - for `DNSName`, the CommonName, only if the certificate can be used as a TLS server
    /// - for `RFC822Name`, the PKCS#9 emailAddress attribute
    ///
    /// A subject with more than one such attribute is rejected. `URI` and `DirectoryName` names
    /// cannot be matched: they are rejected if the certificate has one and an excluded entry of
    /// the same kind exists.
    ///
    /// Errors while reading the certificate names cause the certificate to be rejected.
    pub fn check_cert<C>(&self, cert: &C, kind: GeneralNameKind) -> CheckResult
    where
        C: CertificateNames + ?Sized,
    {
        if self.is_empty_for(kind) {
            return CheckResult::Acceptable;
        }
        let sans = match cert.subject_alt_names() {
            Ok(sans) => sans,
            Err(e) => {
                debug!("could not read certificate alternative names: {}", e);
                return CheckResult::Rejected;
            }
        };
        let mut names = sans.iter().filter(|(k, _)| *k == kind).peekable();
        let has_names = names.peek().is_some();

        match kind {
            GeneralNameKind::DNSName
            | GeneralNameKind::RFC822Name
            | GeneralNameKind::IPAddress => {
                if has_names {
                    return if names.all(|(_, name)| self.check(kind, name).is_acceptable()) {
                        CheckResult::Acceptable
                    } else {
                        CheckResult::Rejected
                    };
                }
                let attr = match kind {
                    GeneralNameKind::DNSName if cert.has_key_purpose(&OID_KP_SERVER_AUTH) => {
                        OID_X509_COMMON_NAME
                    }
                    GeneralNameKind::RFC822Name => OID_PKCS9_EMAIL_ADDRESS,
                    _ => return CheckResult::Acceptable,
                };
                self.check_subject_attribute(cert, kind, &attr)
            }
            GeneralNameKind::DirectoryName | GeneralNameKind::URI if !has_names => {
                CheckResult::Acceptable
            }
            _ => self.check_unsupported(kind),
        }
    }

    fn check_subject_attribute<C>(
        &self,
        cert: &C,
        kind: GeneralNameKind,
        attr: &Oid<'_>,
    ) -> CheckResult
    where
        C: CertificateNames + ?Sized,
    {
        let values = match cert.subject_rdn_values(attr) {
            Ok(values) => values,
            Err(e) => {
                debug!("could not read certificate subject attribute {}: {}", attr, e);
                return CheckResult::Rejected;
            }
        };
        match values.as_slice() {
            [] => CheckResult::Acceptable,
            [value] => self.check(kind, value),
            _ => {
                warn!(
                    "certificate subject has {} {} attributes, cannot check {} constraints",
                    values.len(),
                    attr,
                    kind
                );
                CheckResult::Rejected
            }
        }
    }

    /// Check all the names of certificate `cert`.
    ///
    /// Kinds are checked in the order `DNSName`, `RFC822Name`, `DirectoryName`, `URI`,
    /// `IPAddress`. The first kind with a rejected name is returned as error.
    pub fn check_cert_all<C>(&self, cert: &C) -> std::result::Result<(), ConstraintViolation>
    where
        C: CertificateNames + ?Sized,
    {
        const KINDS: [GeneralNameKind; 5] = [
            GeneralNameKind::DNSName,
            GeneralNameKind::RFC822Name,
            GeneralNameKind::DirectoryName,
            GeneralNameKind::URI,
            GeneralNameKind::IPAddress,
        ];
        for &kind in KINDS.iter() {
            if self.check_cert(cert, kind) == CheckResult::Rejected {
                return Err(ConstraintViolation { kind });
            }
        }
        Ok(())
    }
}
