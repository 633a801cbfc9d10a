//! # X.509 Name Constraints
//!
//! An implementation of the X.509 v3 Name Constraints extension ([RFC5280] 4.2.1.10), and of the
//! name constraints processing of the certification path validation algorithm ([RFC5280] 6.1).
//!
//! A CA can restrict the names that certificates below it may use, with a list of *permitted*
//! subtrees and a list of *excluded* subtrees. This crate provides:
//!
//! - the constraints set, [`NameConstraints`], storing `DNSName`, `RFC822Name`, `DirectoryName`,
//!   `URI` and `IPAddress` entries
//! - conversion of IP ranges between CIDR text (`192.0.2.0/24`) and the RFC 5280 binary form
//!   (address followed by mask), in the [`cidr`] module
//! - the DER codec of the extension ([`NameConstraints::from_der`], [`NameConstraints::to_der`])
//! - merging of the constraints of successive CAs ([`NameConstraints::merge`])
//! - checking names, or all the names of a certificate, against constraints
//!   ([`NameConstraints::check`], [`NameConstraints::check_cert`])
//!
//! Parsing certificates is not part of this crate: certificate checks go through the
//! [`CertificateNames`] trait, to be implemented on the certificate type of the caller.
//!
//! # Examples
//!
//! Decoding an extension and checking names:
//!
//! ```rust
//! use hex_literal::hex;
//! use x509_name_constraints::{CheckResult, GeneralNameKind, NameConstraints};
//!
//! // permitted: DNS .example.com
//! static NC_DER: &[u8] = &hex!("30 12 a0 10 30 0e 82 0c 2e 65 78 61 6d 70 6c 65 2e 63 6f 6d");
//!
//! # fn main() {
//! let nc = NameConstraints::from_der(NC_DER).expect("could not decode name constraints");
//! assert_eq!(nc.check(GeneralNameKind::DNSName, b"www.example.com"), CheckResult::Acceptable);
//! assert_eq!(nc.check(GeneralNameKind::DNSName, b"example.com"), CheckResult::Rejected);
//! # }
//! ```
//!
//! Accumulating constraints along a certification path:
//!
//! ```rust
//! use x509_name_constraints::{GeneralNameKind, NameConstraints};
//! use x509_name_constraints::der::ImportMode;
//!
//! # fn main() -> Result<(), x509_name_constraints::error::NameConstraintsError> {
//! # let ca_ext: &[u8] = &[0x30, 0x0c, 0xa0, 0x0a, 0x30, 0x08, 0x82, 0x06, 0x61, 0x2e, 0x74, 0x65, 0x73, 0x74];
//! # let sub_ca_ext: &[u8] = &[0x30, 0x0c, 0xa0, 0x0a, 0x30, 0x08, 0x82, 0x06, 0x62, 0x2e, 0x74, 0x65, 0x73, 0x74];
//! let mut nc = NameConstraints::new();
//! for ext in [ca_ext, sub_ca_ext].iter() {
//!     nc.import_der(ext, ImportMode::Append)?;
//! }
//! // a.test and b.test are disjoint: no DNS name is allowed
//! assert!(nc.permitted().is_empty());
//! assert_eq!(nc.excluded_at(0)?, (GeneralNameKind::DNSName, &b""[..]));
//! # Ok(())
//! # }
//! ```
//!
//! [RFC5280]: https://tools.ietf.org/html/rfc5280

#![deny(/*missing_docs,*/
        unstable_features,
        unused_import_braces)]
#![warn(
    missing_debug_implementations,
    /* missing_docs,
    rust_2018_idioms,*/
    unreachable_pub,
    unused_qualifications
)]
#![forbid(unsafe_code)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod check;
pub mod cidr;
pub mod constraints;
pub mod der;
pub mod error;
pub mod general_name;
pub mod import;
pub mod matching;
mod merge;
pub mod objects;
pub mod validate;

pub use check::{CertificateNames, CheckResult};
pub use cidr::{Cidr, IpFamily};
pub use constraints::NameConstraints;
pub use general_name::{GeneralNameKind, GeneralNameValue};
