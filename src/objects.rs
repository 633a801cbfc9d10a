//! Object identifiers used when checking certificate names
//!
//! OIDs from the x509 registry are re-exported from `oid-registry`.

use asn1_rs::{oid, Oid};

pub use oid_registry::{OID_X509_COMMON_NAME, OID_X509_EXT_NAME_CONSTRAINTS};

/// PKCS#9 `emailAddress` attribute, used in legacy subject names
pub const OID_PKCS9_EMAIL_ADDRESS: Oid<'static> = oid!(1.2.840 .113549 .1 .9 .1);

/// Extended key usage `id-kp-serverAuth` (TLS WWW server authentication)
pub const OID_KP_SERVER_AUTH: Oid<'static> = oid!(1.3.6 .1 .5 .5 .7 .3 .1);
