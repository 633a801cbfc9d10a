use crate::cidr::Cidr;
use crate::error::{NameConstraintsError, Result};
use data_encoding::HEXUPPER;
use std::convert::TryFrom;
use std::fmt;

/// Kind of a GeneralName, as defined in RFC5280.
///
/// The discriminant is the context-specific tag of the CHOICE:
///
/// <pre>
/// GeneralName ::= CHOICE {
///      otherName                       [0]     OtherName,
///      rfc822Name                      [1]     IA5String,
///      dNSName                         [2]     IA5String,
///      x400Address                     [3]     ORAddress,
///      directoryName                   [4]     Name,
///      ediPartyName                    [5]     EDIPartyName,
///      uniformResourceIdentifier       [6]     IA5String,
///      iPAddress                       [7]     OCTET STRING,
///      registeredID                    [8]     OBJECT IDENTIFIER }
/// </pre>
///
/// Only `RFC822Name`, `DNSName`, `DirectoryName`, `URI` and `IPAddress` can be used in name
/// constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum GeneralNameKind {
    OtherName = 0,
    RFC822Name = 1,
    DNSName = 2,
    X400Address = 3,
    DirectoryName = 4,
    EDIPartyName = 5,
    URI = 6,
    IPAddress = 7,
    RegisteredID = 8,
}

impl GeneralNameKind {
    /// Kind from the context-specific tag number, if valid
    pub const fn from_tag(tag: u8) -> Option<GeneralNameKind> {
        let kind = match tag {
            0 => GeneralNameKind::OtherName,
            1 => GeneralNameKind::RFC822Name,
            2 => GeneralNameKind::DNSName,
            3 => GeneralNameKind::X400Address,
            4 => GeneralNameKind::DirectoryName,
            5 => GeneralNameKind::EDIPartyName,
            6 => GeneralNameKind::URI,
            7 => GeneralNameKind::IPAddress,
            8 => GeneralNameKind::RegisteredID,
            _ => return None,
        };
        Some(kind)
    }

    /// Context-specific tag number
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Return `true` if name constraints of this kind can be stored
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            GeneralNameKind::RFC822Name
                | GeneralNameKind::DNSName
                | GeneralNameKind::DirectoryName
                | GeneralNameKind::URI
                | GeneralNameKind::IPAddress
        )
    }
}

impl TryFrom<u8> for GeneralNameKind {
    type Error = NameConstraintsError;

    fn try_from(tag: u8) -> Result<GeneralNameKind> {
        GeneralNameKind::from_tag(tag).ok_or(NameConstraintsError::UnknownGeneralName(tag))
    }
}

impl fmt::Display for GeneralNameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GeneralNameKind::OtherName => "OtherName",
            GeneralNameKind::RFC822Name => "RFC822Name",
            GeneralNameKind::DNSName => "DNSName",
            GeneralNameKind::X400Address => "X400Address",
            GeneralNameKind::DirectoryName => "DirectoryName",
            GeneralNameKind::EDIPartyName => "EDIPartyName",
            GeneralNameKind::URI => "URI",
            GeneralNameKind::IPAddress => "IPAddress",
            GeneralNameKind::RegisteredID => "RegisteredID",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// A name constraint entry: a GeneralName of one of the supported kinds.
///
/// Strings are kept as raw bytes, without any normalization. A zero-length `DNSName` or
/// `RFC822Name` matches every name of that kind.
pub enum GeneralNameValue {
    /// More or less an e-mail, or a domain for e-mails. The format is not checked.
    RFC822Name(Vec<u8>),
    /// A hostname suffix, format is not checked.
    DNSName(Vec<u8>),
    /// DER encoding of a X.509 Name
    DirectoryName(Vec<u8>),
    /// An uniform resource identifier. The format is not checked.
    URI(Vec<u8>),
    /// An IP address range
    IPAddress(Cidr),
}

impl GeneralNameValue {
    /// Build an entry from its kind and raw value, after checking that the value is acceptable
    /// in a name constraint.
    pub fn new(kind: GeneralNameKind, value: &[u8]) -> Result<GeneralNameValue> {
        let owned = |value: &[u8]| -> Result<Vec<u8>> {
            let mut v = Vec::new();
            v.try_reserve_exact(value.len())?;
            v.extend_from_slice(value);
            Ok(v)
        };
        let name = match kind {
            GeneralNameKind::RFC822Name => GeneralNameValue::RFC822Name(owned(value)?),
            GeneralNameKind::DNSName => GeneralNameValue::DNSName(owned(value)?),
            GeneralNameKind::DirectoryName => GeneralNameValue::DirectoryName(owned(value)?),
            GeneralNameKind::URI => GeneralNameValue::URI(owned(value)?),
            GeneralNameKind::IPAddress => {
                GeneralNameValue::IPAddress(Cidr::from_rfc5280(value)?)
            }
            _ => return Err(NameConstraintsError::UnknownGeneralName(kind.tag())),
        };
        Ok(name)
    }

    pub fn kind(&self) -> GeneralNameKind {
        match self {
            GeneralNameValue::RFC822Name(_) => GeneralNameKind::RFC822Name,
            GeneralNameValue::DNSName(_) => GeneralNameKind::DNSName,
            GeneralNameValue::DirectoryName(_) => GeneralNameKind::DirectoryName,
            GeneralNameValue::URI(_) => GeneralNameKind::URI,
            GeneralNameValue::IPAddress(_) => GeneralNameKind::IPAddress,
        }
    }

    /// Raw value (RFC 5280 binary form for IP ranges)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            GeneralNameValue::RFC822Name(b)
            | GeneralNameValue::DNSName(b)
            | GeneralNameValue::DirectoryName(b)
            | GeneralNameValue::URI(b) => b,
            GeneralNameValue::IPAddress(cidr) => cidr.as_bytes(),
        }
    }

    /// Kind and raw value
    #[inline]
    pub fn as_pair(&self) -> (GeneralNameKind, &[u8]) {
        (self.kind(), self.as_bytes())
    }
}

impl fmt::Display for GeneralNameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralNameValue::RFC822Name(s) => {
                write!(f, "RFC822Name({})", String::from_utf8_lossy(s))
            }
            GeneralNameValue::DNSName(s) => write!(f, "DNSName({})", String::from_utf8_lossy(s)),
            GeneralNameValue::DirectoryName(dn) => {
                write!(f, "DirectoryName({})", HEXUPPER.encode(dn))
            }
            GeneralNameValue::URI(s) => write!(f, "URI({})", String::from_utf8_lossy(s)),
            GeneralNameValue::IPAddress(cidr) => write!(f, "IPAddress({})", cidr),
        }
    }
}
