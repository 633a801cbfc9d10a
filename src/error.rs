//! Name constraints errors

/// An error that can occur while building, importing or merging name constraints.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum NameConstraintsError {
    /// Textual CIDR, or the mask half of an IP constraint, is not valid
    #[error("malformed CIDR")]
    MalformedCidr,
    /// General name kind (context tag) outside the supported set
    #[error("unknown or unsupported general name (tag {0})")]
    UnknownGeneralName(u8),
    /// IP constraint length is not 8 or 32 bytes
    #[error("illegal parameter")]
    IllegalParameter,
    #[error("out of memory")]
    OutOfMemory,
    /// Index past the end of a list, also used as end-of-iteration marker
    #[error("requested data not available")]
    RequestedDataNotAvailable,
    #[error("internal error")]
    Internal,

    #[error("DER error: {0}")]
    Der(#[from] asn1_rs::Error),
    #[error("DER encoding error")]
    DerEncoding,
}

/// A certificate name is not allowed by the name constraints
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("certificate names violate {kind} name constraints")]
pub struct ConstraintViolation {
    pub kind: crate::general_name::GeneralNameKind,
}

/// Holds the result of an operation on name constraints
pub type Result<T> = std::result::Result<T, NameConstraintsError>;

impl From<std::collections::TryReserveError> for NameConstraintsError {
    fn from(_: std::collections::TryReserveError) -> NameConstraintsError {
        NameConstraintsError::OutOfMemory
    }
}

impl From<nom::Err<asn1_rs::Error>> for NameConstraintsError {
    fn from(e: nom::Err<asn1_rs::Error>) -> NameConstraintsError {
        match e {
            // truncated input
            nom::Err::Incomplete(_) => NameConstraintsError::Der(asn1_rs::Error::InvalidLength),
            nom::Err::Error(e) | nom::Err::Failure(e) => NameConstraintsError::Der(e),
        }
    }
}
