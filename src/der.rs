//! DER codec for the `NameConstraints` certificate extension
//!
//! <pre>
//! NameConstraints ::= SEQUENCE {
//!     permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
//!     excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }
//!
//! GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree
//!
//! GeneralSubtree ::= SEQUENCE {
//!     base                    GeneralName,
//!     minimum         [0]     BaseDistance DEFAULT 0,
//!     maximum         [1]     BaseDistance OPTIONAL }
//! </pre>
//!
//! `minimum` and `maximum` are ignored when decoding, and never written when encoding (RFC 5280
//! requires the default value for `minimum` and the absence of `maximum`).

use crate::constraints::NameConstraints;
use crate::error::{NameConstraintsError, Result};
use crate::general_name::GeneralNameKind;
use crate::import::{Subtree, SubtreeEmitter};
use asn1_rs::{Any, Class, FromDer, Header, Length, Tag, ToDer};
use std::convert::TryFrom;

/// How [`NameConstraints::import_der`] combines decoded constraints with the existing ones
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard existing constraints
    Replace,
    /// Merge decoded constraints into the existing ones (intersection of permitted, union of
    /// excluded). Equivalent to `Replace` if the set is empty.
    Append,
}

/// Iterator over the subtrees of an encoded `GeneralSubtrees`
#[derive(Clone, Debug)]
pub struct GeneralSubtrees<'a> {
    rem: &'a [u8],
    index: usize,
}

impl<'a> GeneralSubtrees<'a> {
    /// Iterate over the content of a `GeneralSubtrees` (the concatenated `GeneralSubtree`
    /// elements, without the outer tag and length)
    pub const fn new(content: &'a [u8]) -> Self {
        GeneralSubtrees {
            rem: content,
            index: 0,
        }
    }

    fn parse_subtree(&mut self) -> Result<Subtree<'a>> {
        let (rem, subtree) = Any::from_der(self.rem)?;
        subtree.header.assert_tag(Tag::Sequence)?;
        // first element is `base`, optional minimum and maximum follow
        let (_, base) = Any::from_der(subtree.data)?;
        base.header.assert_class(Class::ContextSpecific)?;
        let tag = base.header.tag().0;
        let kind = u8::try_from(tag)
            .ok()
            .and_then(GeneralNameKind::from_tag)
            .ok_or_else(|| {
                NameConstraintsError::UnknownGeneralName(u8::try_from(tag).unwrap_or(u8::MAX))
            })?;
        // directoryName is explicitly tagged: content is the DER of the Name
        if kind == GeneralNameKind::DirectoryName {
            base.header.assert_constructed()?;
        }
        self.rem = rem;
        self.index += 1;
        Ok(Subtree {
            index: self.index,
            kind,
            value: base.data,
        })
    }
}

impl<'a> Iterator for GeneralSubtrees<'a> {
    type Item = Result<Subtree<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rem.is_empty() {
            return None;
        }
        let res = self.parse_subtree();
        if res.is_err() {
            self.rem = &[];
        }
        Some(res)
    }
}

/// Decoded (but not yet validated) `NameConstraints` extension value
#[derive(Clone, Debug)]
pub struct NameConstraintsDecoder<'a> {
    pub permitted: GeneralSubtrees<'a>,
    pub excluded: GeneralSubtrees<'a>,
}

impl<'a> NameConstraintsDecoder<'a> {
    /// Parse the outer structure of a DER-encoded `NameConstraints`.
    ///
    /// Subtrees are decoded lazily, when iterating.
    pub fn new(der: &'a [u8]) -> Result<Self> {
        let (rem, nc) = Any::from_der(der)?;
        if !rem.is_empty() {
            return Err(NameConstraintsError::Der(asn1_rs::Error::InvalidLength));
        }
        nc.header.assert_tag(Tag::Sequence)?;
        // at least one of the lists must be present
        if nc.data.is_empty() {
            return Err(NameConstraintsError::Der(asn1_rs::Error::InvalidLength));
        }
        let mut permitted = None;
        let mut excluded = None;
        let mut i = nc.data;
        while !i.is_empty() {
            let (rem, any) = Any::from_der(i)?;
            any.header.assert_class(Class::ContextSpecific)?;
            any.header.assert_constructed()?;
            // GeneralSubtrees ::= SEQUENCE SIZE (1..MAX)
            if any.data.is_empty() {
                return Err(NameConstraintsError::Der(asn1_rs::Error::InvalidLength));
            }
            match any.header.tag().0 {
                0 if permitted.is_none() && excluded.is_none() => {
                    permitted = Some(GeneralSubtrees::new(any.data))
                }
                1 if excluded.is_none() => excluded = Some(GeneralSubtrees::new(any.data)),
                _ => return Err(NameConstraintsError::Der(asn1_rs::Error::BerValueError)),
            }
            i = rem;
        }
        Ok(NameConstraintsDecoder {
            permitted: permitted.unwrap_or(GeneralSubtrees::new(&[])),
            excluded: excluded.unwrap_or(GeneralSubtrees::new(&[])),
        })
    }
}

fn write_tlv(
    class: Class,
    constructed: bool,
    tag: Tag,
    content: &[u8],
    out: &mut Vec<u8>,
) -> Result<()> {
    let header = Header::new(class, constructed, tag, Length::Definite(content.len()));
    let header = header
        .to_der_vec()
        .map_err(|_| NameConstraintsError::DerEncoding)?;
    out.try_reserve(header.len() + content.len())?;
    out.extend_from_slice(&header);
    out.extend_from_slice(content);
    Ok(())
}

/// Encoder for the content of a `GeneralSubtrees`
#[derive(Debug, Default)]
pub struct GeneralSubtreesEncoder {
    content: Vec<u8>,
}

impl GeneralSubtreesEncoder {
    pub fn new() -> Self {
        GeneralSubtreesEncoder::default()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Concatenated `GeneralSubtree` elements
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}

impl SubtreeEmitter for GeneralSubtreesEncoder {
    fn emit(&mut self, kind: GeneralNameKind, value: &[u8]) -> Result<()> {
        let mut base = Vec::new();
        let tag = Tag(u32::from(kind.tag()));
        match kind {
            GeneralNameKind::DirectoryName => {
                write_tlv(Class::ContextSpecific, true, tag, value, &mut base)?
            }
            GeneralNameKind::RFC822Name
            | GeneralNameKind::DNSName
            | GeneralNameKind::URI
            | GeneralNameKind::IPAddress => {
                write_tlv(Class::ContextSpecific, false, tag, value, &mut base)?
            }
            _ => return Err(NameConstraintsError::UnknownGeneralName(kind.tag())),
        }
        write_tlv(Class::Universal, true, Tag::Sequence, &base, &mut self.content)
    }
}

impl NameConstraints {
    /// Decode a DER-encoded `NameConstraints` extension value into a new set
    pub fn from_der(der: &[u8]) -> Result<NameConstraints> {
        let mut decoder = NameConstraintsDecoder::new(der)?;
        let mut nc = NameConstraints::new();
        nc.import_permitted(&mut decoder.permitted)?;
        nc.import_excluded(&mut decoder.excluded)?;
        Ok(nc)
    }

    /// Decode a DER-encoded `NameConstraints` extension value into this set.
    ///
    /// With `ImportMode::Replace`, the set is only modified if decoding succeeds. With
    /// `ImportMode::Append`, decoded constraints are merged into the set (see
    /// [`NameConstraints::merge`]). If merging fails the set is left empty.
    pub fn import_der(&mut self, der: &[u8], mode: ImportMode) -> Result<()> {
        let decoded = NameConstraints::from_der(der)?;
        if mode == ImportMode::Append && !self.is_empty() {
            let current = std::mem::take(self);
            *self = current.merge(decoded)?;
        } else {
            *self = decoded;
        }
        Ok(())
    }

    /// Encode the set as a DER `NameConstraints` extension value.
    ///
    /// Empty lists are omitted. Encoding a set with no constraints at all is an error
    /// (`IllegalParameter`), since the extension must not be empty.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(NameConstraintsError::IllegalParameter);
        }
        let mut content = Vec::new();
        if !self.permitted.is_empty() {
            let mut encoder = GeneralSubtreesEncoder::new();
            self.export_permitted(&mut encoder)?;
            let subtrees = encoder.into_content();
            write_tlv(Class::ContextSpecific, true, Tag(0), &subtrees, &mut content)?;
        }
        if !self.excluded.is_empty() {
            let mut encoder = GeneralSubtreesEncoder::new();
            self.export_excluded(&mut encoder)?;
            let subtrees = encoder.into_content();
            write_tlv(Class::ContextSpecific, true, Tag(1), &subtrees, &mut content)?;
        }
        let mut out = Vec::new();
        write_tlv(Class::Universal, true, Tag::Sequence, &content, &mut out)?;
        Ok(out)
    }
}
