//! Import and export of name constraints lists
//!
//! The set is decoupled from the encoding of the `NameConstraints` extension: importing reads
//! `(kind, value)` pairs from a [`SubtreeIterator`], exporting writes them to a
//! [`SubtreeEmitter`]. The DER codec in [`crate::der`] implements both sides.

use crate::constraints::{push_entry, validate_entry, NameConstraints};
use crate::error::{NameConstraintsError, Result};
use crate::general_name::{GeneralNameKind, GeneralNameValue};
use log::debug;

/// A GeneralSubtree, as read from an encoded list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subtree<'a> {
    /// 1-based position of the subtree in its list
    pub index: usize,
    pub kind: GeneralNameKind,
    pub value: &'a [u8],
}

/// Source of subtrees for [`NameConstraints::import_permitted`] and
/// [`NameConstraints::import_excluded`].
///
/// Returns `Err(RequestedDataNotAvailable)` when no more subtrees are available. Any other error
/// aborts the import.
///
/// This is implemented for every iterator over `Result<Subtree>`.
pub trait SubtreeIterator<'a> {
    fn next_subtree(&mut self) -> Result<Subtree<'a>>;
}

impl<'a, I> SubtreeIterator<'a> for I
where
    I: Iterator<Item = Result<Subtree<'a>>>,
{
    fn next_subtree(&mut self) -> Result<Subtree<'a>> {
        self.next()
            .unwrap_or(Err(NameConstraintsError::RequestedDataNotAvailable))
    }
}

/// Sink for [`NameConstraints::export_permitted`] and [`NameConstraints::export_excluded`]
pub trait SubtreeEmitter {
    fn emit(&mut self, kind: GeneralNameKind, value: &[u8]) -> Result<()>;
}

impl SubtreeEmitter for Vec<GeneralNameValue> {
    fn emit(&mut self, kind: GeneralNameKind, value: &[u8]) -> Result<()> {
        push_entry(self, GeneralNameValue::new(kind, value)?)
    }
}

fn import_list<'a, I>(list: &mut Vec<GeneralNameValue>, iter: &mut I) -> Result<()>
where
    I: SubtreeIterator<'a> + ?Sized,
{
    loop {
        let subtree = match iter.next_subtree() {
            Ok(subtree) => subtree,
            Err(NameConstraintsError::RequestedDataNotAvailable) => return Ok(()),
            Err(e) => {
                debug!("name constraints import stopped: {}", e);
                return Err(e);
            }
        };
        if let Err(e) = validate_entry(subtree.kind, subtree.value) {
            debug!(
                "name constraints import stopped at subtree {} ({}): {}",
                subtree.index, subtree.kind, e
            );
            return Err(e);
        }
        push_entry(list, GeneralNameValue::new(subtree.kind, subtree.value)?)?;
    }
}

fn export_list<E>(list: &[GeneralNameValue], emitter: &mut E) -> Result<()>
where
    E: SubtreeEmitter + ?Sized,
{
    list.iter()
        .try_for_each(|v| emitter.emit(v.kind(), v.as_bytes()))
}

impl NameConstraints {
    /// Append all subtrees from `iter` to the permitted list.
    ///
    /// Entries are validated as in [`NameConstraints::add_permitted`]. If an error occurs, the
    /// entries imported so far are kept.
    pub fn import_permitted<'a, I>(&mut self, iter: &mut I) -> Result<()>
    where
        I: SubtreeIterator<'a> + ?Sized,
    {
        import_list(&mut self.permitted, iter)
    }

    /// Append all subtrees from `iter` to the excluded list.
    pub fn import_excluded<'a, I>(&mut self, iter: &mut I) -> Result<()>
    where
        I: SubtreeIterator<'a> + ?Sized,
    {
        import_list(&mut self.excluded, iter)
    }

    /// Emit all permitted entries, in order. Stops at the first emitter error.
    pub fn export_permitted<E>(&self, emitter: &mut E) -> Result<()>
    where
        E: SubtreeEmitter + ?Sized,
    {
        export_list(&self.permitted, emitter)
    }

    /// Emit all excluded entries, in order. Stops at the first emitter error.
    pub fn export_excluded<E>(&self, emitter: &mut E) -> Result<()>
    where
        E: SubtreeEmitter + ?Sized,
    {
        export_list(&self.excluded, emitter)
    }
}
