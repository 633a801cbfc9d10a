use crate::cidr::prefix_from_mask;
use crate::constraints::NameConstraints;
use crate::general_name::{GeneralNameKind, GeneralNameValue};
use std::collections::HashSet;

/// Trait for validating item (for ex. validate a name constraints set)
///
/// # Examples
///
/// Using callbacks:
///
/// ```
/// use x509_name_constraints::NameConstraints;
/// use x509_name_constraints::validate::Validate;
///
/// fn validate_constraints(nc: &NameConstraints) -> Result<(), &'static str> {
///     // validate and print warnings and errors to stderr
///     let ok = nc.validate(
///         |msg| {
///             eprintln!("  [W] {}", msg);
///         },
///         |msg| {
///             eprintln!("  [E] {}", msg);
///         },
///     );
///     if ok {
///         Ok(())
///     } else {
///         Err("validation failed")
///     }
/// }
/// ```
///
/// Collecting warnings and errors to `Vec`:
///
/// ```
/// use x509_name_constraints::{GeneralNameKind, NameConstraints};
/// use x509_name_constraints::validate::Validate;
///
/// let mut nc = NameConstraints::new();
/// nc.add_permitted(GeneralNameKind::URI, b"https://example.com").unwrap();
/// let (ok, warnings, errors) = nc.validate_to_vec();
/// assert!(ok);
/// assert_eq!(warnings.len(), 1);
/// assert!(errors.is_empty());
/// ```
pub trait Validate {
    /// Attempts to validate current item.
    ///
    /// Returns `true` if item was validated.
    ///
    /// Call `warn()` if a non-fatal error was encountered, and `err()`
    /// if the error is fatal. These functions receive a description of the error.
    fn validate<W, E>(&self, warn: W, err: E) -> bool
    where
        W: FnMut(&str),
        E: FnMut(&str);

    /// Attempts to validate current item, storing warning and errors in `Vec`.
    ///
    /// Returns the validation result (`true` if validated), the list of warnings,
    /// and the list of errors.
    fn validate_to_vec(&self) -> (bool, Vec<String>, Vec<String>) {
        let mut warn_list = Vec::new();
        let mut err_list = Vec::new();
        let res = self.validate(
            |s| warn_list.push(s.to_owned()),
            |s| err_list.push(s.to_owned()),
        );
        (res, warn_list, err_list)
    }
}

impl Validate for NameConstraints {
    fn validate<W, E>(&self, mut warn: W, mut err: E) -> bool
    where
        W: FnMut(&str),
        E: FnMut(&str),
    {
        let mut res = true;
        let lists = [("permitted", self.permitted()), ("excluded", self.excluded())];
        for (name, list) in lists.iter() {
            let mut seen = HashSet::new();
            for value in list.iter() {
                if !seen.insert(value) {
                    warn(&format!("Duplicate {} entry {}", name, value));
                }
                if let GeneralNameValue::IPAddress(cidr) = value {
                    // entries are normalized when inserted
                    let bytes = cidr.as_bytes();
                    let width = bytes.len() / 2;
                    let masked = (0..width).all(|i| bytes[i] & !bytes[width + i] == 0);
                    if prefix_from_mask(cidr.mask()).is_err() || !masked {
                        err(&format!("Invalid {} IP range {:02x?}", name, bytes));
                        res = false;
                    }
                }
            }
        }
        for value in self.permitted() {
            match value.kind() {
                GeneralNameKind::DirectoryName | GeneralNameKind::URI => warn(&format!(
                    "Permitted {} entries cannot be matched and are ignored",
                    value.kind()
                )),
                GeneralNameKind::DNSName | GeneralNameKind::RFC822Name
                    if value.as_bytes().is_empty() =>
                {
                    warn(&format!("Empty permitted {} entry is ignored", value.kind()))
                }
                _ => (),
            }
            if self.excluded().contains(value) {
                warn(&format!("Entry {} is both permitted and excluded", value));
            }
        }
        res
    }
}
