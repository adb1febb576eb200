//! On-disk names. Nothing here ever looks at a client-supplied filename.

use folio_core::{DerivativeSet, OutputFormat};
use folio_storage::storage_key;
use uuid::Uuid;

/// Fresh random identifier (UUID v4, 122 random bits) used as the filename
/// stem for a stored original and all of its derivatives.
pub fn new_identifier() -> Uuid {
    Uuid::new_v4()
}

/// `{identifier}.{ext}` for the transient stored original.
pub fn stored_original_filename(identifier: Uuid, extension: &str) -> String {
    format!("{}.{}", identifier, extension)
}

/// Keys for the five derivatives of `identifier` under `category`.
pub fn derivative_keys(category: &str, identifier: Uuid, format: OutputFormat) -> DerivativeSet {
    DerivativeSet::from_fn(|label| {
        storage_key(
            category,
            &format!("{}_{}.{}", identifier, label, format.extension()),
        )
    })
}
