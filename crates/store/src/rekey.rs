//! Identity re-keying after reconstruction.
//!
//! Attribute and modifier identifiers are stripped before diffing (they are
//! never equal across two captures and would make every snapshot fully
//! "different"). The runtime still requires valid, distinct identifiers on
//! every attribute and modifier, so reconstruction assigns fresh ones.

use stackstore_kernel::fields;
use stackstore_tag::Compound;
use uuid::Uuid;

/// Assign a fresh random identifier to every attribute and every modifier.
///
/// An attribute left with an empty modifier list has the list field removed
/// outright; the runtime treats absence, not emptiness, as "no modifiers".
pub fn reassign_ids(tag: &mut Compound) {
    let Some(attributes) = tag.get_list_mut(fields::ATTRIBUTES) else {
        return;
    };
    for attribute in attributes.iter_mut() {
        let Some(attribute) = attribute.as_compound_mut() else {
            continue;
        };
        attribute.insert(fields::UUID, Uuid::new_v4().to_string());

        let mut list_is_empty = false;
        if let Some(modifiers) = attribute.get_list_mut(fields::MODIFIERS) {
            for modifier in modifiers.iter_mut() {
                if let Some(modifier) = modifier.as_compound_mut() {
                    modifier.insert(fields::UUID, Uuid::new_v4().to_string());
                }
            }
            list_is_empty = modifiers.is_empty();
        }
        if list_is_empty {
            attribute.remove(fields::MODIFIERS);
        }
    }
}
