//! Strip passes and base-relative diffing.
//!
//! Order matters and is fixed: strip volatile fields, strip attribute
//! identifiers and spawn-bonus modifiers, then prune fields equal to the
//! base. Both strip passes are idempotent and mutate in place; they only
//! ever run on freshly captured trees that nothing else holds.

use stackstore_kernel::{REMOVABLE_KEYS, fields};
use stackstore_tag::Compound;

/// Marker key the stacking plugin writes into an entity's custom data to
/// flag it as carrying stacked data. Never part of a diff.
pub const STACKED_DATA_MARKER: &str = "stackstore:stacked_entity_data";

/// Modifier name the runtime attaches with a random value at spawn time.
/// Never equal between two captures, so it is dropped outright.
pub const RANDOM_SPAWN_BONUS: &str = "Random spawn bonus";

/// Remove the host-defined volatile fields plus the stacked-data marker
/// inside the custom data compound.
pub fn strip_volatile(tag: &mut Compound) {
    for key in REMOVABLE_KEYS {
        tag.remove(key);
    }
    if let Some(custom) = tag.get_compound_mut(fields::CUSTOM_DATA) {
        custom.remove(STACKED_DATA_MARKER);
    }
}

/// Strip unique identifiers from every attribute and every surviving
/// modifier, and drop spawn-bonus modifiers entirely.
///
/// Removal shifts later modifiers down; the index is only advanced when
/// nothing was removed so consecutive spawn-bonus entries are all caught.
pub fn strip_attribute_ids(tag: &mut Compound) {
    let Some(attributes) = tag.get_list_mut(fields::ATTRIBUTES) else {
        return;
    };
    for attribute in attributes.iter_mut() {
        let Some(attribute) = attribute.as_compound_mut() else {
            continue;
        };
        attribute.remove(fields::UUID);
        let Some(modifiers) = attribute.get_list_mut(fields::MODIFIERS) else {
            continue;
        };
        let mut i = 0;
        while i < modifiers.len() {
            let Some(modifier) = modifiers[i].as_compound_mut() else {
                i += 1;
                continue;
            };
            if modifier.get_str(fields::NAME) == Some(RANDOM_SPAWN_BONUS) {
                modifiers.remove(i);
            } else {
                modifier.remove(fields::UUID);
                i += 1;
            }
        }
    }
}

/// Prune every candidate field whose value deeply equals the base's value
/// under the same name. What remains is the diff entry; a candidate
/// identical to the base becomes the empty compound.
pub fn diff_against_base(base: &Compound, candidate: &mut Compound) {
    for key in candidate.key_names() {
        if base.get(&key).is_some() && base.get(&key) == candidate.get(&key) {
            candidate.remove(&key);
        }
    }
}
