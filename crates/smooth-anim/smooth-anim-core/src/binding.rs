//! Static attachment bindings.
//!
//! For every registered animation the table keeps an ordered map
//! `slot name → (provider reference, transform)`. Rows are indexed by
//! [`AnimIndex`], so the table is aligned with the registry.

use indexmap::IndexMap;

use crate::config::AnimationEntry;
use crate::error::ConfigError;
use crate::ids::AnimIndex;
use crate::registry::AnimationRegistry;
use crate::transform::Transform;

/// One binding of an animation to a slot.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentBinding {
    pub animation: String,
    pub slot: String,
    pub provider: String,
    pub transform: Transform,
}

/// Bindings of one animation, in configuration order.
pub type SlotBindings = IndexMap<String, AttachmentBinding>;

#[derive(Default, Debug)]
pub struct BindingTable {
    rows: Vec<SlotBindings>,
}

impl BindingTable {
    /// Flatten the attachment lists of `entries`. `entries` must be the list
    /// the registry was built from.
    pub fn from_entries(
        registry: &AnimationRegistry,
        entries: &[AnimationEntry],
    ) -> Result<Self, ConfigError> {
        let mut rows = vec![SlotBindings::new(); registry.len()];

        for entry in entries {
            let identifier = entry.identifier.trim();
            let Some(index) = registry.index_of(identifier) else {
                // Registry construction already rejected this entry.
                continue;
            };
            let row = &mut rows[index.0];

            for (position, att) in entry.attachments.iter().enumerate() {
                let slot = att.slot_name.trim();
                if slot.is_empty() {
                    return Err(ConfigError::MissingBindingField {
                        animation: identifier.to_string(),
                        position,
                        field: "slotName",
                    });
                }
                let provider = att.provider_reference.trim();
                if provider.is_empty() {
                    return Err(ConfigError::MissingBindingField {
                        animation: identifier.to_string(),
                        position,
                        field: "providerReference",
                    });
                }
                if row.contains_key(slot) {
                    return Err(ConfigError::DuplicateSlot {
                        animation: identifier.to_string(),
                        slot: slot.to_string(),
                    });
                }
                row.insert(
                    slot.to_string(),
                    AttachmentBinding {
                        animation: identifier.to_string(),
                        slot: slot.to_string(),
                        provider: provider.to_string(),
                        transform: att.transform.clone(),
                    },
                );
            }
        }

        Ok(Self { rows })
    }

    /// Bindings for `index`; `None` if the index is not registered.
    pub fn bindings(&self, index: AnimIndex) -> Option<&SlotBindings> {
        self.rows.get(index.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All bindings of all animations, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (AnimIndex, &AttachmentBinding)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.values().map(move |b| (AnimIndex(i), b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttachmentEntry;

    fn entries() -> Vec<AnimationEntry> {
        vec![
            AnimationEntry::new("draw", "bow-draw")
                .with_attachment(AttachmentEntry::new("Arrow", "arrow"))
                .with_attachment(AttachmentEntry::new("Quiver", "quiver")),
            AnimationEntry::new("aim", "bow-aim"),
        ]
    }

    #[test]
    fn rows_align_with_registry() {
        let e = entries();
        let reg = AnimationRegistry::from_entries(&e).unwrap();
        let table = BindingTable::from_entries(&reg, &e).expect("table");
        assert_eq!(table.len(), 2);

        let draw = table.bindings(AnimIndex(0)).unwrap();
        let slots: Vec<_> = draw.keys().cloned().collect();
        assert_eq!(slots, vec!["Arrow".to_string(), "Quiver".to_string()]);
        assert_eq!(draw["Arrow"].provider, "arrow");
        assert_eq!(draw["Arrow"].animation, "draw");

        assert!(table.bindings(AnimIndex(1)).unwrap().is_empty());
        assert!(table.bindings(AnimIndex(2)).is_none());
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn duplicate_slot_is_fatal() {
        let mut e = entries();
        e[0].attachments.push(AttachmentEntry::new("Arrow", "other"));
        let reg = AnimationRegistry::from_entries(&e).unwrap();
        let err = BindingTable::from_entries(&reg, &e).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateSlot {
                animation: "draw".into(),
                slot: "Arrow".into()
            }
        );
    }

    #[test]
    fn same_slot_in_different_animations_is_fine() {
        let mut e = entries();
        e[1].attachments.push(AttachmentEntry::new("Arrow", "arrow"));
        let reg = AnimationRegistry::from_entries(&e).unwrap();
        assert!(BindingTable::from_entries(&reg, &e).is_ok());
    }

    #[test]
    fn empty_provider_is_fatal() {
        let mut e = entries();
        e[1].attachments.push(AttachmentEntry::new("Arrow", " "));
        let reg = AnimationRegistry::from_entries(&e).unwrap();
        let err = BindingTable::from_entries(&reg, &e).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingBindingField { field: "providerReference", position: 0, .. }
        ));
    }
}
