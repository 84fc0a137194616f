//! Attachment resolution against the live equipment context.
//!
//! Provider names in the binding table are looked up once, when the resolver is
//! built, so an unknown name fails construction instead of a later action.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::binding::BindingTable;
use crate::error::ConfigError;
use crate::ids::AnimIndex;
use crate::storage::ItemStack;
use crate::transform::Transform;

/// Yields the item to render at a slot, given the actor's equipment.
///
/// `A` is the host's actor/equipment context. Closures `Fn(&A) -> Option<ItemStack>`
/// implement the trait.
pub trait EquipmentProvider<A: ?Sized>: Send + Sync {
    fn resolve(&self, actor: &A) -> Option<ItemStack>;
}

impl<A: ?Sized, F> EquipmentProvider<A> for F
where
    F: Fn(&A) -> Option<ItemStack> + Send + Sync,
{
    fn resolve(&self, actor: &A) -> Option<ItemStack> {
        self(actor)
    }
}

/// Named providers supplied by the host environment.
pub struct ProviderRegistry<A: ?Sized> {
    providers: HashMap<String, Arc<dyn EquipmentProvider<A>>>,
}

impl<A: ?Sized> Default for ProviderRegistry<A> {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }
}

impl<A: ?Sized> ProviderRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one with the same name.
    pub fn register<P>(&mut self, name: impl Into<String>, provider: P) -> &mut Self
    where
        P: EquipmentProvider<A> + 'static,
    {
        self.providers.insert(name.into(), Arc::new(provider));
        self
    }

    pub fn with<P>(mut self, name: impl Into<String>, provider: P) -> Self
    where
        P: EquipmentProvider<A> + 'static,
    {
        self.register(name, provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn EquipmentProvider<A>>> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl<A: ?Sized> fmt::Debug for ProviderRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("names", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One concrete attachment ready for the presentation sink.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAttachment {
    pub slot: String,
    pub item: ItemStack,
    pub transform: Transform,
}

struct BoundSlot<A: ?Sized> {
    slot: String,
    provider: Arc<dyn EquipmentProvider<A>>,
    transform: Transform,
}

pub struct AttachmentResolver<A: ?Sized> {
    rows: Vec<Vec<BoundSlot<A>>>,
}

impl<A: ?Sized> AttachmentResolver<A> {
    pub fn new(table: &BindingTable, providers: &ProviderRegistry<A>) -> Result<Self, ConfigError> {
        let mut rows: Vec<Vec<BoundSlot<A>>> = Vec::with_capacity(table.len());
        for i in 0..table.len() {
            let mut row = Vec::new();
            for binding in table.bindings(AnimIndex(i)).into_iter().flat_map(|b| b.values()) {
                let provider = providers.get(&binding.provider).ok_or_else(|| {
                    ConfigError::UnknownProvider {
                        animation: binding.animation.clone(),
                        slot: binding.slot.clone(),
                        provider: binding.provider.clone(),
                    }
                })?;
                row.push(BoundSlot {
                    slot: binding.slot.clone(),
                    provider: Arc::clone(provider),
                    transform: binding.transform.clone(),
                });
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Resolver with no animations, used when the system is disabled.
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Ask each bound provider for its item. Slots whose provider yields
    /// nothing are left out. Unknown indices resolve to nothing.
    pub fn resolve_attachments(&self, index: AnimIndex, actor: &A) -> Vec<ResolvedAttachment> {
        let Some(row) = self.rows.get(index.0) else {
            return Vec::new();
        };
        row.iter()
            .filter_map(|bound| {
                bound.provider.resolve(actor).map(|item| ResolvedAttachment {
                    slot: bound.slot.clone(),
                    item,
                    transform: bound.transform.clone(),
                })
            })
            .collect()
    }

    /// Number of bound slots for `index`.
    pub fn slot_count(&self, index: AnimIndex) -> usize {
        self.rows.get(index.0).map_or(0, Vec::len)
    }
}

impl<A: ?Sized> fmt::Debug for AttachmentResolver<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<Vec<&str>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|b| b.slot.as_str()).collect())
            .collect();
        f.debug_struct("AttachmentResolver").field("slots", &slots).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnimationEntry, AttachmentEntry};
    use crate::registry::AnimationRegistry;

    struct Actor {
        arrows: u32,
    }

    struct ArrowProvider;

    impl EquipmentProvider<Actor> for ArrowProvider {
        fn resolve(&self, actor: &Actor) -> Option<ItemStack> {
            (actor.arrows > 0).then(|| ItemStack::new("arrow-flint").with_quantity(actor.arrows))
        }
    }

    fn table() -> BindingTable {
        let e = vec![
            AnimationEntry::new("draw", "bow-draw")
                .with_attachment(AttachmentEntry::new("Arrow", "arrow"))
                .with_attachment(AttachmentEntry::new("Charm", "charm")),
            AnimationEntry::new("aim", "bow-aim"),
        ];
        let reg = AnimationRegistry::from_entries(&e).unwrap();
        BindingTable::from_entries(&reg, &e).unwrap()
    }

    fn providers() -> ProviderRegistry<Actor> {
        ProviderRegistry::new()
            .with("arrow", ArrowProvider)
            .with("charm", |_: &Actor| -> Option<ItemStack> { None })
    }

    #[test]
    fn unknown_provider_fails_fast() {
        let only_arrow = ProviderRegistry::new().with("arrow", ArrowProvider);
        let err = AttachmentResolver::new(&table(), &only_arrow).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownProvider {
                animation: "draw".into(),
                slot: "Charm".into(),
                provider: "charm".into()
            }
        );
    }

    #[test]
    fn empty_provider_results_are_skipped() {
        let resolver = AttachmentResolver::new(&table(), &providers()).expect("resolver");
        assert_eq!(resolver.slot_count(AnimIndex(0)), 2);

        let got = resolver.resolve_attachments(AnimIndex(0), &Actor { arrows: 12 });
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].slot, "Arrow");
        assert_eq!(got[0].item.code, "arrow-flint");
        assert_eq!(got[0].item.quantity, 12);

        assert!(resolver
            .resolve_attachments(AnimIndex(0), &Actor { arrows: 0 })
            .is_empty());
    }

    #[test]
    fn unknown_index_resolves_to_nothing() {
        let resolver = AttachmentResolver::new(&table(), &providers()).unwrap();
        assert!(resolver
            .resolve_attachments(AnimIndex(9), &Actor { arrows: 1 })
            .is_empty());
        assert!(AttachmentResolver::<Actor>::empty()
            .resolve_attachments(AnimIndex(0), &Actor { arrows: 1 })
            .is_empty());
    }
}
