use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use gazelink_shared::SdkState;

static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(0);

/// Token addressing one registered consumer slot.
///
/// Tokens are generational and scoped to the registry that minted them:
/// removing a consumer bumps its slot's generation, and a token presented to
/// a different registry (a handle that crossed an implementation swap) misses
/// harmlessly instead of freeing someone else's registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerToken {
    registry: u32,
    index: u32,
    generation: u32,
}

/// Shared flag a consumer handle trips when its owner is done with the
/// registration. Trippable from any thread; acted on by the main context
/// during the next sweep.
#[derive(Debug, Default)]
pub struct ReleaseFlag {
    released: AtomicBool,
}

impl ReleaseFlag {
    pub fn release(&self) {
        self.released.store(true, Ordering::Release);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

/// One registered consumer: the capabilities it requires and the flag its
/// handle trips on release. Entries move between implementations whole during
/// a swap, keeping live handles valid.
pub struct ConsumerEntry {
    pub(crate) required: SdkState,
    pub(crate) flag: Arc<ReleaseFlag>,
}

struct Slot {
    generation: u32,
    entry: Option<ConsumerEntry>,
}

/// Arena of registered consumers.
///
/// Computing the required union doubles as the sweep: any entry whose release
/// flag has been tripped is dropped on the way through.
pub struct ConsumerRegistry {
    id: u32,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ConsumerRegistry {
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Registers a consumer requiring `required`, returning its token and the
    /// release flag to hand to the owner.
    pub fn insert(&mut self, required: SdkState) -> (ConsumerToken, Arc<ReleaseFlag>) {
        let flag = Arc::new(ReleaseFlag::default());
        let token = self.insert_entry(ConsumerEntry {
            required,
            flag: Arc::clone(&flag),
        });
        (token, flag)
    }

    /// Re-registers an entry drained from another registry.
    pub fn insert_entry(&mut self, entry: ConsumerEntry) -> ConsumerToken {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            ConsumerToken {
                registry: self.id,
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            ConsumerToken {
                registry: self.id,
                index,
                generation: 0,
            }
        }
    }

    /// Removes the consumer addressed by `token`. Returns false when the
    /// token is stale (already removed, or minted by another registry).
    pub fn remove(&mut self, token: ConsumerToken) -> bool {
        if token.registry != self.id {
            return false;
        }
        let Some(slot) = self.slots.get_mut(token.index as usize) else {
            return false;
        };
        if slot.generation != token.generation || slot.entry.is_none() {
            return false;
        }
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(token.index);
        true
    }

    /// True when some entry's release flag has been tripped and the slot is
    /// still waiting for a sweep.
    pub fn has_released(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(&slot.entry, Some(entry) if entry.flag.is_released()))
    }

    /// Union of the capabilities required by all live consumers. Sweeps
    /// released entries as a side effect.
    pub fn required_union(&mut self) -> SdkState {
        let mut union = SdkState::empty();
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            let Some(entry) = slot.entry.as_ref() else {
                continue;
            };
            if entry.flag.is_released() {
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                continue;
            }
            union |= entry.required;
        }
        union
    }

    /// Empties the registry, returning every entry that is still live.
    /// Released entries are dropped on the way out.
    pub fn drain_live(&mut self) -> Vec<ConsumerEntry> {
        let mut live = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(entry) = slot.entry.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                if !entry.flag.is_released() {
                    live.push(entry);
                }
            }
        }
        live
    }
}

impl Default for ConsumerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
