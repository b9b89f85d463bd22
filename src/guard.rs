use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::EmbedError;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static SHARED: Rc<MountRegistry> = Rc::new(MountRegistry::new());
}

/// Identifies one controller to a [`MountRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    pub fn next() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Allows at most one mounted frame among the controllers sharing it.
///
/// The registry remembers which controller holds the mount, and only that
/// controller can release it.
#[derive(Debug, Default)]
pub struct MountRegistry {
    holder: Cell<Option<OwnerId>>,
}

impl MountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shared by every controller created on this thread without an
    /// explicit one.
    pub fn shared() -> Rc<Self> {
        SHARED.with(Rc::clone)
    }

    pub fn is_mounted(&self) -> bool {
        self.holder.get().is_some()
    }

    pub fn holder(&self) -> Option<OwnerId> {
        self.holder.get()
    }

    pub fn ensure_available(&self) -> Result<(), EmbedError> {
        if self.is_mounted() {
            return Err(EmbedError::AlreadyMounted);
        }
        Ok(())
    }

    pub fn acquire(&self, owner: OwnerId) -> Result<(), EmbedError> {
        self.ensure_available()?;
        self.holder.set(Some(owner));
        Ok(())
    }

    /// Releases the mount if `owner` holds it. Returns whether it did.
    pub fn release(&self, owner: OwnerId) -> bool {
        if self.holder.get() == Some(owner) {
            self.holder.set(None);
            return true;
        }
        false
    }
}
