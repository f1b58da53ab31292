#![forbid(unsafe_code)]

//! Bound close capabilities handed out by the store.
//!
//! Both handle types hold only a weak reference to the store: once the store
//! is gone, closing becomes a no-op returning `false`. A handle closes only
//! the entry it was issued for, never a later entry under the same key.

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::key::ModalKey;
use crate::prompt::PromptResult;

pub(crate) type DismissFn = Rc<dyn Fn(&ModalKey, PromptResult) -> bool>;

/// The `close(is_confirm?, data?)` capability given to variant and content
/// components.
///
/// Every method routes through the store's dismissal path, so for prompt
/// entries the pending future is always settled.
#[derive(Clone)]
pub struct CloseHandle {
    key: ModalKey,
    dismiss: DismissFn,
}

impl CloseHandle {
    pub(crate) fn new(key: ModalKey, dismiss: DismissFn) -> Self {
        Self { key, dismiss }
    }

    #[must_use]
    pub fn key(&self) -> &ModalKey {
        &self.key
    }

    /// Close without confirming. Prompts settle with `{false, null}`.
    pub fn close(&self) -> bool {
        (self.dismiss)(&self.key, PromptResult::cancelled())
    }

    /// Close and confirm with a payload.
    pub fn confirm(&self, data: impl Into<Value>) -> bool {
        (self.dismiss)(&self.key, PromptResult::confirmed(data))
    }

    /// General form of `close(is_confirm, data)`.
    ///
    /// Returns `true` if this call removed the entry.
    pub fn close_with(&self, is_confirm: bool, data: Option<Value>) -> bool {
        (self.dismiss)(&self.key, PromptResult::from_close(is_confirm, data))
    }
}

impl fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseHandle").field("key", &self.key).finish()
    }
}

/// Zero-argument closer returned by `ModalManager::modal`.
///
/// Idempotent: only the first effective call removes the entry.
#[derive(Clone, Debug)]
pub struct Closer {
    handle: CloseHandle,
}

impl Closer {
    pub(crate) fn new(handle: CloseHandle) -> Self {
        Self { handle }
    }

    #[must_use]
    pub fn key(&self) -> &ModalKey {
        self.handle.key()
    }

    /// Close the entry. Returns `false` if it was already gone.
    pub fn close(&self) -> bool {
        self.handle.close()
    }
}
