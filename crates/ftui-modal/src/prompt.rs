#![forbid(unsafe_code)]

//! One-shot resolution of prompt modals.
//!
//! A prompt pairs a registry entry with a [`Prompt`] future. The entry
//! carries a [`Resolver`]; the store fires it from its single dismissal
//! path, which settles the future.
//!
//! # Invariants
//!
//! 1. A [`Resolver`] runs its callback at most once, regardless of how many
//!    clones of it exist or how often `resolve` is called.
//! 2. A cancelling close always carries `Value::Null` as data.
//! 3. If the resolver is dropped without firing (e.g. the store itself was
//!    dropped), the [`Prompt`] settles as cancelled instead of hanging.
//!
//! # Failure Modes
//!
//! - A prompt whose entry is never closed stays pending forever. There is no
//!   timeout and no cancellation token.

use futures::channel::oneshot;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::error::Result;
use crate::key::ModalKey;

/// Outcome delivered to a prompt's caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptResult {
    /// Whether the user confirmed.
    pub is_confirm: bool,
    /// Payload; always `Null` when not confirmed.
    pub data: Value,
}

impl PromptResult {
    /// Confirmed with a payload.
    #[must_use]
    pub fn confirmed(data: impl Into<Value>) -> Self {
        Self {
            is_confirm: true,
            data: data.into(),
        }
    }

    /// Dismissed without confirmation.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            is_confirm: false,
            data: Value::Null,
        }
    }

    /// Build from `close(is_confirm, data)` arguments.
    ///
    /// Data passed alongside `is_confirm = false` is dropped.
    #[must_use]
    pub fn from_close(is_confirm: bool, data: Option<Value>) -> Self {
        if is_confirm {
            Self::confirmed(data.unwrap_or(Value::Null))
        } else {
            Self::cancelled()
        }
    }

    /// Decode the payload into a concrete type.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.data)?)
    }
}

type ResolveFn = Box<dyn FnOnce(PromptResult)>;

/// One-shot callback attached to prompt entries.
#[derive(Clone)]
pub struct Resolver {
    slot: Rc<RefCell<Option<ResolveFn>>>,
}

impl Resolver {
    /// Wrap a callback. It will run at most once.
    pub fn new(f: impl FnOnce(PromptResult) + 'static) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(Box::new(f)))),
        }
    }

    /// Fire the callback. Returns `false` if it already fired.
    pub fn resolve(&self, result: PromptResult) -> bool {
        // Take before calling so a re-entrant resolve sees an empty slot.
        let f = self.slot.borrow_mut().take();
        match f {
            Some(f) => {
                f(result);
                true
            }
            None => false,
        }
    }

    /// Whether the callback has already run.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Future returned by `ModalManager::prompt`.
///
/// Settles exactly once, when the associated entry is dismissed. The
/// settled result is kept: later `try_result` calls and polls through
/// `&mut Prompt` keep returning it.
#[must_use = "a prompt does nothing unless awaited or polled"]
pub struct Prompt {
    key: ModalKey,
    rx: oneshot::Receiver<PromptResult>,
    done: Option<PromptResult>,
}

impl Prompt {
    pub(crate) fn new(key: ModalKey, rx: oneshot::Receiver<PromptResult>) -> Self {
        Self { key, rx, done: None }
    }

    /// Key of the registry entry backing this prompt.
    #[must_use]
    pub fn key(&self) -> &ModalKey {
        &self.key
    }

    /// Non-blocking check. Returns `None` while the entry is still open.
    pub fn try_result(&mut self) -> Option<PromptResult> {
        if let Some(done) = &self.done {
            return Some(done.clone());
        }
        let settled = match self.rx.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(oneshot::Canceled) => PromptResult::cancelled(),
        };
        self.done = Some(settled.clone());
        Some(settled)
    }
}

impl Future for Prompt {
    type Output = PromptResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<PromptResult> {
        if let Some(done) = &self.done {
            return Poll::Ready(done.clone());
        }
        let settled = match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => result,
            Poll::Ready(Err(oneshot::Canceled)) => PromptResult::cancelled(),
            Poll::Pending => return Poll::Pending,
        };
        self.done = Some(settled.clone());
        Poll::Ready(settled)
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt").field("key", &self.key).finish()
    }
}

/// Create a resolver wired to a fresh oneshot channel.
pub(crate) fn channel() -> (Resolver, oneshot::Receiver<PromptResult>) {
    let (tx, rx) = oneshot::channel();
    let resolver = Resolver::new(move |result| {
        // Receiver gone means the caller stopped waiting.
        let _ = tx.send(result);
    });
    (resolver, rx)
}
