#![forbid(unsafe_code)]

//! Modal registry and prompt resolution for FrankenTUI front-ends.
//!
//! - [`ModalStore`]: ordered, keyed, observable collection of open modals.
//! - [`ModalManager`]: validates variant names, merges per-variant default
//!   settings, and exposes [`modal`](ModalManager::modal) (fire-and-forget)
//!   and [`prompt`](ModalManager::prompt) (awaitable).
//! - [`ModalContainer`]: the subscription-backed read side a renderer
//!   binds to.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and runs on the UI
//! thread. Store mutations notify listeners synchronously; a [`Prompt`]
//! suspends its caller until the matching entry is closed.
//!
//! # Example
//!
//! ```
//! use ftui_modal::{ModalContainer, ModalManager, ModalManagerConfig, ModalOptions};
//! use futures::executor::block_on;
//! use serde_json::json;
//!
//! let manager = ModalManager::<&str, &str>::new(
//!     ModalManagerConfig::new().variant("default", "dialog"),
//! )
//! .unwrap();
//! let mut container = ModalContainer::new(manager.store().clone());
//! container.mount();
//!
//! let prompt = manager.prompt("confirm-delete", ModalOptions::new()).unwrap();
//!
//! // The user presses "OK" in the rendered dialog.
//! container.views()[0].close().confirm(json!({ "id": 7 }));
//!
//! let result = block_on(prompt);
//! assert!(result.is_confirm);
//! assert_eq!(result.data, json!({ "id": 7 }));
//! assert!(container.is_empty());
//! ```

pub mod config;
pub mod container;
pub mod error;
mod handle;
pub mod key;
pub mod manager;
pub mod mapping;
pub mod prompt;
pub mod store;
mod subscription;

pub use config::{ModalManagerConfig, ModalPolicy};
pub use container::{ModalContainer, ModalView, RenderContent, RenderVariant};
pub use error::{ModalError, Result};
pub use handle::{CloseHandle, Closer};
pub use key::ModalKey;
pub use manager::{FALLBACK_VARIANT, ModalManager, ModalOptions, create_modal_manager};
pub use mapping::Mapping;
pub use prompt::{Prompt, PromptResult, Resolver};
pub use store::{EntryPatch, ModalEntry, ModalStore, OpenOptions};
pub use subscription::Subscription;
