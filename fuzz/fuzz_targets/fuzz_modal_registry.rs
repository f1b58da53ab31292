#![no_main]

//! Drive a modal store with arbitrary operation sequences and check the
//! registry invariants after every step.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use arbitrary::Arbitrary;
use ftui_modal::{EntryPatch, Mapping, ModalKey, ModalStore, OpenOptions, PromptResult, Resolver};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    Open { content: u8 },
    OpenPrompt { content: u8 },
    Close { pick: u8 },
    Confirm { pick: u8, data: u16 },
    Update { pick: u8, value: u8 },
    CloseAll,
    Subscribe,
    Unsubscribe,
}

fn pick(keys: &[ModalKey], idx: u8) -> Option<ModalKey> {
    if keys.is_empty() {
        None
    } else {
        Some(keys[idx as usize % keys.len()].clone())
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let store: ModalStore<u8, u8> = ModalStore::new();
    let mut issued: Vec<ModalKey> = Vec::new();
    let mut subs = Vec::new();
    let notified = Rc::new(Cell::new(0usize));
    let settled = Rc::new(RefCell::new(Vec::<ModalKey>::new()));
    let mut prompts = 0usize;

    for op in ops.into_iter().take(256) {
        let before = store.registry();
        match op {
            Op::Open { content } => {
                let key = store.open(content, OpenOptions::new(0));
                assert!(!before.iter().any(|e| e.key() == &key));
                issued.push(key);
                assert_eq!(store.len(), before.len() + 1);
            }
            Op::OpenPrompt { content } => {
                let settled = Rc::clone(&settled);
                let slot = Rc::new(RefCell::new(None::<ModalKey>));
                let s = Rc::clone(&slot);
                let key = store.open(
                    content,
                    OpenOptions::new(1).resolver(Resolver::new(move |_| {
                        if let Some(k) = s.borrow().clone() {
                            settled.borrow_mut().push(k);
                        }
                    })),
                );
                *slot.borrow_mut() = Some(key.clone());
                issued.push(key);
                prompts += 1;
            }
            Op::Close { pick: idx } => {
                if let Some(key) = pick(&issued, idx) {
                    let present = store.contains(&key);
                    assert_eq!(store.close(&key), present);
                    assert!(!store.contains(&key));
                    let expected = before.len() - usize::from(present);
                    assert_eq!(store.len(), expected);
                }
            }
            Op::Confirm { pick: idx, data } => {
                if let Some(key) = pick(&issued, idx) {
                    store.dismiss(&key, PromptResult::confirmed(data));
                    assert!(!store.contains(&key));
                }
            }
            Op::Update { pick: idx, value } => {
                if let Some(key) = pick(&issued, idx) {
                    let present = store.contains(&key);
                    let patch = EntryPatch::new().settings(Mapping::new().with("v", value));
                    assert_eq!(store.update(&key, patch), present);
                    let after: Vec<_> = store.registry().iter().map(|e| e.key().clone()).collect();
                    let prior: Vec<_> = before.iter().map(|e| e.key().clone()).collect();
                    assert_eq!(after, prior);
                }
            }
            Op::CloseAll => {
                assert_eq!(store.close_all(), before.len());
                assert!(store.is_empty());
            }
            Op::Subscribe => {
                let n = Rc::clone(&notified);
                subs.push(store.subscribe(move |_| n.set(n.get() + 1)));
            }
            Op::Unsubscribe => {
                subs.pop();
            }
        }

        // Order is preserved for survivors.
        let now: Vec<_> = store.registry().iter().map(|e| e.key().clone()).collect();
        let survivors: Vec<_> = before
            .iter()
            .map(|e| e.key().clone())
            .filter(|k| now.contains(k))
            .collect();
        assert_eq!(&now[..survivors.len()], &survivors[..]);
        assert_eq!(store.listener_count(), subs.len());
    }

    // Every prompt settles at most once.
    let settled = settled.borrow();
    assert!(settled.len() <= prompts);
    for (i, k) in settled.iter().enumerate() {
        assert!(!settled[i + 1..].contains(k));
    }
});
