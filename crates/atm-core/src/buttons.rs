//! Physical button slots and their bindings
//!
//! The kiosk has eight buttons flanking the screen, four on each side. Each
//! screen owns the full binding set while it is current: the controller
//! clears every slot before the next screen binds its own.

use std::fmt;

use crate::error::{KioskError, Result};

/// Number of physical buttons
pub const SLOT_COUNT: usize = 8;

/// One of the eight fixed button positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ButtonSlot {
    UpperLeft = 0,
    MiddleTopLeft = 1,
    MiddleBottomLeft = 2,
    LowerLeft = 3,
    UpperRight = 4,
    MiddleTopRight = 5,
    MiddleBottomRight = 6,
    LowerRight = 7,
}

impl ButtonSlot {
    /// All slots in index order
    pub const ALL: [ButtonSlot; SLOT_COUNT] = [
        ButtonSlot::UpperLeft,
        ButtonSlot::MiddleTopLeft,
        ButtonSlot::MiddleBottomLeft,
        ButtonSlot::LowerLeft,
        ButtonSlot::UpperRight,
        ButtonSlot::MiddleTopRight,
        ButtonSlot::MiddleBottomRight,
        ButtonSlot::LowerRight,
    ];

    /// Left column, top to bottom
    pub const LEFT: [ButtonSlot; 4] = [
        ButtonSlot::UpperLeft,
        ButtonSlot::MiddleTopLeft,
        ButtonSlot::MiddleBottomLeft,
        ButtonSlot::LowerLeft,
    ];

    /// Right column, top to bottom
    pub const RIGHT: [ButtonSlot; 4] = [
        ButtonSlot::UpperRight,
        ButtonSlot::MiddleTopRight,
        ButtonSlot::MiddleBottomRight,
        ButtonSlot::LowerRight,
    ];

    /// Slots that carry quick-pick amounts on the transaction screens
    pub const PRESET_SLOTS: [ButtonSlot; 5] = [
        ButtonSlot::UpperLeft,
        ButtonSlot::MiddleTopLeft,
        ButtonSlot::MiddleBottomLeft,
        ButtonSlot::UpperRight,
        ButtonSlot::MiddleTopRight,
    ];

    /// Resolve a raw index, rejecting anything outside the eight positions
    pub fn from_index(index: u8) -> Result<Self> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(KioskError::InvalidSlot(index))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_left(self) -> bool {
        self.index() < 4
    }
}

impl TryFrom<u8> for ButtonSlot {
    type Error = KioskError;

    fn try_from(index: u8) -> Result<Self> {
        Self::from_index(index)
    }
}

impl fmt::Display for ButtonSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Label and action bound to a slot
///
/// Both halves are optional: a label without an action renders but is inert,
/// an action without a label fires but shows nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonBinding<A> {
    pub label: Option<String>,
    pub action: Option<A>,
}

impl<A> ButtonBinding<A> {
    /// Labelled action
    pub fn new(label: impl Into<String>, action: A) -> Self {
        Self {
            label: Some(label.into()),
            action: Some(action),
        }
    }

    /// Label with no action
    pub fn label_only(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            action: None,
        }
    }
}

/// The eight bindings currently on the kiosk
///
/// Generic over the action type so the kiosk can bind plain messages while
/// other hosts bind callbacks.
#[derive(Debug, Clone)]
pub struct ButtonBindingRegistry<A> {
    slots: [Option<ButtonBinding<A>>; SLOT_COUNT],
}

impl<A> Default for ButtonBindingRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ButtonBindingRegistry<A> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Remove all eight bindings
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        tracing::debug!("Button bindings cleared");
    }

    /// Bind a slot, replacing whatever was there
    pub fn bind(&mut self, slot: ButtonSlot, binding: ButtonBinding<A>) {
        tracing::debug!(%slot, label = ?binding.label, "Button bound");
        self.slots[slot.index()] = Some(binding);
    }

    /// Bind by raw index
    pub fn bind_index(&mut self, index: u8, binding: ButtonBinding<A>) -> Result<()> {
        let slot = ButtonSlot::from_index(index)?;
        self.bind(slot, binding);
        Ok(())
    }

    /// Action bound to a slot, `None` when unbound
    pub fn invoke(&self, slot: ButtonSlot) -> Option<&A> {
        self.slots[slot.index()]
            .as_ref()
            .and_then(|binding| binding.action.as_ref())
    }

    /// Action bound to a raw index
    pub fn invoke_index(&self, index: u8) -> Result<Option<&A>> {
        Ok(self.invoke(ButtonSlot::from_index(index)?))
    }

    pub fn get(&self, slot: ButtonSlot) -> Option<&ButtonBinding<A>> {
        self.slots[slot.index()].as_ref()
    }

    pub fn label(&self, slot: ButtonSlot) -> Option<&str> {
        self.get(slot).and_then(|binding| binding.label.as_deref())
    }

    /// Labels of all eight slots, in slot order
    pub fn labels(&self) -> [Option<String>; SLOT_COUNT] {
        std::array::from_fn(|i| {
            self.slots[i]
                .as_ref()
                .and_then(|binding| binding.label.clone())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<F: Fn()> ButtonBindingRegistry<F> {
    /// Run the callback bound to a slot; unbound slots are inert
    pub fn fire(&self, slot: ButtonSlot) -> bool {
        match self.invoke(slot) {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    type Callback = Box<dyn Fn()>;

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, Box::new(move || handle.set(handle.get() + 1)))
    }

    #[test]
    fn test_unbound_slot_is_inert() {
        let registry: ButtonBindingRegistry<Callback> = ButtonBindingRegistry::new();
        for slot in ButtonSlot::ALL {
            assert!(!registry.fire(slot));
            assert!(registry.label(slot).is_none());
        }
    }

    #[test]
    fn test_bound_callback_fires_only_for_its_slot() {
        let (count, callback) = counter();
        let mut registry = ButtonBindingRegistry::new();
        registry.bind(ButtonSlot::LowerRight, ButtonBinding::new("Enter PIN", callback));

        assert!(!registry.fire(ButtonSlot::LowerLeft));
        assert_eq!(count.get(), 0);
        assert!(registry.fire(ButtonSlot::LowerRight));
        assert_eq!(count.get(), 1);
        assert_eq!(registry.label(ButtonSlot::LowerRight), Some("Enter PIN"));
    }

    #[test]
    fn test_rebinding_replaces_previous() {
        let (first, first_cb) = counter();
        let (second, second_cb) = counter();
        let mut registry = ButtonBindingRegistry::new();

        registry.bind(ButtonSlot::UpperLeft, ButtonBinding::new("Old", first_cb));
        registry.bind(ButtonSlot::UpperLeft, ButtonBinding::new("New", second_cb));
        registry.fire(ButtonSlot::UpperLeft);

        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        assert_eq!(registry.label(ButtonSlot::UpperLeft), Some("New"));
    }

    #[test]
    fn test_rebinding_does_not_merge_label() {
        let mut registry = ButtonBindingRegistry::new();
        registry.bind(ButtonSlot::UpperRight, ButtonBinding::new("Balance", 1u8));
        registry.bind(
            ButtonSlot::UpperRight,
            ButtonBinding {
                label: None,
                action: Some(2u8),
            },
        );
        assert!(registry.label(ButtonSlot::UpperRight).is_none());
        assert_eq!(registry.invoke(ButtonSlot::UpperRight), Some(&2));
    }

    #[test]
    fn test_label_only_binding_is_inert() {
        let mut registry: ButtonBindingRegistry<u8> = ButtonBindingRegistry::new();
        registry.bind(ButtonSlot::MiddleTopLeft, ButtonBinding::label_only("$20"));
        assert_eq!(registry.label(ButtonSlot::MiddleTopLeft), Some("$20"));
        assert!(registry.invoke(ButtonSlot::MiddleTopLeft).is_none());
    }

    #[test]
    fn test_out_of_range_slot_rejected() {
        let mut registry: ButtonBindingRegistry<u8> = ButtonBindingRegistry::new();
        assert!(matches!(
            registry.bind_index(8, ButtonBinding::new("X", 0)),
            Err(KioskError::InvalidSlot(8))
        ));
        assert!(matches!(
            registry.invoke_index(200),
            Err(KioskError::InvalidSlot(200))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_labels_snapshot() {
        let mut registry = ButtonBindingRegistry::new();
        registry.bind(ButtonSlot::LowerLeft, ButtonBinding::new("Cancel", ()));
        let labels = registry.labels();
        assert_eq!(labels[3].as_deref(), Some("Cancel"));
        assert_eq!(labels.iter().filter(|l| l.is_some()).count(), 1);
    }

    proptest! {
        #[test]
        fn prop_clear_makes_every_slot_inert(bound in proptest::collection::vec(0u8..8, 0..16)) {
            let (count, _) = counter();
            let mut registry: ButtonBindingRegistry<Callback> = ButtonBindingRegistry::new();
            for index in bound {
                let handle = Rc::clone(&count);
                registry
                    .bind_index(index, ButtonBinding::new("x", Box::new(move || handle.set(handle.get() + 1))))
                    .unwrap();
            }
            registry.clear();
            for slot in ButtonSlot::ALL {
                prop_assert!(!registry.fire(slot));
            }
            prop_assert_eq!(count.get(), 0);
        }

        #[test]
        fn prop_last_binding_wins(index in 0u8..8, first in any::<u32>(), second in any::<u32>()) {
            let mut registry = ButtonBindingRegistry::new();
            registry.bind_index(index, ButtonBinding::new("first", first)).unwrap();
            registry.bind_index(index, ButtonBinding::new("second", second)).unwrap();
            prop_assert_eq!(registry.invoke_index(index).unwrap(), Some(&second));
        }
    }
}
