// ── Scale binding ─────────────────────────────────────────────────────────────
//
// The change-notifiable record that the window's visual contents observe.
// Single-threaded: the window, its controller and every observer live on the
// UI thread, so interior mutability is `Cell`/`RefCell`, never a lock.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// Which field of a [`ScaleBinding`] was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScaleProperty {
    ScaleX,
    ScaleY,
}

impl ScaleProperty {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::ScaleX => "ScaleX",
            Self::ScaleY => "ScaleY",
        }
    }
}

/// Token returned by [`ScaleBinding::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Subscription(u64);

type Observer = Rc<dyn Fn(&ScaleBinding, ScaleProperty)>;

/// Horizontal and vertical scale factors, plus the observers to tell when
/// they are written.
///
/// Writes notify synchronously, inside the call that performed the write, in
/// subscription order, once per field.  Every write notifies, including writes
/// that store the value already held.
pub(crate) struct ScaleBinding {
    scale_x: Cell<f64>,
    scale_y: Cell<f64>,
    observers: RefCell<Vec<(Subscription, Observer)>>,
    next_id: Cell<u64>,
}

impl ScaleBinding {
    /// A binding at scale (1.0, 1.0) with no observers.
    pub(crate) fn new() -> Self {
        Self {
            scale_x: Cell::new(1.0),
            scale_y: Cell::new(1.0),
            observers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub(crate) fn scale_x(&self) -> f64 {
        self.scale_x.get()
    }

    pub(crate) fn scale_y(&self) -> f64 {
        self.scale_y.get()
    }

    /// Register `observer`.  It sees every write made after this call returns.
    pub(crate) fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ScaleBinding, ScaleProperty) + 'static,
    {
        let id = Subscription(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let observer: Observer = Rc::new(observer);
        self.observers.borrow_mut().push((id, observer));
        id
    }

    /// Remove a previously registered observer.  Returns `false` if it was
    /// already gone.
    pub(crate) fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(id, _)| *id != subscription);
        observers.len() != before
    }

    /// Store both factors, then notify `ScaleX` followed by `ScaleY`.
    ///
    /// Observers never see one axis updated and the other stale.
    pub(crate) fn set_scales(&self, scale_x: f64, scale_y: f64) {
        self.scale_x.set(scale_x);
        self.scale_y.set(scale_y);
        self.notify(ScaleProperty::ScaleX);
        self.notify(ScaleProperty::ScaleY);
    }

    fn notify(&self, property: ScaleProperty) {
        // Snapshot so that observers may subscribe or unsubscribe re-entrantly.
        let observers: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, o)| Rc::clone(o))
            .collect();
        for observer in observers {
            observer(self, property);
        }
    }
}

impl Default for ScaleBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScaleBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleBinding")
            .field("scale_x", &self.scale_x.get())
            .field("scale_y", &self.scale_y.get())
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    type Seen = Rc<RefCell<Vec<(ScaleProperty, f64, f64)>>>;

    /// Records the changed field and both factors as seen inside the callback.
    fn recorder(binding: &ScaleBinding) -> Seen {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        binding.subscribe(move |b, p| sink.borrow_mut().push((p, b.scale_x(), b.scale_y())));
        seen
    }

    #[test]
    fn starts_at_unit_scale() {
        let b = ScaleBinding::new();
        assert_eq!((b.scale_x(), b.scale_y()), (1.0, 1.0));
    }

    #[test]
    fn observer_sees_both_new_values_in_every_callback() {
        let b = ScaleBinding::new();
        let seen = recorder(&b);
        b.set_scales(1.5, 2.0);
        assert_eq!(
            *seen.borrow(),
            vec![
                (ScaleProperty::ScaleX, 1.5, 2.0),
                (ScaleProperty::ScaleY, 1.5, 2.0),
            ]
        );
    }

    #[test]
    fn unchanged_value_still_notifies() {
        let b = ScaleBinding::new();
        let seen = recorder(&b);
        b.set_scales(1.0, 1.0);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn observers_run_in_subscription_order() {
        let b = ScaleBinding::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let sink = Rc::clone(&order);
            b.subscribe(move |_, _| sink.borrow_mut().push(tag));
        }
        b.set_scales(1.25, 1.25);
        assert_eq!(
            *order.borrow(),
            vec!["first", "second", "first", "second"]
        );
    }

    #[test]
    fn unsubscribed_observer_is_silent() {
        let b = ScaleBinding::new();
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let sub = b.subscribe(move |_, _| sink.set(sink.get() + 1));
        b.set_scales(2.0, 2.0);
        assert!(b.unsubscribe(sub));
        assert!(!b.unsubscribe(sub));
        b.set_scales(3.0, 3.0);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn observer_may_subscribe_during_notification() {
        let b = Rc::new(ScaleBinding::new());
        let weak = Rc::downgrade(&b);
        b.subscribe(move |_, _| {
            if let Some(b) = weak.upgrade() {
                b.subscribe(|_, _| {});
            }
        });
        b.set_scales(1.5, 1.5);
        // One extra observer per notification: ScaleX, then ScaleY.
        assert_eq!(b.observers.borrow().len(), 3);
    }

    #[test]
    fn property_names() {
        assert_eq!(ScaleProperty::ScaleX.as_str(), "ScaleX");
        assert_eq!(ScaleProperty::ScaleY.as_str(), "ScaleY");
    }
}
