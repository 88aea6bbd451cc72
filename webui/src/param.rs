//! Bound parameters and their change-notification channels.
//!
//! A [`Param`] is the shared handle the host keeps to a bound variable.
//! Every mutator threads an explicit [`Origin`] so the dispatcher can
//! tell "I changed this" apart from "the network told me to change
//! this"; origin is never inferred from context.
//!
//! Single-threaded by design (spec'd cooperative model): handles are
//! `Rc<RefCell<_>>` and are `!Send`, which pins all mutation to the
//! thread driving the dispatcher.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::ParamData;

/// Who initiated a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Origin {
    /// The owning application mutated the value.
    Local,
    /// An inbound wire command mutated the value.
    Remote,
}

/// Handle identifying one connected observer.
pub type SlotId = usize;

type Callback<T> = Rc<dyn Fn(Origin, &T)>;

struct SignalInner<T> {
    slots: Vec<(SlotId, Callback<T>)>,
    next_id: SlotId,
}

/// Observer list with stable slot ids, modeled after signal/slot
/// change notification.
pub(crate) struct Signal<T> {
    inner: Rc<RefCell<SignalInner<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Signal<T> {
    fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                slots: Vec::new(),
                next_id: 0,
            })),
        }
    }

    pub(crate) fn connect(&self, callback: impl Fn(Origin, &T) + 'static) -> SlotId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.push((id, Rc::new(callback)));
        id
    }

    pub(crate) fn disconnect(&self, id: SlotId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(pos) = inner.slots.iter().position(|(slot, _)| *slot == id) {
            inner.slots.remove(pos);
        }
    }

    /// Invokes every slot connected at the start of the emit, skipping
    /// any that disconnect mid-emit. The slot list stays in place, so
    /// a slot that mutates the watched value reentrantly triggers a
    /// full nested emission, including of itself. Slots connected
    /// during an emit only see later emissions.
    pub(crate) fn emit(&self, origin: Origin, value: &T) {
        let snapshot: Vec<(SlotId, Callback<T>)> = self
            .inner
            .borrow()
            .slots
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();
        for (id, callback) in snapshot {
            let connected = self.inner.borrow().slots.iter().any(|(slot, _)| *slot == id);
            if connected {
                callback(origin, value);
            }
        }
    }
}

struct BoundParam<T: ParamData> {
    value: T,
    selected: Option<T::Selected>,
    on_set: Signal<T>,
    on_select: Signal<T::Selected>,
}

/// Shared handle to a single typed, observable value.
///
/// Cloning is cheap and shares the underlying storage; the registry
/// clones the handle it is given, so a binding cannot outlive the
/// value it refers to.
pub struct Param<T: ParamData> {
    cell: Rc<RefCell<BoundParam<T>>>,
}

impl<T: ParamData> Clone for Param<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: ParamData> Param<T> {
    /// Creates a parameter holding `initial`. No notification fires.
    pub fn new(initial: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(BoundParam {
                value: initial,
                selected: None,
                on_set: Signal::new(),
                on_select: Signal::new(),
            })),
        }
    }

    /// Current value. No side effects.
    pub fn get(&self) -> T {
        self.cell.borrow().value.clone()
    }

    /// Most recently selected sub-value, if any selection happened.
    pub fn get_selected(&self) -> Option<T::Selected> {
        self.cell.borrow().selected.clone()
    }

    /// Replaces the value with local origin. Fires `on_set` exactly
    /// once, even when the new value equals the old one.
    pub fn set(&self, value: T) -> T {
        self.set_from(Origin::Local, value)
    }

    /// Replaces the value with an explicit origin.
    pub fn set_from(&self, origin: Origin, value: T) -> T {
        let (value, signal) = {
            let mut param = self.cell.borrow_mut();
            param.value = value;
            (param.value.clone(), param.on_set.clone())
        };
        signal.emit(origin, &value);
        value
    }

    /// Replaces the selection with local origin. Fires `on_select`
    /// exactly once; the value itself is untouched.
    pub fn select(&self, selected: T::Selected) -> T::Selected {
        self.select_from(Origin::Local, selected)
    }

    pub fn select_from(&self, origin: Origin, selected: T::Selected) -> T::Selected {
        let signal = {
            let mut param = self.cell.borrow_mut();
            param.selected = Some(selected.clone());
            param.on_select.clone()
        };
        signal.emit(origin, &selected);
        selected
    }

    /// Connects an observer to the set channel.
    pub fn on_set(&self, callback: impl Fn(Origin, &T) + 'static) -> SlotId {
        self.cell.borrow().on_set.connect(callback)
    }

    pub fn disconnect_set(&self, id: SlotId) {
        self.cell.borrow().on_set.disconnect(id);
    }

    /// Connects an observer to the select channel.
    pub fn on_select(&self, callback: impl Fn(Origin, &T::Selected) + 'static) -> SlotId {
        self.cell.borrow().on_select.connect(callback)
    }

    pub fn disconnect_select(&self, id: SlotId) {
        self.cell.borrow().on_select.disconnect(id);
    }

    // In-place mutation with a single notification at the end.
    fn update_with(&self, origin: Origin, mutate: impl FnOnce(&mut T)) -> T {
        let (value, signal) = {
            let mut param = self.cell.borrow_mut();
            mutate(&mut param.value);
            (param.value.clone(), param.on_set.clone())
        };
        signal.emit(origin, &value);
        value
    }
}

impl Param<Vec<String>> {
    /// Appends one element; a single set-mutation, one notification.
    pub fn append(&self, item: impl Into<String>) -> Vec<String> {
        self.append_from(Origin::Local, item)
    }

    pub fn append_from(&self, origin: Origin, item: impl Into<String>) -> Vec<String> {
        let item = item.into();
        self.update_with(origin, |list| list.push(item))
    }

    /// Empties the list; a single set-mutation, one notification.
    pub fn clear(&self) -> Vec<String> {
        self.clear_from(Origin::Local)
    }

    pub fn clear_from(&self, origin: Origin) -> Vec<String> {
        self.update_with(origin, Vec::clear)
    }
}

impl Param<HashMap<String, String>> {
    /// Upserts every entry into the map; one notification for the
    /// whole batch. Entries never delete existing keys.
    pub fn merge(&self, entries: impl IntoIterator<Item = (String, String)>) {
        self.merge_from(Origin::Local, entries);
    }

    pub fn merge_from(&self, origin: Origin, entries: impl IntoIterator<Item = (String, String)>) {
        let entries: Vec<_> = entries.into_iter().collect();
        self.update_with(origin, |map| map.extend(entries));
    }
}

macro_rules! impl_numeric_sugar {
    ($ty:ty) => {
        impl Param<$ty> {
            /// Adds `delta` to the value; reduces to one `set` call.
            pub fn add(&self, delta: $ty) -> $ty {
                let value = self.get() + delta;
                self.set(value)
            }

            /// Subtracts `delta` from the value; reduces to one `set` call.
            pub fn sub(&self, delta: $ty) -> $ty {
                let value = self.get() - delta;
                self.set(value)
            }
        }
    };
}

impl_numeric_sugar!(i32);
impl_numeric_sugar!(f32);
impl_numeric_sugar!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn counted<T: ParamData>(param: &Param<T>) -> Rc<RefCell<Vec<Origin>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        param.on_set(move |origin, _| sink.borrow_mut().push(origin));
        seen
    }

    #[test]
    fn construction_and_get_do_not_notify() {
        let param = Param::new(0.5_f32);
        let seen = counted(&param);
        let _ = param.get();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn set_fires_exactly_once_even_for_equal_value() {
        let param = Param::new(0.5_f32);
        let seen = counted(&param);
        param.set(0.5);
        assert_eq!(seen.borrow().len(), 1);
        param.set(0.5);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn origin_is_threaded_through_to_observers() {
        let param = Param::new(1_i32);
        let seen = counted(&param);
        param.set(2);
        param.set_from(Origin::Remote, 3);
        assert_eq!(*seen.borrow(), vec![Origin::Local, Origin::Remote]);
        assert_eq!(param.get(), 3);
    }

    #[test]
    fn select_fires_only_the_select_channel() {
        let param = Param::new(vec!["a".to_string(), "b".to_string()]);
        let sets = counted(&param);
        let selections = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&selections);
        param.on_select(move |_, selected: &String| sink.borrow_mut().push(selected.clone()));

        param.select("b".to_string());
        assert!(sets.borrow().is_empty());
        assert_eq!(*selections.borrow(), vec!["b".to_string()]);
        assert_eq!(param.get_selected(), Some("b".to_string()));
        assert_eq!(param.get(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn append_and_clear_notify_once_each() {
        let param = Param::new(Vec::<String>::new());
        let seen = counted(&param);
        param.append("x");
        param.append("y");
        assert_eq!(param.get(), vec!["x".to_string(), "y".to_string()]);
        param.clear();
        assert!(param.get().is_empty());
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn merge_upserts_and_notifies_once() {
        let mut initial = HashMap::new();
        initial.insert("keep".to_string(), "old".to_string());
        let param = Param::new(initial);
        let seen = counted(&param);

        param.merge([
            ("keep".to_string(), "new".to_string()),
            ("added".to_string(), "v".to_string()),
        ]);
        assert_eq!(seen.borrow().len(), 1);
        let map = param.get();
        assert_eq!(map.get("keep"), Some(&"new".to_string()));
        assert_eq!(map.get("added"), Some(&"v".to_string()));
    }

    #[test]
    fn numeric_sugar_is_one_set_per_call() {
        let param = Param::new(10_i32);
        let seen = counted(&param);
        assert_eq!(param.add(5), 15);
        assert_eq!(param.sub(3), 12);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn disconnect_stops_notifications() {
        let param = Param::new(false);
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let slot = param.on_set(move |_, _| *sink.borrow_mut() += 1);
        param.set(true);
        param.disconnect_set(slot);
        param.set(false);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn observer_may_read_the_param_it_watches() {
        let param = Param::new(1_i32);
        let reader = param.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        param.on_set(move |_, _| sink.borrow_mut().push(reader.get()));
        param.set(7);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn reentrant_set_from_an_observer_notifies_every_observer() {
        let param = Param::new(0_i32);
        let clamp = param.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        param.on_set(move |_, value: &i32| {
            sink.borrow_mut().push(*value);
            if *value > 5 {
                clamp.set(5);
            }
        });
        param.set(9);
        assert_eq!(*seen.borrow(), vec![9, 5]);
        assert_eq!(param.get(), 5);
    }

    #[test]
    fn subscribing_during_emit_takes_effect_afterwards() {
        let param = Param::new(0_i32);
        let inner = param.clone();
        let late = Rc::new(RefCell::new(0));
        let late_sink = Rc::clone(&late);
        param.on_set(move |_, _| {
            let sink = Rc::clone(&late_sink);
            inner.on_set(move |_, _| *sink.borrow_mut() += 1);
        });
        param.set(1);
        assert_eq!(*late.borrow(), 0);
    }
}
