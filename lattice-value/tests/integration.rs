//! Integration Tests for the Value Engine
//!
//! These tests exercise values, links, change diffs and collections together
//! through the public API only.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;

use lattice_value::{
    consumer, listener, validator, Observable, Value, ValueChange, ValueError, ValueList,
    ValueSet,
};

fn counter<T>(observable: &dyn Observable<T>) -> Arc<AtomicI32>
where
    T: 'static,
{
    let count = Arc::new(AtomicI32::new(0));
    let count_clone = count.clone();
    observable.add_listener(listener(move || {
        count_clone.fetch_add(1, Ordering::SeqCst);
    }));
    count
}

/// Walk through the documented non-null scenario step by step.
#[test]
fn non_null_scenario() {
    let value = Value::non_null(0);
    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = changes.clone();
    value
        .changed()
        .add_consumer(consumer(move |change: &ValueChange<i32>| {
            changes_clone.lock().push(change.clone());
        }));

    value.set(5).unwrap();
    assert_eq!(value.get(), Some(5));
    value.set(None).unwrap();
    assert_eq!(value.get(), Some(0));
    assert_eq!(
        *changes.lock(),
        vec![
            ValueChange::new(Some(0), Some(5)),
            ValueChange::new(Some(5), Some(0)),
        ]
    );

    value
        .add_validator(validator(|value: Option<&i32>| match value {
            Some(value) if *value < 0 => Err(ValueError::invalid("negative")),
            _ => Ok(()),
        }))
        .unwrap();
    assert!(matches!(value.set(-1), Err(ValueError::InvalidValue(_))));
    assert_eq!(value.get(), Some(0));
    assert_eq!(changes.lock().len(), 2);
}

/// A non-null value behaves the same through its read-only view.
#[test]
fn non_null_value_through_observable() {
    let value = Value::builder().non_null(-1).value(42).build().unwrap();
    assert!(!value.is_nullable());
    assert!(value.is(Some(&42)));

    let observable = value.observable();
    assert!(!observable.is_nullable());
    assert!(observable.is(Some(&42)));

    let count = Arc::new(AtomicI32::new(0));
    let count_clone = count.clone();
    let counting = listener(move || {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert!(observable.add_listener(counting.clone()));
    assert!(!observable.add_listener(counting.clone()));
    observable.add_consumer(consumer(|value: &Option<i32>| {
        assert!(value.is_some());
    }));

    value.set(20).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    value.clear().unwrap();
    assert!(value.is(Some(&-1)));
    assert!(value.is_not_null());
    assert_eq!(observable.get(), Some(-1));
    assert_eq!(count.load(Ordering::SeqCst), 2);

    value.clear().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);

    value.set(42).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 3);

    assert!(observable.remove_listener(&counting));
    assert!(!observable.remove_listener(&counting));
}

#[test]
fn link_round_trip() {
    let a = Value::<i32>::nullable(None);
    let b = Value::nullable(1);

    a.link(&b).unwrap();
    assert_eq!(a.get(), Some(1));
    assert_eq!(a.link(&b), Err(ValueError::AlreadyLinked));

    b.set(2).unwrap();
    assert_eq!(a.get(), Some(2));
    a.set(3).unwrap();
    assert_eq!(b.get(), Some(3));

    a.unlink(&b).unwrap();
    b.set(4).unwrap();
    assert_eq!(a.get(), Some(3));
    a.set(5).unwrap();
    assert_eq!(b.get(), Some(4));
}

#[test]
fn link_round_trip_notifies_once_per_side() {
    let model = Value::nullable(42);
    let ui = Value::<i32>::nullable(None);
    ui.link(&model).unwrap();

    let model_count = counter(&model);
    let ui_count = counter(&ui);

    ui.set(20).unwrap();
    model.set(22).unwrap();
    ui.set(22).unwrap();

    assert_eq!(model_count.load(Ordering::SeqCst), 2);
    assert_eq!(ui_count.load(Ordering::SeqCst), 2);
}

#[test]
fn changed_observer_sees_linked_updates() {
    let model = Value::nullable(0);
    let ui = Value::<i32>::nullable(None);
    ui.link(&model).unwrap();

    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = changes.clone();
    ui.changed()
        .add_consumer(consumer(move |change: &ValueChange<i32>| {
            changes_clone.lock().push(change.clone().into_parts());
        }));

    model.set(1).unwrap();
    model.set(1).unwrap();
    model.set(2).unwrap();

    assert_eq!(
        *changes.lock(),
        vec![(Some(0), Some(1)), (Some(1), Some(2))]
    );
}

#[test]
fn weak_listeners() {
    let value = Value::<i32>::nullable(None);
    let observable = value.observable();

    let weak = listener(|| {});
    let weak_consumer = consumer(|_: &Option<i32>| {});
    assert!(observable.add_weak_listener(&weak));
    assert!(!observable.add_weak_listener(&weak));
    assert!(observable.add_weak_consumer(&weak_consumer));
    assert!(!observable.add_weak_consumer(&weak_consumer));

    value.set(1).unwrap();
    assert!(observable.remove_weak_listener(&weak));
    assert!(observable.remove_weak_consumer(&weak_consumer));
    assert_eq!(value.observer().subscriber_count(), 0);
}

#[test]
fn dropped_weak_listener_stops_firing() {
    let value = Value::nullable(0);
    let count = Arc::new(AtomicI32::new(0));
    let count_clone = count.clone();
    let weak = listener(move || {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    value.observer().add_weak_listener(&weak);

    value.set(1).unwrap();
    drop(weak);
    value.set(2).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(value.observer().subscriber_count(), 0);
}

#[test]
fn concurrent_adds_are_not_lost() {
    let list = ValueList::with_values(["a", "b"]);
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["c", "d"]
        .into_iter()
        .map(|item| {
            let list = list.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                list.add(item).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = list.get();
    assert_eq!(snapshot.len(), 4);
    for item in ["a", "b", "c", "d"] {
        assert!(snapshot.contains(&item));
    }
}

#[test]
fn concurrent_adds_observed_sizes_are_consistent() {
    let set = ValueSet::<i32>::empty();
    let sizes = Arc::new(Mutex::new(Vec::new()));
    let sizes_clone = sizes.clone();
    set.observer()
        .add_consumer(consumer(move |snapshot: &Option<Arc<indexmap::IndexSet<i32>>>| {
            if let Some(snapshot) = snapshot {
                sizes_clone.lock().push(snapshot.len());
            }
        }));

    let handles: Vec<_> = (0..4)
        .map(|thread_index| {
            let set = set.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    set.add(thread_index * 100 + i).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(set.size(), 100);
    let mut sizes = sizes.lock().clone();
    sizes.sort_unstable();
    // every committed snapshot grew the set by exactly one
    assert_eq!(sizes, (1..=100).collect::<Vec<_>>());
}

#[test]
fn set_projection() {
    let set = ValueSet::with_values([1, 2, 3]);
    assert_eq!(set.value().get(), Some(1));

    set.value().set(9).unwrap();
    assert_eq!(set.get().iter().copied().collect::<Vec<_>>(), vec![9]);

    set.value().set(None).unwrap();
    assert!(set.get().is_empty());
    assert!(set.value().is_null());
}

#[test]
fn projection_links_like_any_value() {
    let list = ValueList::with_values(["first", "second"]);
    let selected = Value::<&str>::nullable(None);
    selected.link(&list.value()).unwrap();
    assert_eq!(selected.get(), Some("first"));

    selected.set("only").unwrap();
    assert_eq!(*list.get(), vec!["only"]);

    list.set(["x", "y"]).unwrap();
    assert_eq!(selected.get(), Some("x"));
}

#[test]
fn collection_change_diff() {
    let list = ValueList::with_values([1]);
    let changes = Arc::new(AtomicI32::new(0));
    let changes_clone = changes.clone();
    list.as_value().changed().add_listener(listener(move || {
        changes_clone.fetch_add(1, Ordering::SeqCst);
    }));

    list.add(2).unwrap();
    list.remove(&5).unwrap();
    list.sort().unwrap();

    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

#[test]
fn locked_link_reports_failure() {
    let original = Value::non_null(0);
    let linked = Value::non_null(0);
    linked.link(&original).unwrap();
    original.locked().set(true);

    assert_eq!(linked.set(1), Err(ValueError::ValueLocked));
    assert_eq!(original.get(), Some(0));
    assert!(original.set(0).is_ok());
}
