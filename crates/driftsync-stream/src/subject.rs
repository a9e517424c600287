//! Observable push primitive
//!
//! A [`Subject`] holds the latest published value and notifies subscribers
//! synchronously, in subscription order. New subscribers immediately receive
//! the current value. This is deliberately not a full reactive-stream
//! algebra; it is the minimum the stores need to push updates without
//! readers polling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`Subject::subscribe`]; pass back to
/// [`Subject::unsubscribe`] to stop receiving notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

/// A behavior-subject: latest value plus a synchronous callback registry.
///
/// Notification happens outside the registry lock, so a subscriber may read
/// [`Subject::value`] reentrantly. Subscribers must not publish back into the
/// subject they are being notified from.
pub struct Subject<T> {
    value: Mutex<T>,
    subscribers: Mutex<Vec<(u64, Callback<T>)>>,
    next_id: AtomicU64,
}

impl<T: Clone> Subject<T> {
    /// Create a subject seeded with an initial value.
    pub fn new(initial: T) -> Self {
        Self {
            value: Mutex::new(initial),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current value.
    pub fn value(&self) -> T {
        self.value.lock().clone()
    }

    /// Register a callback. It is invoked immediately with the current value
    /// and again on every subsequent publish, in subscription order.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let callback: Callback<T> = Arc::new(callback);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, callback.clone()));
        let current = self.value();
        callback(&current);
        Subscription(id)
    }

    /// Remove a previously registered callback. Unknown handles are ignored.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.subscribers.lock().retain(|(id, _)| *id != subscription.0);
    }

    /// Replace the current value and notify all subscribers in order.
    pub fn next(&self, value: T) {
        *self.value.lock() = value.clone();
        let callbacks: Vec<Callback<T>> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(&value);
        }
    }
}

impl<T: Clone + Default> Default for Subject<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[test]
    fn subscriber_receives_current_value_immediately() {
        let subject = Subject::new(7u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        subject.subscribe(move |v| seen_clone.lock().push(*v));
        assert_eq!(*seen.lock(), vec![7]);
    }

    #[test]
    fn publishes_reach_subscribers_in_order() {
        let subject = Subject::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = seen.clone();
        subject.subscribe(move |v| first.lock().push(("first", *v)));
        let second = seen.clone();
        subject.subscribe(move |v| second.lock().push(("second", *v)));

        subject.next(1);

        assert_eq!(
            *seen.lock(),
            vec![("first", 0), ("second", 0), ("first", 1), ("second", 1)]
        );
    }

    #[test]
    fn value_reflects_latest_publish() {
        let subject = Subject::new(String::from("a"));
        subject.next(String::from("b"));
        assert_eq!(subject.value(), "b");
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let subject = Subject::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let subscription = subject.subscribe(move |v| seen_clone.lock().push(*v));

        subject.unsubscribe(subscription);
        subject.next(5);

        assert_eq!(*seen.lock(), vec![0]);
    }

    #[test]
    fn subscriber_may_read_value_during_notification() {
        let subject = Arc::new(Subject::new(0u32));
        let observed = Arc::new(Mutex::new(Vec::new()));
        let subject_clone = subject.clone();
        let observed_clone = observed.clone();
        subject.subscribe(move |_| observed_clone.lock().push(subject_clone.value()));

        subject.next(3);

        assert_eq!(*observed.lock(), vec![0, 3]);
    }
}
