//! Latest-value observable with explicit subscriptions.

use futures_util::Stream;
use tokio::sync::watch;

/// Holds a current value and notifies subscribers when it changes.
///
/// Subscribers see values in publish order; a slow subscriber skips straight
/// to the latest value rather than replaying intermediate ones.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replaces the value and notifies every subscriber.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Mutates in place; subscribers are notified only when `f` returns true.
    pub fn modify(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Opens a subscription. The current value counts as already seen.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live subscription. Dropping it (or calling [`Subscription::unsubscribe`])
/// detaches it from the observable.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// Returns the latest value without marking it seen.
    #[must_use]
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next change. Returns `None` once the observable is gone.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until the value satisfies `predicate`, checking the current value first.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.rx.wait_for(predicate).await.ok().map(|v| v.clone())
    }

    /// Converts into a stream of future changes.
    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures_util::stream::unfold(self, |mut sub| async move {
            let value = sub.next().await?;
            Some((value, sub))
        })
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_subscriber_sees_current_then_changes() {
        let observable = Observable::new(1);
        let mut sub = observable.subscribe();

        assert_eq!(sub.current(), 1);
        observable.publish(2);
        assert_eq!(sub.next().await, Some(2));
    }

    #[tokio::test]
    async fn test_unchanged_modify_does_not_notify() {
        let observable = Observable::new(vec![1]);
        let mut sub = observable.subscribe();

        assert!(!observable.modify(|_| false));
        assert!(observable.modify(|v| {
            v.push(2);
            true
        }));

        assert_eq!(sub.next().await, Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_receiver() {
        let observable = Observable::new(0);
        let sub = observable.subscribe();
        assert_eq!(observable.subscriber_count(), 1);

        sub.unsubscribe();
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_ends_when_observable_dropped() {
        let observable = Observable::new("a");
        let stream = observable.subscribe().into_stream();
        observable.publish("b");
        drop(observable);

        let values: Vec<_> = stream.collect().await;
        assert_eq!(values, vec!["b"]);
    }
}
