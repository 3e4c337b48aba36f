use std::collections::VecDeque;
use std::time::Duration;

use crate::domain::entities::RequestStatus;
use crate::domain::{Notification, NotificationLevel};

/// Queue of alerts shown one at a time, oldest first.
#[derive(Debug)]
pub struct NotificationManager {
    queue: VecDeque<Notification>,
    default_duration: Duration,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl NotificationManager {
    #[must_use]
    pub fn new(default_duration: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            default_duration,
        }
    }

    pub fn notify(
        &mut self,
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Notification::new(level, title, message));
    }

    /// Queues an alert when `status` reports a failed listing fetch.
    ///
    /// Returns true if a notification was queued.
    pub fn observe_status(&mut self, status: &RequestStatus) -> bool {
        let Some(error) = status.failure() else {
            return false;
        };
        self.push(Notification::feed_failure(error));
        true
    }

    fn push(&mut self, notification: Notification) {
        self.queue
            .push_back(notification.with_duration(self.default_duration));
    }

    pub fn tick(&mut self) {
        if let Some(front) = self.queue.front_mut() {
            front.mark_displayed();
            if front.is_expired() {
                self.queue.pop_front();
                if let Some(next) = self.queue.front_mut() {
                    next.mark_displayed();
                }
            }
        }
    }

    /// Removes the visible alert, as when the user taps "OK".
    pub fn dismiss(&mut self) -> Option<Notification> {
        let dismissed = self.queue.pop_front();
        if let Some(next) = self.queue.front_mut() {
            next.mark_displayed();
        }
        dismissed
    }

    #[must_use]
    pub fn current_notification(&self) -> Option<&Notification> {
        self.queue.front()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        !self.queue.is_empty()
    }
}
