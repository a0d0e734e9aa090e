// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use easel_surface::{Duration, HostTime};

/// A single pending deadline driven by host time.
///
/// Superseding a pending deadline is the only cancellation there is: a
/// debounced action that is superseded simply never fires.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Debounce {
    delay: Duration,
    deadline: Option<HostTime>,
}

impl Debounce {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Push the deadline to `now + delay`.
    pub(crate) fn restart(&mut self, now: HostTime) {
        self.deadline = Some(now + self.delay);
    }

    /// Fire within the pending window if there is one, else start a new window.
    pub(crate) fn join(&mut self, now: HostTime) {
        if self.deadline.is_none() {
            self.restart(now);
        }
    }

    pub(crate) fn cancel(&mut self) {
        self.deadline = None;
    }

    pub(crate) fn deadline(&self) -> Option<HostTime> {
        self.deadline
    }

    /// Consume the deadline if it is due at `now`.
    pub(crate) fn fire(&mut self, now: HostTime) -> bool {
        match self.deadline {
            Some(due) if now >= due => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_supersedes_and_join_does_not() {
        let mut d = Debounce::new(Duration::from_millis(150));
        d.restart(HostTime(0));
        d.restart(HostTime(100));
        assert_eq!(d.deadline(), Some(HostTime(250)));
        d.join(HostTime(200));
        assert_eq!(d.deadline(), Some(HostTime(250)), "join keeps the open window");
        assert!(!d.fire(HostTime(249)));
        assert!(d.fire(HostTime(250)));
        assert!(!d.fire(HostTime(400)), "fires once");
        d.join(HostTime(400));
        assert_eq!(d.deadline(), Some(HostTime(550)));
        d.cancel();
        assert_eq!(d.deadline(), None);
    }
}
