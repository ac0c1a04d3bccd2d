use std::sync::atomic::{AtomicU32, Ordering};

use futures::task;

/// The window *we* grant to the peer: decremented as data arrives,
/// topped back up with `SSH_MSG_CHANNEL_WINDOW_ADJUST` once the
/// consumer has drained enough of it.
pub(crate) struct LocalWindow {
    inner: AtomicU32,
}

impl LocalWindow {
    pub const INITIAL_WINDOW_SIZE: u32 = crate::INITIAL_WINDOW_SIZE;

    const ADJUST_THRESHOLD: u32 =
        Self::INITIAL_WINDOW_SIZE - crate::MAXIMUM_PACKET_SIZE * 5;

    /// Top the window back up when it fell below the threshold,
    /// returning the amount of bytes to advertise to the peer.
    pub fn adjustable(&self) -> Option<u32> {
        let previous = self
            .inner
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |window| {
                (window <= Self::ADJUST_THRESHOLD).then_some(Self::INITIAL_WINDOW_SIZE)
            })
            .ok();

        previous.map(|previous| Self::INITIAL_WINDOW_SIZE - previous)
    }

    /// Account for `size` delivered bytes; `false` when the peer
    /// overflowed the window it was granted.
    #[must_use]
    pub fn consume(&self, size: u32) -> bool {
        self.inner
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |window| {
                window.checked_sub(size)
            })
            .is_ok()
    }
}

impl Default for LocalWindow {
    fn default() -> Self {
        Self {
            inner: Self::INITIAL_WINDOW_SIZE.into(),
        }
    }
}

/// The window the *peer* granted to us: reserved before sending,
/// replenished when a `SSH_MSG_CHANNEL_WINDOW_ADJUST` arrives.
///
/// A writer parking on an empty window never blocks the transport
/// or any other channel, only its own task.
pub(crate) struct RemoteWindow {
    inner: AtomicU32,
    waker: task::AtomicWaker,
}

impl RemoteWindow {
    pub fn replenish(&self, bytes_to_add: u32) {
        self.inner.fetch_add(bytes_to_add, Ordering::SeqCst);
        self.waker.wake();
    }

    /// Wake a parked writer so it can observe a state change.
    pub fn interrupt(&self) {
        self.waker.wake();
    }

    fn try_reserve(&self, mut amount: u32) -> Option<u32> {
        let reserved = self
            .inner
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |window| {
                if amount <= window {
                    Some(window - amount)
                } else {
                    amount = window;

                    (amount > 0).then_some(0)
                }
            })
            .is_ok();

        reserved.then_some(amount)
    }

    /// Reserve up to `amount` bytes of the window, parking until the
    /// peer extends it when none are left.
    pub fn poll_reserve(&self, cx: &mut task::Context, amount: u32) -> task::Poll<u32> {
        if let Some(size) = self.try_reserve(amount) {
            task::Poll::Ready(size)
        } else {
            tracing::debug!("Peer channel window is exhausted, parking until extension");

            self.waker.register(cx.waker());

            // The window may have been replenished between the failed
            // reserve and the waker registration.
            match self.try_reserve(amount) {
                Some(size) => task::Poll::Ready(size),
                None => task::Poll::Pending,
            }
        }
    }
}

impl From<u32> for RemoteWindow {
    fn from(value: u32) -> Self {
        Self {
            inner: value.into(),
            waker: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_accounts_for_delivered_bytes() {
        let window = LocalWindow::default();

        assert!(window.consume(LocalWindow::INITIAL_WINDOW_SIZE - 1));
        assert_eq!(window.adjustable(), Some(LocalWindow::INITIAL_WINDOW_SIZE - 1));
        assert_eq!(window.adjustable(), None);
        assert!(window.consume(LocalWindow::INITIAL_WINDOW_SIZE));
        assert!(!window.consume(1), "overflow must be reported");
    }

    #[test]
    fn it_reserves_no_more_than_granted() {
        let window = RemoteWindow::from(10);

        assert_eq!(window.try_reserve(4), Some(4));
        assert_eq!(window.try_reserve(16), Some(6));
        assert_eq!(window.try_reserve(1), None);

        window.replenish(8);
        assert_eq!(window.try_reserve(16), Some(8));
    }
}
