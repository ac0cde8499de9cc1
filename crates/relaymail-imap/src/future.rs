//! One-shot completion cell shared between the session and its callers.
//!
//! An [`ImapFuture`] starts pending and moves exactly once to done, failed
//! or cancelled. The first completion wins; later attempts report `false`.
//! Callers may block ([`get`](ImapFuture::get)), await
//! ([`wait`](ImapFuture::wait)), or register callbacks. Callbacks run on
//! whichever thread performs the transition, after the internal lock has
//! been released.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use crate::{Error, Result};

/// Longest single wait on the condition variable inside [`ImapFuture::get`].
const POLL_SLICE: Duration = Duration::from_millis(100);

type DoneCallback<T> = Box<dyn FnOnce(&T) + Send>;
type ErrorCallback = Box<dyn FnOnce(&Error) + Send>;
type CancelCallback = Box<dyn FnOnce() + Send>;

enum State<T> {
    Pending,
    Done(T),
    Failed(Error),
    Cancelled,
}

struct Slot<T> {
    state: State<T>,
    on_done: Option<DoneCallback<T>>,
    on_error: Option<ErrorCallback>,
    on_cancel: Option<CancelCallback>,
}

struct Inner<T> {
    slot: Mutex<Slot<T>>,
    cond: Condvar,
    notify: Notify,
}

/// Shared handle to a single asynchronous outcome.
pub struct ImapFuture<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ImapFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Default for ImapFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> ImapFuture<T> {
    /// Creates a pending future.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    state: State::Pending,
                    on_done: None,
                    on_error: None,
                    on_cancel: None,
                }),
                cond: Condvar::new(),
                notify: Notify::new(),
            }),
        }
    }

    /// Creates a future that is already done.
    #[must_use]
    pub fn completed(value: T) -> Self {
        let future = Self::new();
        future.done(value);
        future
    }

    /// Creates a future that has already failed.
    #[must_use]
    pub fn failed(error: Error) -> Self {
        let future = Self::new();
        future.fail(error);
        future
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wake(&self) {
        self.inner.cond.notify_all();
        self.inner.notify.notify_waiters();
    }

    /// Completes with a value. Returns `false` if already complete.
    pub fn done(&self, value: T) -> bool {
        let callback = {
            let mut slot = self.lock();
            if !matches!(slot.state, State::Pending) {
                return false;
            }
            slot.state = State::Done(value.clone());
            slot.on_error = None;
            slot.on_cancel = None;
            slot.on_done.take()
        };
        self.wake();
        if let Some(callback) = callback {
            callback(&value);
        }
        true
    }

    /// Completes with an error. Returns `false` if already complete.
    pub fn fail(&self, error: Error) -> bool {
        let callback = {
            let mut slot = self.lock();
            if !matches!(slot.state, State::Pending) {
                return false;
            }
            slot.state = State::Failed(error.clone());
            slot.on_done = None;
            slot.on_cancel = None;
            slot.on_error.take()
        };
        self.wake();
        if let Some(callback) = callback {
            callback(&error);
        }
        true
    }

    /// Cancels a pending future and fires the cancellation callback.
    ///
    /// Always returns `true`; cancelling a completed future changes nothing.
    /// The wire exchange behind the future is not aborted.
    pub fn cancel(&self) -> bool {
        let callback = {
            let mut slot = self.lock();
            if !matches!(slot.state, State::Pending) {
                return true;
            }
            slot.state = State::Cancelled;
            slot.on_done = None;
            slot.on_error = None;
            slot.on_cancel.take()
        };
        self.wake();
        if let Some(callback) = callback {
            callback();
        }
        true
    }

    /// Returns true once the future left the pending state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        !matches!(self.lock().state, State::Pending)
    }

    /// Returns true if the future was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.lock().state, State::Cancelled)
    }

    /// Returns the outcome if the future is complete.
    #[must_use]
    pub fn try_get(&self) -> Option<Result<T>> {
        outcome(&self.lock().state)
    }

    /// Blocks until complete.
    ///
    /// Waits on a condition variable in bounded slices so the thread wakes
    /// up regularly even if a notification is lost.
    ///
    /// # Errors
    ///
    /// Returns the failure cause, or [`Error::Cancelled`].
    pub fn get(&self) -> Result<T> {
        let mut slot = self.lock();
        loop {
            if let Some(result) = outcome(&slot.state) {
                return result;
            }
            slot = self
                .inner
                .cond
                .wait_timeout(slot, POLL_SLICE)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Blocks for at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if still pending when the time is up; the
    /// future stays pending and can still complete later.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.lock();
        loop {
            if let Some(result) = outcome(&slot.state) {
                return result;
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout(timeout));
            }
            let slice = (deadline - now).min(POLL_SLICE);
            slot = self
                .inner
                .cond
                .wait_timeout(slot, slice)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Waits asynchronously until complete.
    ///
    /// # Errors
    ///
    /// Returns the failure cause, or [`Error::Cancelled`].
    pub async fn wait(&self) -> Result<T> {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(result) = self.try_get() {
                return result;
            }
            notified.await;
        }
    }

    /// Sets the success callback, replacing any previous one. Fires at once
    /// if the future is already done.
    pub fn set_done_callback(&self, callback: impl FnOnce(&T) + Send + 'static) {
        let mut slot = self.lock();
        match &slot.state {
            State::Pending => slot.on_done = Some(Box::new(callback)),
            State::Done(value) => {
                let value = value.clone();
                drop(slot);
                callback(&value);
            }
            State::Failed(_) | State::Cancelled => {}
        }
    }

    /// Sets the failure callback, replacing any previous one. Fires at once
    /// if the future already failed.
    pub fn set_exception_callback(&self, callback: impl FnOnce(&Error) + Send + 'static) {
        let mut slot = self.lock();
        match &slot.state {
            State::Pending => slot.on_error = Some(Box::new(callback)),
            State::Failed(error) => {
                let error = error.clone();
                drop(slot);
                callback(&error);
            }
            State::Done(_) | State::Cancelled => {}
        }
    }

    /// Sets the cancellation callback, replacing any previous one. Fires at
    /// once if the future is already cancelled.
    pub fn set_cancelled_callback(&self, callback: impl FnOnce() + Send + 'static) {
        let mut slot = self.lock();
        match &slot.state {
            State::Pending => slot.on_cancel = Some(Box::new(callback)),
            State::Cancelled => {
                drop(slot);
                callback();
            }
            State::Done(_) | State::Failed(_) => {}
        }
    }

    /// Returns true if both handles refer to the same outcome.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

fn outcome<T: Clone>(state: &State<T>) -> Option<Result<T>> {
    match state {
        State::Pending => None,
        State::Done(value) => Some(Ok(value.clone())),
        State::Failed(error) => Some(Err(error.clone())),
        State::Cancelled => Some(Err(Error::Cancelled)),
    }
}

impl<T> fmt::Debug for ImapFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.slot.try_lock().as_deref().map(|slot| &slot.state) {
            Ok(State::Pending) => "pending",
            Ok(State::Done(_)) => "done",
            Ok(State::Failed(_)) => "failed",
            Ok(State::Cancelled) => "cancelled",
            Err(_) => "locked",
        };
        f.debug_struct("ImapFuture").field("state", &state).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&c), c)
    }

    mod completion_tests {
        use super::*;

        #[test]
        fn get_after_done_returns_value() {
            let future = ImapFuture::new();
            assert!(future.done(7));
            assert_eq!(future.get().unwrap(), 7);
            assert!(future.is_done());
            assert!(!future.is_cancelled());
        }

        #[test]
        fn first_writer_wins() {
            let future = ImapFuture::new();
            assert!(future.done(1));
            assert!(!future.done(2));
            assert!(!future.fail(Error::Busy));
            assert_eq!(future.get().unwrap(), 1);
        }

        #[test]
        fn failure_is_delivered() {
            let future: ImapFuture<u8> = ImapFuture::failed(Error::ConnectionClosed("bye".into()));
            assert!(matches!(future.get(), Err(Error::ConnectionClosed(_))));
        }

        #[test]
        fn cancel_reports_cancelled() {
            let future: ImapFuture<u8> = ImapFuture::new();
            assert!(future.cancel());
            assert!(future.is_cancelled());
            assert!(future.is_done());
            assert!(matches!(future.get(), Err(Error::Cancelled)));
            assert!(!future.done(3));
        }

        #[test]
        fn cancel_after_done_is_true_but_inert() {
            let future = ImapFuture::completed(5);
            let (seen, c) = counter();
            future.set_cancelled_callback(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            assert!(future.cancel());
            assert!(!future.is_cancelled());
            assert_eq!(future.get().unwrap(), 5);
            assert_eq!(seen.load(Ordering::SeqCst), 0);
        }
    }

    mod timeout_tests {
        use super::*;

        #[test]
        fn timeout_leaves_future_pending() {
            let future: ImapFuture<&'static str> = ImapFuture::new();
            let err = future.get_timeout(Duration::from_millis(20)).unwrap_err();
            assert!(matches!(err, Error::Timeout(_)));
            assert!(!future.is_done());
            assert!(future.done("late"));
            assert_eq!(future.get_timeout(Duration::from_millis(20)).unwrap(), "late");
        }

        #[test]
        fn get_wakes_up_on_completion_from_other_thread() {
            let future: ImapFuture<u32> = ImapFuture::new();
            let remote = future.clone();
            let handle = thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                remote.done(99)
            });
            assert_eq!(future.get().unwrap(), 99);
            assert!(handle.join().unwrap());
        }
    }

    mod callback_tests {
        use super::*;

        #[test]
        fn done_callback_fires_once_on_transition() {
            let future = ImapFuture::new();
            let (seen, c) = counter();
            future.set_done_callback(move |v: &u32| {
                c.fetch_add(*v as usize, Ordering::SeqCst);
            });
            future.done(4);
            future.done(10);
            assert_eq!(seen.load(Ordering::SeqCst), 4);
        }

        #[test]
        fn late_registration_fires_immediately() {
            let future = ImapFuture::completed(2u32);
            let (seen, c) = counter();
            future.set_done_callback(move |v| {
                c.fetch_add(*v as usize, Ordering::SeqCst);
            });
            assert_eq!(seen.load(Ordering::SeqCst), 2);

            let failed: ImapFuture<u32> = ImapFuture::failed(Error::Busy);
            let (errs, c) = counter();
            failed.set_exception_callback(move |e| {
                assert!(matches!(e, Error::Busy));
                c.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(errs.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn setter_replaces_previous_callback() {
            let future: ImapFuture<u32> = ImapFuture::new();
            let (first, c1) = counter();
            let (second, c2) = counter();
            future.set_exception_callback(move |_| {
                c1.fetch_add(1, Ordering::SeqCst);
            });
            future.set_exception_callback(move |_| {
                c2.fetch_add(1, Ordering::SeqCst);
            });
            future.fail(Error::Cancelled);
            assert_eq!(first.load(Ordering::SeqCst), 0);
            assert_eq!(second.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn mismatched_callback_never_fires() {
            let future: ImapFuture<u32> = ImapFuture::new();
            let (seen, c) = counter();
            future.set_done_callback(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
            future.cancel();
            future.done(1);
            assert_eq!(seen.load(Ordering::SeqCst), 0);
        }

        #[test]
        fn callback_may_touch_the_future() {
            let future: ImapFuture<u32> = ImapFuture::new();
            let inner = future.clone();
            future.set_done_callback(move |_| {
                assert!(inner.is_done());
            });
            future.done(1);
        }
    }

    mod async_tests {
        use super::*;

        #[tokio::test]
        async fn wait_resolves_after_spawned_completion() {
            let future: ImapFuture<String> = ImapFuture::new();
            let remote = future.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                remote.done("ok".to_string());
            });
            assert_eq!(future.wait().await.unwrap(), "ok");
        }

        #[tokio::test]
        async fn wait_sees_cancellation() {
            let future: ImapFuture<u8> = ImapFuture::new();
            future.cancel();
            assert!(matches!(future.wait().await, Err(Error::Cancelled)));
        }
    }

    #[test]
    fn identity() {
        let a: ImapFuture<u8> = ImapFuture::new();
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&ImapFuture::new()));
    }
}
