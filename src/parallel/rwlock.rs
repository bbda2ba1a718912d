use parking_lot::{Condvar, Mutex};
use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::thread::{self, ThreadId};

use crate::core::error::{Error, ErrorKind};

/// Lock mode shared by the read and write halves.
///
/// - `Dormant` — no readers or writers
/// - `Reading(n)` — n active readers
/// - `Writing` — one active writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Dormant,
    Reading(usize),
    Writing,
}

struct State {
    mode: Mode,
    /// Identity of the thread holding the write half while `Writing`.
    writer: Option<ThreadId>,
}

/// A multi-reader / single-writer lock that owns its protected value.
///
/// Readers share the lock; a writer excludes everyone, and the writing
/// thread's identity is recorded so a release by any other thread is a
/// programmer error. Writers may starve while readers churn; no fairness
/// is promised. All wake-ups happen inside the state critical section so
/// a second writer cannot slip past one already waiting.
pub struct ReadWriteLock<T> {
    state: Mutex<State>,
    changed: Condvar,
    value: UnsafeCell<T>,
}

// SAFETY: access to `value` follows the reader/writer protocol enforced
// by `state`: shared references only while Reading, a unique reference
// only while Writing.
unsafe impl<T: Send> Send for ReadWriteLock<T> {}
unsafe impl<T: Send + Sync> Sync for ReadWriteLock<T> {}

impl<T> ReadWriteLock<T> {
    pub fn new(value: T) -> Self {
        ReadWriteLock {
            state: Mutex::new(State {
                mode: Mode::Dormant,
                writer: None,
            }),
            changed: Condvar::new(),
            value: UnsafeCell::new(value),
        }
    }

    /// Acquires shared access, blocking while a writer is active.
    pub fn read(&self) -> ReadGuard<'_, T> {
        let mut state = self.state.lock();
        while state.mode == Mode::Writing {
            self.changed.wait(&mut state);
        }
        state.mode = match state.mode {
            Mode::Dormant => Mode::Reading(1),
            Mode::Reading(n) => Mode::Reading(n + 1),
            Mode::Writing => unreachable!("writer active after wait"),
        };
        ReadGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Acquires exclusive access, blocking while anyone else holds the lock.
    /// The current thread is recorded as the holder.
    pub fn write(&self) -> WriteGuard<'_, T> {
        let mut state = self.state.lock();
        while state.mode != Mode::Dormant {
            self.changed.wait(&mut state);
        }
        state.mode = Mode::Writing;
        state.writer = Some(thread::current().id());
        WriteGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    // Releasing from the wrong state or the wrong thread is a programmer
    // error; it surfaces as a fatal LockState failure.
    fn release_read(&self) {
        let mut state = self.state.lock();
        match state.mode {
            Mode::Reading(1) => {
                state.mode = Mode::Dormant;
                self.changed.notify_all();
            }
            Mode::Reading(n) => state.mode = Mode::Reading(n - 1),
            _ => panic!(
                "{}",
                Error::new(ErrorKind::LockState, "read lock released while not held")
            ),
        }
    }

    fn release_write(&self) {
        let mut state = self.state.lock();
        if state.mode != Mode::Writing || state.writer != Some(thread::current().id()) {
            panic!(
                "{}",
                Error::new(
                    ErrorKind::LockState,
                    "write lock released by a thread that does not hold it",
                )
            );
        }
        state.mode = Mode::Dormant;
        state.writer = None;
        self.changed.notify_all();
    }
}

impl<T: Default> Default for ReadWriteLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Shared access to the protected value. Released on drop.
pub struct ReadGuard<'a, T> {
    lock: &'a ReadWriteLock<T>,
    _not_send: PhantomData<*const ()>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// Exclusive access to the protected value. Released on drop, which
/// must happen on the acquiring thread.
pub struct WriteGuard<'a, T> {
    lock: &'a ReadWriteLock<T>,
    _not_send: PhantomData<*const ()>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
