use alloc::boxed::Box;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;

use crate::persist::CURRENT_VERSION;
use crate::persist::parser::DEFAULT_CHUNK_SIZE;

// -----------------------------------------------------------------------------
// ArchiveFlags

bitflags! {
    /// Options of an archive walk.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ArchiveFlags: u32 {
        /// Raise an [`ArchiveState::ObjectProcessed`] event per root object.
        const STATUS = 1 << 0;
    }
}

impl Default for ArchiveFlags {
    #[inline]
    fn default() -> Self {
        Self::STATUS
    }
}

// -----------------------------------------------------------------------------
// ArchiveConfig

/// Tunables of an [`Archive`](crate::persist::Archive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Bytes read from the stream per parse step.
    pub chunk_size: usize,
    /// Walk options.
    pub flags: ArchiveFlags,
    /// The file format version written in the header.
    pub version: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            flags: ArchiveFlags::default(),
            version: CURRENT_VERSION,
        }
    }
}

// -----------------------------------------------------------------------------
// Status

/// The phase an [`ArchiveStatus`] event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveState {
    Starting,
    ObjectProcessed,
    Complete,
}

/// A progress event handed to the status observer.
///
/// The observer may set `abort` to cancel the running walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStatus {
    pub state: ArchiveState,
    /// Percent, `0..=100`.
    pub progress: u8,
    pub abort: bool,
}

/// How a read or write walk ended.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Every object was processed.
    Complete,
    /// An abort was requested, the objects processed so far are kept.
    Cancelled,
}

/// The observer of an archive's progress events.
pub type StatusObserver<'a> = Box<dyn FnMut(&mut ArchiveStatus) + Send + 'a>;

// -----------------------------------------------------------------------------
// AbortHandle

/// A shareable abort flag.
///
/// Clones share the flag: a clone handed to another thread can cancel a running
/// read or write, which stops at the next element boundary.
///
/// # Examples
///
/// ```
/// use vc_reflect::persist::AbortHandle;
///
/// let handle = AbortHandle::new();
/// let remote = handle.clone();
///
/// std::thread::spawn(move || remote.abort()).join().unwrap();
/// assert!(handle.is_aborted());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    #[inline]
    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears a previous request.
    #[inline]
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

// -----------------------------------------------------------------------------
// StatusReporter

pub(crate) struct StatusReporter<'s, 'o> {
    observer: Option<&'s mut StatusObserver<'o>>,
    abort: &'s AbortHandle,
    flags: ArchiveFlags,
}

impl<'s, 'o> StatusReporter<'s, 'o> {
    pub fn new(
        observer: Option<&'s mut StatusObserver<'o>>,
        abort: &'s AbortHandle,
        flags: ArchiveFlags,
    ) -> Self {
        Self {
            observer,
            abort,
            flags,
        }
    }

    /// Hands an event to the observer.
    pub fn raise(&mut self, state: ArchiveState, progress: u8) {
        if let Some(observer) = self.observer.as_deref_mut() {
            let mut status = ArchiveStatus {
                state,
                progress: progress.min(100),
                abort: false,
            };
            observer(&mut status);
            if status.abort {
                self.abort.abort();
            }
        }
    }

    /// Reports a processed root element, returns `true` if an abort was requested.
    pub fn object_processed(&mut self, index: usize, count: usize) -> bool {
        if self.flags.contains(ArchiveFlags::STATUS) {
            self.raise(ArchiveState::ObjectProcessed, proportional(index, count));
        }
        self.abort.is_aborted()
    }

    /// Reports the end of the root element walk.
    pub fn finished(&mut self) {
        if self.flags.contains(ArchiveFlags::STATUS) {
            self.raise(ArchiveState::ObjectProcessed, 100);
        }
    }
}

#[inline]
pub(crate) fn proportional(index: usize, count: usize) -> u8 {
    if count == 0 {
        100
    } else {
        (index.min(count) * 100 / count) as u8
    }
}

// -----------------------------------------------------------------------------
// Tests
