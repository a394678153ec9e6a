//! Progress reporting for warps.
//!
//! A warp over a dense mesh can touch hundreds of faces; callers driving a
//! UI can observe per-face progress through a callback. A [`Progress`]
//! without a callback attached costs a single branch per report.
//!
//! # Example
//!
//! ```ignore
//! use nucleomesh::warp::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! ```

type ProgressFn = dyn Fn(usize, usize, &str) + Send + Sync;

/// A progress callback that receives updates during a warp.
///
/// The callback receives the number of faces completed so far, the total
/// face count, and a description of the current phase.
pub struct Progress {
    callback: Option<Box<ProgressFn>>,
}

impl Progress {
    /// Create a progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Create a progress reporter that discards all updates.
    pub fn none() -> Self {
        Self { callback: None }
    }

    /// Report progress to the attached callback, if any.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        if let Some(callback) = &self.callback {
            callback(current, total, message);
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("attached", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_progress_callback_invoked() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let progress = Progress::new(move |current, total, _| {
            assert!(current <= total);
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        progress.report(0, 10, "warping");
        progress.report(10, 10, "warping");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_none_discards() {
        Progress::none().report(5, 10, "ignored");
    }

    #[test]
    fn test_debug_shows_attachment() {
        assert_eq!(format!("{:?}", Progress::none()), "Progress { attached: false }");
        let attached = Progress::new(|_, _, _| {});
        assert_eq!(format!("{:?}", attached), "Progress { attached: true }");
    }
}
