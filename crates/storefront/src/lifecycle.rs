//! View lifecycle: scoped loads and transient notices.
//!
//! A handler mounts a [`ViewScope`] for the page it renders. Loads the page
//! needs are spawned into the scope and awaited with [`ViewScope::settle`].
//! If the scope is dropped first (the client went away, or the handler bailed
//! out), outstanding loads are aborted and their slices return to idle.
//!
//! Transient notices such as "Default address changed" are stored as expiry
//! timestamps on a per-session [`NoticeBoard`]. Nothing runs in the
//! background; a notice is simply not shown once its time is up.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tokio::task::JoinSet;

use crate::store::SliceError;

/// How long a notice stays visible.
pub const NOTICE_SECS: i64 = 3;

/// A message shown until `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub message: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// Per-session notices, keyed by the view that shows them.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    inner: Arc<Mutex<BoardInner>>,
}

#[derive(Debug, Default)]
struct BoardInner {
    mounted: Option<&'static str>,
    notices: HashMap<&'static str, Notice>,
}

impl NoticeBoard {
    /// Record that `view` is now on screen.
    ///
    /// Moving to a different view tears the previous one down, which drops
    /// its notice.
    fn mount(&self, view: &'static str) {
        let mut inner = self.inner.lock();
        if let Some(previous) = inner.mounted.replace(view)
            && previous != view
        {
            inner.notices.remove(previous);
        }
    }

    /// Show `message` on `view` from `now`, replacing any current notice.
    fn flash(&self, view: &'static str, message: &'static str, now: DateTime<Utc>) {
        let notice = Notice {
            message,
            expires_at: now + TimeDelta::seconds(NOTICE_SECS),
        };
        self.inner.lock().notices.insert(view, notice);
    }

    /// The notice for `view` if it has not expired at `now`.
    fn active(&self, view: &'static str, now: DateTime<Utc>) -> Option<Notice> {
        let mut inner = self.inner.lock();
        match inner.notices.get(view).copied() {
            Some(notice) if now < notice.expires_at => Some(notice),
            Some(_) => {
                inner.notices.remove(view);
                None
            }
            None => None,
        }
    }
}

/// The lifetime of one rendered view.
pub struct ViewScope {
    view: &'static str,
    notices: NoticeBoard,
    loads: JoinSet<Result<(), SliceError>>,
}

impl ViewScope {
    /// Mount `view`, tearing down whichever view was mounted before it.
    #[must_use]
    pub fn mount(view: &'static str, notices: &NoticeBoard) -> Self {
        notices.mount(view);
        tracing::trace!(view, "view mounted");
        Self {
            view,
            notices: notices.clone(),
            loads: JoinSet::new(),
        }
    }

    /// Start a load owned by this view.
    pub fn spawn<F>(&mut self, load: F)
    where
        F: Future<Output = Result<(), SliceError>> + Send + 'static,
    {
        self.loads.spawn(load);
    }

    /// Wait for every spawned load and return the errors they stored.
    pub async fn settle(&mut self) -> Vec<SliceError> {
        let mut errors = Vec::new();
        while let Some(joined) = self.loads.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => errors.push(err),
                Err(err) if err.is_cancelled() => {}
                Err(err) => tracing::error!(view = self.view, error = %err, "load panicked"),
            }
        }
        errors
    }

    /// Show `message` on this view for the next few seconds.
    pub fn flash(&self, message: &'static str, now: DateTime<Utc>) {
        self.notices.flash(self.view, message, now);
    }

    /// This view's notice, if one is still showing at `now`.
    #[must_use]
    pub fn notice(&self, now: DateTime<Utc>) -> Option<Notice> {
        self.notices.active(self.view, now)
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        if !self.loads.is_empty() {
            tracing::debug!(
                view = self.view,
                pending = self.loads.len(),
                "view torn down with loads in flight"
            );
            self.loads.abort_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use scamazon_core::LoadStatus;

    use super::*;
    use crate::store::{BasketAction, StalePolicy, Store};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::UNIX_EPOCH + TimeDelta::seconds(secs)
    }

    #[test]
    fn test_notice_expires_after_three_seconds() {
        let board = NoticeBoard::default();
        let scope = ViewScope::mount("addresses", &board);
        scope.flash("Default address changed", at(0));

        assert_eq!(
            scope.notice(at(2)).map(|n| n.message),
            Some("Default address changed")
        );
        assert!(scope.notice(at(3)).is_none());
    }

    #[test]
    fn test_retrigger_restarts_window() {
        let board = NoticeBoard::default();
        let scope = ViewScope::mount("addresses", &board);
        scope.flash("Default address changed", at(0));
        scope.flash("Default address changed", at(2));

        assert!(scope.notice(at(4)).is_some());
        assert!(scope.notice(at(5)).is_none());
    }

    #[test]
    fn test_notice_survives_remount_of_same_view() {
        let board = NoticeBoard::default();
        ViewScope::mount("addresses", &board).flash("Default address changed", at(0));

        let scope = ViewScope::mount("addresses", &board);
        assert!(scope.notice(at(1)).is_some());
    }

    #[test]
    fn test_leaving_view_clears_notice() {
        let board = NoticeBoard::default();
        ViewScope::mount("addresses", &board).flash("Default address changed", at(0));
        drop(ViewScope::mount("basket", &board));

        let scope = ViewScope::mount("addresses", &board);
        assert!(scope.notice(at(1)).is_none());
    }

    #[tokio::test]
    async fn test_settle_collects_errors() {
        let board = NoticeBoard::default();
        let mut scope = ViewScope::mount("product", &board);
        scope.spawn(async { Ok(()) });
        scope.spawn(async { Err(SliceError::NotFound) });

        assert_eq!(scope.settle().await, vec![SliceError::NotFound]);
    }

    #[tokio::test]
    async fn test_teardown_cancels_loads() {
        let store = Store::new(StalePolicy::default());
        let board = NoticeBoard::default();
        let mut scope = ViewScope::mount("basket", &board);

        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let task_store = store.clone();
        scope.spawn(async move {
            let request = task_store.start::<BasketAction>();
            let _ = started_tx.send(());
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(request);
            Ok(())
        });

        started_rx.await.ok();
        assert!(store.select(|s| s.basket.meta().is_loading()));

        drop(scope);
        // Aborted tasks are dropped on the runtime; give it a turn
        for _ in 0..10 {
            if !store.select(|s| s.basket.meta().is_loading()) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(
            store.select(|s| s.basket.meta().status()),
            LoadStatus::Idle
        );
    }
}
