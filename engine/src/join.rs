//! Fan-in primitive for concurrently running fetches.
//!
//! A [`FetchGroup`] counts every [`Lease`] it hands out. Each lease reports
//! exactly once over a channel to the single collector: explicitly through
//! [`Lease::leave`], or as [`Outcome::Abandoned`] when it is dropped unreported
//! (the owning task panicked or was cancelled). [`FetchGroup::join`] therefore
//! returns after precisely `entered` reports and cannot hang on a lost task.
//!
//! The collector is the only code that sees the reports, so whatever it
//! accumulates needs no lock.

use tokio::sync::mpsc;

/// What a lease reported.
#[derive(Debug)]
pub enum Outcome<T> {
    Left(T),
    /// Dropped without calling [`Lease::leave`].
    Abandoned,
}

#[derive(Debug)]
struct Report<K, T> {
    key: K,
    outcome: Outcome<T>,
}

/// Report counts returned by [`FetchGroup::join`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub left: usize,
    pub abandoned: usize,
}

impl JoinStats {
    #[must_use]
    pub fn total(self) -> usize {
        self.left + self.abandoned
    }
}

/// Enter/leave accounting over an mpsc channel.
#[derive(Debug)]
pub struct FetchGroup<K, T> {
    tx: mpsc::UnboundedSender<Report<K, T>>,
    rx: mpsc::UnboundedReceiver<Report<K, T>>,
    entered: usize,
}

impl<K, T> Default for FetchGroup<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> FetchGroup<K, T> {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, entered: 0 }
    }

    /// Register one unit of outstanding work identified by `key`.
    pub fn enter(&mut self, key: K) -> Lease<K, T> {
        self.entered += 1;
        Lease {
            key: Some(key),
            tx: self.tx.clone(),
        }
    }

    #[must_use]
    pub fn entered(&self) -> usize {
        self.entered
    }

    /// Wait for every entered lease to report, handing each report to
    /// `on_report` in arrival order.
    pub async fn join<F>(self, mut on_report: F) -> JoinStats
    where
        F: FnMut(K, Outcome<T>),
    {
        let Self {
            tx,
            mut rx,
            entered,
        } = self;
        // Only leases hold senders from here on.
        drop(tx);

        let mut stats = JoinStats::default();
        while stats.total() < entered {
            let Some(report) = rx.recv().await else {
                // Unreachable while leases report on drop; a forgotten lease
                // keeps its sender alive instead of closing the channel.
                tracing::error!(
                    entered,
                    received = stats.total(),
                    "Fetch group channel closed early"
                );
                break;
            };
            match &report.outcome {
                Outcome::Left(_) => stats.left += 1,
                Outcome::Abandoned => stats.abandoned += 1,
            }
            on_report(report.key, report.outcome);
        }
        stats
    }
}

/// One unit of outstanding work. Reports exactly once.
#[derive(Debug)]
#[must_use = "dropping a lease reports it as abandoned"]
pub struct Lease<K, T> {
    key: Option<K>,
    tx: mpsc::UnboundedSender<Report<K, T>>,
}

impl<K, T> Lease<K, T> {
    pub fn leave(mut self, value: T) {
        self.send(Outcome::Left(value));
    }

    fn send(&mut self, outcome: Outcome<T>) {
        if let Some(key) = self.key.take() {
            // The collector may already be gone if the whole run was dropped.
            let _ = self.tx.send(Report { key, outcome });
        }
    }
}

impl<K, T> Drop for Lease<K, T> {
    fn drop(&mut self) {
        self.send(Outcome::Abandoned);
    }
}
