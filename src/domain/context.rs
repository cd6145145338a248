//! Cancellation and deadline propagation for subprocess and network calls.
//!
//! A [`Context`] is cheap to clone and is passed by reference into every port
//! call. Cancelling the [`CancelHandle`] or reaching the deadline makes any
//! future wrapped by [`Context::run`] resolve with a [`ContextError`], which
//! drops (and therefore aborts) the wrapped work.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Context {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self {
            cancel: None,
            deadline: None,
        }
    }

    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let ctx = Self {
            cancel: Some(receiver),
            deadline: None,
        };
        (ctx, CancelHandle { sender })
    }

    /// Derives a child context whose deadline is the earlier of the parent's and `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        };
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn has_deadline(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns the reason this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if let Some(receiver) = &self.cancel {
            if *receiver.borrow() {
                return Some(ContextError::Canceled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once the context is canceled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        let canceled = async {
            match &self.cancel {
                Some(receiver) => {
                    let mut receiver = receiver.clone();
                    let outcome = receiver.wait_for(|canceled| *canceled).await.map(|_| ());
                    if outcome.is_err() {
                        // Handle dropped without canceling: never fires.
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = canceled => ContextError::Canceled,
            _ = expired => ContextError::DeadlineExceeded,
        }
    }

    /// Drives `future` until it completes or the context is done, whichever comes first.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        if let Some(reason) = self.err() {
            return Err(reason);
        }
        tokio::select! {
            biased;
            reason = self.done() => Err(reason),
            output = future => Ok(output),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
