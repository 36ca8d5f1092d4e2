//! Per-window cooperative event loop.
//!
//! A single-threaded tokio runtime with a [`LocalSet`]. Futures spawned on it
//! make progress only when the window's periodic tick pumps the loop, so they
//! run on the UI thread between toolkit callbacks and may hold `Rc` state.

use std::fmt;
use std::future::Future;
use std::io;

use tokio::runtime::{Builder, Runtime};
use tokio::task::{JoinHandle, LocalSet};

pub struct EventLoop {
    runtime: Runtime,
    local: LocalSet,
}

impl EventLoop {
    pub fn new() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_time().build()?;
        Ok(Self {
            runtime,
            local: LocalSet::new(),
        })
    }

    /// Schedule a future on the loop. It first runs on the next pump.
    pub fn spawn_local<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.local.spawn_local(future)
    }

    /// Give every ready task one non-blocking pass.
    pub fn run_once(&self) {
        self.local.block_on(&self.runtime, tokio::task::yield_now());
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn spawned_future_runs_on_pump() {
        let event_loop = EventLoop::new().unwrap();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        event_loop.spawn_local(async move { flag.set(true) });
        assert!(!done.get());
        event_loop.run_once();
        assert!(done.get());
    }

    #[test]
    fn pending_future_does_not_block() {
        let event_loop = EventLoop::new().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<u32>();
        let got = Rc::new(Cell::new(0));
        let sink = got.clone();
        event_loop.spawn_local(async move {
            if let Ok(value) = rx.await {
                sink.set(value);
            }
        });
        event_loop.run_once();
        assert_eq!(got.get(), 0);
        tx.send(7).unwrap();
        event_loop.run_once();
        assert_eq!(got.get(), 7);
    }
}
