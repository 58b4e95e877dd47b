use std::sync::{Condvar, Mutex};

use crate::error::{Error, Result};

struct State<T> {
    items: Vec<T>,
    closed: bool,
}

/// A blocking stack shared between the reader and the workers. Used both
/// for empty read buffers and for chunks waiting to be aggregated.
pub struct Pool<T> {
    inner: Mutex<State<T>>,
    cv: Condvar,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(State {
                items: Vec::new(),
                closed: false,
            }),
            cv: Condvar::new(),
        }
    }

    /// Blocks until an item is available. Returns `None` once the pool is
    /// closed and drained.
    pub fn take(&self) -> Result<Option<T>> {
        let mut guard = self.inner.lock().map_err(|_| Error::WorkerPanicked)?;
        loop {
            if let Some(taken) = guard.items.pop() {
                return Ok(Some(taken));
            }

            // if pool is empty and closed, terminate
            if guard.closed {
                return Ok(None);
            }

            // wait on condvar for pool to fill up again
            guard = self.cv.wait(guard).map_err(|_| Error::WorkerPanicked)?;
        }
    }

    pub fn put(&self, returned: T) -> Result<()> {
        let mut guard = self.inner.lock().map_err(|_| Error::WorkerPanicked)?;
        if !guard.closed {
            guard.items.push(returned);
            self.cv.notify_one();
        }
        Ok(())
    }

    /// No more items will arrive, waiters drain what is left and stop.
    pub fn close(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.closed = true;
        }
        self.cv.notify_all();
    }

    /// Like [`Pool::close`] but also drops anything still queued.
    pub fn abort(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.closed = true;
            guard.items.clear();
        }
        self.cv.notify_all();
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn drains_before_reporting_closed() {
        let pool = Pool::new();
        pool.put(1).unwrap();
        pool.put(2).unwrap();
        pool.close();
        assert_eq!(pool.take().unwrap(), Some(2));
        assert_eq!(pool.take().unwrap(), Some(1));
        assert_eq!(pool.take().unwrap(), None);
    }

    #[test]
    fn abort_drops_queued_items() {
        let pool = Pool::new();
        pool.put("a").unwrap();
        pool.abort();
        assert_eq!(pool.take().unwrap(), None);
        pool.put("b").unwrap();
        assert_eq!(pool.take().unwrap(), None);
    }

    #[test]
    fn waiting_taker_wakes_up() {
        let pool = Pool::new();
        thread::scope(|s| {
            let taker = s.spawn(|| {
                let mut seen = Vec::new();
                while let Some(item) = pool.take().unwrap() {
                    seen.push(item);
                }
                seen
            });
            for i in 0..100 {
                pool.put(i).unwrap();
            }
            pool.close();
            let mut seen = taker.join().unwrap();
            seen.sort();
            assert_eq!(seen, (0..100).collect::<Vec<_>>());
        });
    }
}
