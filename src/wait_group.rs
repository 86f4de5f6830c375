//! Tracks outstanding asynchronous flushes so `Sorter::output` and
//! `Sorter::close` can block until every worker's background write has
//! either landed or failed.

use std::sync::{Condvar, Mutex};

pub struct WaitGroup {
    count: Mutex<usize>,
    cv: Condvar,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            cv: Condvar::new(),
        }
    }

    pub fn add(&self, n: usize) {
        let mut count = self.count.lock().unwrap();
        *count += n;
    }

    pub fn done(&self) {
        let mut count = self.count.lock().unwrap();
        *count -= 1;
        if *count == 0 {
            self.cv.notify_all();
        }
    }

    pub fn wait_zero(&self) {
        let mut count = self.count.lock().unwrap();
        while *count != 0 {
            count = self.cv.wait(count).unwrap();
        }
    }
}
