use std::sync::Mutex;

/// Size of the buffers handed out by [`BufferPool`].
pub const BUFFER_SIZE: usize = 32 * 1024;

/// A plain pool of reusable byte buffers for copy loops.
///
/// Purely a performance detail: a buffer is acquired per write, never
/// shared between two in-flight writes, and returned on every exit path
/// by the [`PooledBuffer`] guard's `Drop`.
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub const fn new() -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Take a buffer out of the pool, allocating a fresh one when empty.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buffer = self
            .buffers
            .lock()
            .map(|mut buffers| buffers.pop())
            .unwrap_or(None)
            .unwrap_or_else(|| vec![0; BUFFER_SIZE]);

        PooledBuffer { pool: self, buffer }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard over a pooled buffer; returns it to the pool when dropped.
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buffer: Vec<u8>,
}

impl AsMut<[u8]> for PooledBuffer<'_> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Ok(mut buffers) = self.pool.buffers.lock() {
            buffers.push(std::mem::take(&mut self.buffer));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_allocates() {
        let pool = BufferPool::new();
        let mut buffer = pool.acquire();
        assert_eq!(buffer.as_mut().len(), BUFFER_SIZE);
    }

    #[test]
    fn test_release_on_drop_reuses() {
        let pool = BufferPool::new();

        {
            let mut buffer = pool.acquire();
            buffer.as_mut()[0] = 42;
        }

        // The buffer went back on drop; the next acquire reuses it.
        let mut buffer = pool.acquire();
        assert_eq!(buffer.as_mut()[0], 42);
        assert!(pool.buffers.lock().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_acquires_are_distinct() {
        let pool = BufferPool::new();

        let mut first = pool.acquire();
        let mut second = pool.acquire();

        first.as_mut()[0] = 1;
        second.as_mut()[0] = 2;
        assert_ne!(first.as_mut()[0], second.as_mut()[0]);
    }
}
