use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Default buffer size for reading files (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
/// Minimum buffer size (4 KiB)
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;
/// Maximum buffer size (1 MiB)
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Clamp a requested read-buffer size into the supported window.
/// Zero selects the default.
pub fn clamp_buffer_size(requested: usize) -> usize {
    if requested == 0 {
        return DEFAULT_BUFFER_SIZE;
    }
    requested.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE)
}

/// Pool of reusable read buffers shared by the workers of one validation
/// call. Buffers carry no data the next borrower depends on; the pool
/// amortizes allocation, nothing more.
#[derive(Debug)]
pub struct BufferPool {
    buffer_size: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: clamp_buffer_size(buffer_size),
            free: Mutex::new(Vec::new()),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Take a buffer from the pool, allocating a fresh one if none is free.
    /// The buffer is returned to the pool when the guard drops.
    pub fn checkout(&self) -> PooledBuf<'_> {
        let buf = {
            let mut free = self.free.lock().unwrap();
            free.pop()
        };
        PooledBuf {
            pool: self,
            buf: buf.unwrap_or_else(|| vec![0u8; self.buffer_size]),
        }
    }

    fn give_back(&self, buf: Vec<u8>) {
        // Buffers of a stale size are dropped rather than recycled
        if buf.len() != self.buffer_size {
            return;
        }
        let mut free = self.free.lock().unwrap();
        free.push(buf);
    }

    /// Number of buffers currently parked in the pool
    pub fn available(&self) -> usize {
        self.free.lock().unwrap().len()
    }
}

/// A buffer checked out of a [`BufferPool`], returned on drop
#[derive(Debug)]
pub struct PooledBuf<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuf<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuf<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for PooledBuf<'_> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_buffer_size() {
        assert_eq!(clamp_buffer_size(0), DEFAULT_BUFFER_SIZE);
        assert_eq!(clamp_buffer_size(1), MIN_BUFFER_SIZE);
        assert_eq!(clamp_buffer_size(64 * 1024), 64 * 1024);
        assert_eq!(clamp_buffer_size(16 * 1024 * 1024), MAX_BUFFER_SIZE);
    }

    #[test]
    fn test_checkout_and_return() {
        let pool = BufferPool::new(8 * 1024);
        assert_eq!(pool.available(), 0);

        {
            let buf = pool.checkout();
            assert_eq!(buf.len(), 8 * 1024);
        }
        assert_eq!(pool.available(), 1);

        // Reuses the parked buffer instead of allocating
        let _buf = pool.checkout();
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_buffer_is_writable() {
        let pool = BufferPool::new(0);
        let mut buf = pool.checkout();
        buf[0] = 0xAB;
        assert_eq!(buf[0], 0xAB);
        assert_eq!(buf.len(), DEFAULT_BUFFER_SIZE);
    }
}
