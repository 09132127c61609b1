use std::collections::HashMap;

/// Pool configuration for reusable pixel buffers.
#[derive(Debug, Clone, Copy)]
pub struct BufferPoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained buffers per `(w, h, format)` bucket.
    pub max_buffers_per_bucket: usize,
}

impl Default for BufferPoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_buffers_per_bucket: 4,
        }
    }
}

/// Pixel layout of a pooled buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferFormat {
    Gray8,
    Rgba8,
}

/// Shape of a pooled buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDesc {
    pub width: u32,
    pub height: u32,
    pub format: BufferFormat,
}

impl BufferDesc {
    pub fn gray(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: BufferFormat::Gray8,
        }
    }

    pub fn rgba(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: BufferFormat::Rgba8,
        }
    }

    pub fn byte_len(self) -> usize {
        let px = (self.width as usize).saturating_mul(self.height as usize);
        match self.format {
            BufferFormat::Gray8 => px,
            BufferFormat::Rgba8 => px.saturating_mul(4),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferPoolStats {
    pub retained_buffers: usize,
    pub retained_bytes: usize,
    pub alloc_buffers: u64,
    pub alloc_bytes: u64,
    pub reused_buffers: u64,
    pub dropped_on_release: u64,
}

/// Bounded pool of byte buffers keyed by `(width, height, format)`.
///
/// Buffers come back zeroed from [`BufferPool::borrow`], so nothing written during one tick is
/// visible to the next.
#[derive(Debug)]
pub struct BufferPool {
    opts: BufferPoolOpts,
    stats: BufferPoolStats,
    buckets: HashMap<BufferDesc, Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new(opts: BufferPoolOpts) -> Self {
        Self {
            opts,
            stats: BufferPoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub fn stats(&self) -> BufferPoolStats {
        self.stats.clone()
    }

    pub fn borrow(&mut self, desc: BufferDesc) -> Vec<u8> {
        let len = desc.byte_len();
        if let Some(mut buf) = self.buckets.get_mut(&desc).and_then(Vec::pop) {
            self.stats.retained_buffers = self.stats.retained_buffers.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(len);
            self.stats.reused_buffers = self.stats.reused_buffers.saturating_add(1);
            buf.clear();
            buf.resize(len, 0);
            return buf;
        }

        self.stats.alloc_buffers = self.stats.alloc_buffers.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(len as u64);
        vec![0u8; len]
    }

    pub fn release(&mut self, desc: BufferDesc, buf: Vec<u8>) {
        let bytes = desc.byte_len();
        if self.opts.max_pool_bytes == 0
            || self.opts.max_buffers_per_bucket == 0
            || buf.len() != bytes
            || self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(desc).or_default();
        if bucket.len() >= self.opts.max_buffers_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(buf);
        self.stats.retained_buffers = self.stats.retained_buffers.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(BufferPoolOpts::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/pool.rs"]
mod tests;
