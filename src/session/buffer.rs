//! Owned resettable output buffer shared between a reader task and the
//! session that polls it.

use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle to a growable byte buffer.
///
/// One clone lives in the reader task appending raw pipe output; the other
/// stays with the session, which polls for the sentinel and clears the
/// buffer after each completed command so memory stays bounded across
/// repeated calls. Contents are kept as bytes and decoded only when read,
/// so a multibyte character split across two pipe reads is reassembled
/// intact. The raw contents are never exposed by reference.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl OutputBuffer {
    /// New empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes to the buffer.
    pub fn extend(&self, bytes: &[u8]) {
        self.lock().extend_from_slice(bytes);
    }

    /// Append text to the buffer.
    pub fn push_str(&self, text: &str) {
        self.extend(text.as_bytes());
    }

    /// Byte index of the first occurrence of `needle`, if present.
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<usize> {
        let needle = needle.as_bytes();
        if needle.is_empty() {
            return Some(0);
        }
        self.lock()
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Decoded copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Take and decode the current contents, leaving the buffer empty.
    #[must_use]
    pub fn drain(&self) -> String {
        decode(std::mem::take(&mut *self.lock()))
    }

    /// Take and decode the first `end` bytes, discarding the rest.
    #[must_use]
    pub fn drain_to(&self, end: usize) -> String {
        let mut bytes = std::mem::take(&mut *self.lock());
        bytes.truncate(end);
        decode(bytes)
    }

    /// Discard the current contents.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether the buffer currently holds no output.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        // A reader task never panics while holding the lock; recover the
        // contents if it somehow did.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
