/// Reusable, growable accumulation buffer for directive values.
///
/// Directive values may span many physical lines, so the parser appends
/// fragments here and trims line endings between fragments. `clear` keeps
/// the backing allocation so one buffer is reused across all directives in
/// a document. Growth never truncates; capacity management comes from the
/// standard allocator's doubling policy.
#[derive(Debug, Default)]
pub struct ValueBuffer {
    data: String,
}

impl ValueBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the buffer. PPD lines are at most 255 payload characters
    /// by convention, so 256 avoids reallocation for single-line values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: String::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, text: &str) {
        self.data.push_str(text);
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.data.ends_with(suffix)
    }

    /// Remove one trailing `\n` or `\r\n` pair. Mixed line endings can
    /// leave a stray `\r`; a second call removes it.
    pub fn trim_trailing_newline(&mut self) {
        if self.data.ends_with('\n') {
            self.data.pop();
        }
        if self.data.ends_with('\r') {
            self.data.pop();
        }
    }

    /// Shrink the logical length past any trailing whitespace.
    pub fn trim_trailing_whitespace(&mut self) {
        let trimmed = self.data.trim_end().len();
        self.data.truncate(trimmed);
    }

    /// Drop the last `n` characters (used to strip the `&&` continuation
    /// marker). No-op beyond the current length is not supported; callers
    /// check with [`ValueBuffer::ends_with`] first.
    pub fn truncate_chars(&mut self, n: usize) {
        let new_len = self.data.len().saturating_sub(n);
        self.data.truncate(new_len);
    }

    /// Reset logical length to zero without releasing the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn into_string(self) -> String {
        self.data
    }

    /// Remove the first character, in place. Used when stripping a leading
    /// quote from a completed value.
    pub fn remove_first(&mut self) {
        if !self.data.is_empty() {
            self.data.remove(0);
        }
    }

    /// Truncate at the last occurrence of `ch`, removing it and everything
    /// after it. Returns false if `ch` does not occur.
    pub fn truncate_at_last(&mut self, ch: char) -> bool {
        match self.data.rfind(ch) {
            Some(pos) => {
                self.data.truncate(pos);
                true
            }
            None => false,
        }
    }
}
