use std::time::Duration;

pub const DEFAULT_CHUNK: usize = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(8);

/// Reveals text a few characters at a time
#[derive(Debug, Clone, Copy)]
pub struct Typewriter {
    chunk: usize,
    delay: Duration,
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK, DEFAULT_DELAY)
    }
}

impl Typewriter {
    pub fn new(chunk: usize, delay: Duration) -> Self {
        Self {
            chunk: chunk.max(1),
            delay,
        }
    }

    /// Passes `text` to `reveal` in chunks, sleeping between them. The first
    /// chunk goes out immediately. Returns the number of characters revealed,
    /// which is always the character count of `text`.
    pub async fn type_text<F>(&self, text: &str, mut reveal: F) -> usize
    where
        F: FnMut(&str),
    {
        let chars: Vec<char> = text.chars().collect();
        let mut revealed = 0;

        for (i, chunk) in chars.chunks(self.chunk).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.delay).await;
            }
            let piece: String = chunk.iter().collect();
            reveal(&piece);
            revealed += chunk.len();
        }

        revealed
    }
}
