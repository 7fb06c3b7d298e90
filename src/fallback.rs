use crate::locale::Language;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Characters of the user's input echoed back
pub const ECHO_LIMIT: usize = 140;

/// Builds the offline reply: an echo of the input plus one canned hint.
///
/// The hint is picked at random; pass a seeded rng via [`with_rng`] to make
/// the output reproducible.
///
/// [`with_rng`]: FallbackGenerator::with_rng
pub struct FallbackGenerator {
    language: Language,
    rng: Box<dyn RngCore + Send>,
}

impl FallbackGenerator {
    pub fn new(language: Language) -> Self {
        Self::with_rng(language, StdRng::from_entropy())
    }

    pub fn with_rng(language: Language, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            language,
            rng: Box::new(rng),
        }
    }

    pub fn generate(&mut self, input: &str) -> String {
        let hints = &self.language.strings().hints;
        let tip = hints[self.rng.gen_range(0..hints.len())];
        format!("{}\n{}", self.echo(input), tip)
    }

    /// The deterministic part of the reply
    pub fn echo(&self, input: &str) -> String {
        let strings = self.language.strings();
        format!(
            "{}{}{}",
            strings.echo_prefix,
            collapse_and_truncate(input),
            strings.echo_suffix
        )
    }

    /// Whether `reply` is something [`generate`](Self::generate) could have
    /// produced for `input`
    pub fn is_fallback_for(&self, input: &str, reply: &str) -> bool {
        let echo = self.echo(input);
        self.language
            .strings()
            .hints
            .iter()
            .any(|hint| reply == format!("{}\n{}", echo, hint))
    }
}

fn collapse_and_truncate(input: &str) -> String {
    let mut collapsed = String::with_capacity(input.len());
    let mut in_space = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
            }
            in_space = true;
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }
    collapsed.chars().take(ECHO_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(language: Language) -> FallbackGenerator {
        FallbackGenerator::with_rng(language, StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_echo_collapses_whitespace() {
        let generator = seeded(Language::English);
        assert_eq!(
            generator.echo("hello \n\t  world"),
            "You said: \"hello world\". Got it."
        );
    }

    #[test]
    fn test_echo_truncates_to_limit() {
        let generator = seeded(Language::Chinese);
        let long = "字".repeat(300);
        let echo = generator.echo(&long);
        assert_eq!(echo, format!("你说：\"{}\"。已收到。", "字".repeat(ECHO_LIMIT)));
    }

    #[test]
    fn test_generate_uses_a_known_hint() {
        let mut generator = seeded(Language::English);
        for _ in 0..20 {
            let reply = generator.generate("status?");
            assert!(generator.is_fallback_for("status?", &reply), "{}", reply);
        }
    }

    #[test]
    fn test_same_seed_same_reply() {
        let mut a = seeded(Language::Chinese);
        let mut b = seeded(Language::Chinese);
        assert_eq!(a.generate("你好"), b.generate("你好"));
    }
}
