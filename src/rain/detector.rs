//! Keyword-based rain detection over forecast phrases

/// Decides whether a forecast phrase announces rain
#[derive(Debug, Clone)]
pub struct RainDetector {
    keywords: Vec<String>,
}

impl RainDetector {
    /// Build a detector from rain-indicating substrings; blank keywords are ignored
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self { keywords }
    }

    /// Case-insensitive substring match against any keyword
    #[must_use]
    pub fn is_rainy(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}
