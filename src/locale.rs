//! Locale-aware integer formatting for counts in summary lines and the report.

/// Digit grouping rules for the current locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberLocale {
    separator: Option<char>,
}

impl NumberLocale {
    /// No grouping (the C/POSIX locale).
    pub fn plain() -> Self {
        Self { separator: None }
    }

    /// Group thousands with the given separator.
    pub fn grouped(separator: char) -> Self {
        Self {
            separator: Some(separator),
        }
    }

    /// Derive grouping from `LC_ALL`, `LC_NUMERIC` or `LANG`, in that order.
    pub fn from_env() -> Self {
        let lang = ["LC_ALL", "LC_NUMERIC", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .unwrap_or_default();
        Self::from_lang(&lang)
    }

    /// Derive grouping from a locale name such as `en_US.UTF-8`.
    pub fn from_lang(lang: &str) -> Self {
        let language = lang
            .split(['_', '.', '@', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "" | "c" | "posix" => Self::plain(),
            "en" | "ja" | "ko" | "zh" | "he" | "th" => Self::grouped(','),
            "de" | "it" | "nl" | "es" | "pt" | "da" | "id" | "tr" => Self::grouped('.'),
            "fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" | "uk" => Self::grouped(' '),
            _ => Self::plain(),
        }
    }

    /// Format an integer using this locale's grouping.
    pub fn format(&self, value: u64) -> String {
        let digits = value.to_string();
        let Some(sep) = self.separator else {
            return digits;
        };
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(sep);
            }
            out.push(ch);
        }
        out
    }
}
