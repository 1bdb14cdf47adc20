use regex::Regex;

/// Tunable markers for the scan. Defaults match the merchant page templates
/// the watcher was written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Lowercase substring that gates the order-number search.
    pub trigger: String,
    /// Quantity-label marker (matched case-insensitively).
    pub quantity_marker: String,
    /// Sublabel stone marker (matched case-insensitively).
    pub stone_marker: String,
    /// Detail-title package marker (matched case-sensitively).
    pub package_marker: String,
    /// Promotional phrase searched across the title/description battery.
    pub promo_phrase: String,
    /// Exact trimmed label of the messages button.
    pub message_button_label: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            trigger: "2 unidades".to_string(),
            quantity_marker: "2 unidades".to_string(),
            stone_marker: "com pedra".to_string(),
            package_marker: "1 pacote".to_string(),
            promo_phrase: "6mm Banhada Ouro Com Friso Prateado".to_string(),
            message_button_label: "Ver mensagens".to_string(),
        }
    }
}

/// The fixed, ordered list of order-number patterns.
///
/// Each pattern matches "label + optional '#' + digits"; the collected value
/// is the full match literal, not just the digit group.
#[derive(Debug, Clone)]
pub struct OrderPatterns {
    patterns: Vec<Regex>,
}

const ORDER_PATTERNS: [&str; 5] = [
    r"(?i)venda\s*#\s*(\d+)",
    r"(?i)pedido\s*#\s*(\d+)",
    r"(?i)ordem\s*#\s*(\d+)",
    r"(?i)venda\s*(\d{4,})",
    r"(?i)pedido\s*(\d{4,})",
];

impl OrderPatterns {
    pub fn new() -> Self {
        let patterns = ORDER_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("static order pattern"))
            .collect();
        Self { patterns }
    }

    /// Appends every match literal from `text` to `found`, preserving
    /// first-seen order and dropping exact-string duplicates.
    pub fn collect_into(&self, text: &str, found: &mut Vec<String>) {
        for pattern in &self.patterns {
            for m in pattern.find_iter(text) {
                let literal = m.as_str();
                if !found.iter().any(|seen| seen == literal) {
                    found.push(literal.to_string());
                }
            }
        }
    }
}

impl Default for OrderPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Size-token patterns for the female/male comparison in sublabel blocks.
#[derive(Debug, Clone)]
pub(crate) struct SizePatterns {
    female: Regex,
    male: Regex,
}

impl SizePatterns {
    pub(crate) fn new() -> Self {
        Self {
            female: Regex::new(r"(?i)Tamanho::?\s*Feminino\s*-\s*(\d+)").expect("static pattern"),
            male: Regex::new(r"(?i)Tamanho::?\s*Masculino\s*-\s*(\d+)").expect("static pattern"),
        }
    }

    /// Extracts (female, male) sizes when both tokens are present, in any
    /// order within the text.
    pub(crate) fn extract(&self, text: &str) -> Option<(u32, u32)> {
        let female = self.first_size(&self.female, text)?;
        let male = self.first_size(&self.male, text)?;
        Some((female, male))
    }

    fn first_size(&self, pattern: &Regex, text: &str) -> Option<u32> {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse().ok())
    }
}
