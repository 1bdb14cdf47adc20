use crate::fingerprint::fingerprint_string;
use crate::patterns::{OrderPatterns, ScanConfig, SizePatterns};
use crate::snapshot::{PageSnapshot, Region, TabId};

/// One emitted (order-number, fingerprint, tab) observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionEvent {
    /// The full matched literal, e.g. `Venda #1234`.
    pub order_identifier: String,
    /// Stringified 32-bit hash of (page text + match + page url).
    pub content_fingerprint: String,
    pub source_tab_id: TabId,
}

/// A female/male size mismatch found in a sublabel block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeAlert {
    pub female_size: u32,
    pub male_size: u32,
    /// Formatted as `Tamanho Feminino (N) > Masculino (M)`.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightKind {
    /// Mark the whole element.
    WholeElement,
    /// Wrap the first case-insensitive occurrence of `phrase` in the
    /// element's markup.
    TextRange { phrase: String },
}

/// Instruction for the highlight pass, referring to a snapshot element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightDirective {
    pub element_id: u32,
    pub kind: HighlightKind,
}

/// Everything one scan cycle produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanOutcome {
    pub events: Vec<DetectionEvent>,
    pub size_alerts: Vec<SizeAlert>,
    /// Raw per-scan case labels, in detection order, duplicates kept.
    pub cases: Vec<String>,
    pub highlights: Vec<HighlightDirective>,
}

impl ScanOutcome {
    /// Case labels for the persistent banner: exact-string deduplicated,
    /// first-seen order. Empty means the banner must be removed.
    pub fn banner_cases(&self) -> Vec<String> {
        let mut deduped: Vec<String> = Vec::new();
        for case in &self.cases {
            if !deduped.iter().any(|seen| seen == case) {
                deduped.push(case.clone());
            }
        }
        deduped
    }
}

/// Pure scanner over page snapshots. Holds the compiled patterns so repeated
/// scans do not recompile them.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    orders: OrderPatterns,
    sizes: SizePatterns,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            orders: OrderPatterns::new(),
            sizes: SizePatterns::new(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Runs one scan cycle over a snapshot.
    ///
    /// `text_changed` is the caller's fingerprint comparison: when false the
    /// order-number search is skipped, but the condition checks and the
    /// highlight pass still run on every cycle.
    pub fn scan(&self, page: &PageSnapshot, text_changed: bool) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        if text_changed {
            self.scan_orders(page, &mut outcome);
        }
        self.check_conditions(page, &mut outcome);
        outcome
    }

    fn scan_orders(&self, page: &PageSnapshot, outcome: &mut ScanOutcome) {
        if !page.text.to_lowercase().contains(&self.config.trigger) {
            return;
        }

        let mut found: Vec<String> = Vec::new();
        self.orders.collect_into(&page.text, &mut found);
        for element in &page.elements {
            if element.region == Region::OrderContext {
                self.orders.collect_into(&element.text, &mut found);
            }
        }

        for order in found {
            let seed = format!("{}{}{}", page.text, order, page.url);
            outcome.events.push(DetectionEvent {
                content_fingerprint: fingerprint_string(&seed),
                order_identifier: order,
                source_tab_id: page.tab_id,
            });
        }
    }

    fn check_conditions(&self, page: &PageSnapshot, outcome: &mut ScanOutcome) {
        let promo_lower = self.config.promo_phrase.to_lowercase();

        for element in &page.elements {
            match element.region {
                Region::OrderContext => {}
                Region::Quantity => {
                    if element
                        .text
                        .to_lowercase()
                        .contains(&self.config.quantity_marker)
                    {
                        outcome.cases.push(self.config.quantity_marker.clone());
                        outcome.highlights.push(HighlightDirective {
                            element_id: element.id,
                            kind: HighlightKind::WholeElement,
                        });
                    }
                }
                Region::Sublabel => {
                    if element
                        .text
                        .to_lowercase()
                        .contains(&self.config.stone_marker)
                    {
                        outcome.cases.push(self.config.stone_marker.clone());
                        outcome.highlights.push(HighlightDirective {
                            element_id: element.id,
                            kind: HighlightKind::TextRange {
                                phrase: self.config.stone_marker.clone(),
                            },
                        });
                    }
                    if let Some((female, male)) = self.sizes.extract(&element.text) {
                        if female > male {
                            let message =
                                format!("Tamanho Feminino ({female}) > Masculino ({male})");
                            outcome.cases.push(message.clone());
                            outcome.highlights.push(HighlightDirective {
                                element_id: element.id,
                                kind: HighlightKind::WholeElement,
                            });
                            outcome.size_alerts.push(SizeAlert {
                                female_size: female,
                                male_size: male,
                                message,
                            });
                        }
                    }
                }
                Region::DetailTitle => {
                    if element.text.contains(&self.config.package_marker) {
                        outcome.cases.push(self.config.package_marker.clone());
                        outcome.highlights.push(HighlightDirective {
                            element_id: element.id,
                            kind: HighlightKind::WholeElement,
                        });
                    }
                }
                Region::TitleDescription => {
                    if element.text.to_lowercase().contains(&promo_lower) {
                        outcome.cases.push(self.config.promo_phrase.clone());
                        outcome.highlights.push(HighlightDirective {
                            element_id: element.id,
                            kind: HighlightKind::TextRange {
                                phrase: self.config.promo_phrase.clone(),
                            },
                        });
                    }
                }
                Region::MessageButton => {
                    if element.text.trim() == self.config.message_button_label {
                        outcome.cases.push(self.config.message_button_label.clone());
                        // Detected but never highlighted.
                    }
                }
            }
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}
