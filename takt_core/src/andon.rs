//! Per-category abnormality counters.

use std::collections::BTreeMap;

/// Closed set of abnormality categories an operator can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AndonCategory {
    Quality,
    Material,
    Equipment,
    Safety,
    Other,
}

impl AndonCategory {
    pub const ALL: [Self; 5] = [
        Self::Quality,
        Self::Material,
        Self::Equipment,
        Self::Safety,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Material => "material",
            Self::Equipment => "equipment",
            Self::Safety => "safety",
            Self::Other => "other",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s {
            "quality" => Some(Self::Quality),
            "material" => Some(Self::Material),
            "equipment" => Some(Self::Equipment),
            "safety" => Some(Self::Safety),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl core::fmt::Display for AndonCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts of raised abnormality signals and how many have been acknowledged.
/// `total_acknowledged` never exceeds `total_issued`.
#[derive(Debug, Default)]
pub struct AndonTally {
    issued: BTreeMap<AndonCategory, u32>,
    total_issued: u32,
    total_acknowledged: u32,
}

impl AndonTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator raises an abnormality.
    pub fn signal(&mut self, category: AndonCategory) {
        *self.issued.entry(category).or_insert(0) += 1;
        self.total_issued += 1;
    }

    /// Team-leader response: acknowledges everything outstanding at once.
    /// Partial acknowledgement by category is not supported.
    pub fn acknowledge(&mut self) {
        self.total_acknowledged = self.total_issued;
    }

    pub fn total_issued(&self) -> u32 {
        self.total_issued
    }

    pub fn total_acknowledged(&self) -> u32 {
        self.total_acknowledged
    }

    pub fn issued_for(&self, category: AndonCategory) -> u32 {
        self.issued.get(&category).copied().unwrap_or(0)
    }

    pub fn outstanding(&self) -> u32 {
        self.total_issued - self.total_acknowledged
    }

    /// Display label: the plain total once fully acknowledged, otherwise
    /// "acknowledged + outstanding".
    pub fn display_label(&self) -> String {
        if self.total_acknowledged == self.total_issued {
            self.total_issued.to_string()
        } else {
            format!(
                "{} + {}",
                self.total_acknowledged,
                self.total_issued - self.total_acknowledged
            )
        }
    }

    /// Cleared at shift rollover.
    pub fn reset(&mut self) {
        self.issued.clear();
        self.total_issued = 0;
        self.total_acknowledged = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_splits_outstanding_signals() {
        let mut tally = AndonTally::new();
        for _ in 0..3 {
            tally.signal(AndonCategory::Quality);
        }
        tally.acknowledge();
        tally.signal(AndonCategory::Material);
        tally.signal(AndonCategory::Material);
        assert_eq!(tally.display_label(), "3 + 2");
        assert_eq!(tally.outstanding(), 2);
    }

    #[test]
    fn label_collapses_once_acknowledged() {
        let mut tally = AndonTally::new();
        for _ in 0..5 {
            tally.signal(AndonCategory::Equipment);
        }
        tally.acknowledge();
        assert_eq!(tally.display_label(), "5");
        assert_eq!(tally.issued_for(AndonCategory::Equipment), 5);
    }

    #[test]
    fn reset_clears_everything() {
        let mut tally = AndonTally::new();
        tally.signal(AndonCategory::Other);
        tally.reset();
        assert_eq!(tally.total_issued(), 0);
        assert_eq!(tally.display_label(), "0");
    }
}
