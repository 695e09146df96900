use crate::config::ConfidenceWeights;

/// Aggregates stage confidences into the report's overall score.
pub struct ConfidenceScorer<'a> {
    weights: &'a ConfidenceWeights,
}

impl<'a> ConfidenceScorer<'a> {
    pub fn new(weights: &'a ConfidenceWeights) -> Self {
        Self { weights }
    }

    /// Rounded mean of the contributions: the foundation confidence when
    /// non-zero, the events weight when any event survived, the contacts
    /// weight when any contact survived. Falls back to the default weight.
    pub fn overall(&self, foundation_confidence: u8, events: usize, contacts: usize) -> u8 {
        let mut factors: Vec<u32> = Vec::with_capacity(3);
        if foundation_confidence > 0 {
            factors.push(u32::from(foundation_confidence));
        }
        if events > 0 {
            factors.push(u32::from(self.weights.events_found));
        }
        if contacts > 0 {
            factors.push(u32::from(self.weights.contacts_found));
        }

        if factors.is_empty() {
            return self.weights.default_overall;
        }

        let count = factors.len() as u32;
        let sum: u32 = factors.iter().sum();
        // Round half up
        let mean = (sum * 2 + count) / (count * 2);
        mean.min(100) as u8
    }
}
