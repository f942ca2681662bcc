//! Observer hooks for document substitution.
//!
//! An observer is told about every region before it is substituted and
//! about every replacement made, without changing the engine itself.
//!
//! # Example
//!
//! ```
//! use docxfill::fill::{FillAction, FillObserver};
//! use docxfill::model::{Region, RegionKind};
//!
//! struct BodyOnly;
//!
//! impl FillObserver for BodyOnly {
//!     fn visit_region(&mut self, region: &Region, _text: &str) -> FillAction {
//!         match region.kind {
//!             RegionKind::Header(_) | RegionKind::Footer(_) => FillAction::Skip,
//!             _ => FillAction::Continue,
//!         }
//!     }
//! }
//! ```

use serde::Serialize;

use crate::model::{EditOutcome, Region, RegionId, RegionKind};

/// Action returned by [`FillObserver::visit_region`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillAction {
    /// Substitute the region.
    #[default]
    Continue,

    /// Leave the region untouched.
    Skip,
}

impl FillAction {
    /// Check if this action indicates the region should be skipped.
    pub fn should_skip(&self) -> bool {
        matches!(self, FillAction::Skip)
    }
}

/// Trait for observing document substitution.
///
/// All methods do nothing by default.
pub trait FillObserver: Send + Sync {
    /// Called before a region is substituted.
    ///
    /// # Arguments
    /// * `region` - The region about to be substituted
    /// * `text` - Its flattened text
    fn visit_region(&mut self, region: &Region, text: &str) -> FillAction {
        let _ = (region, text);
        FillAction::Continue
    }

    /// Called for every token replaced in a region.
    fn on_replacement(&mut self, region: &Region, field: &str, value: &str) {
        let _ = (region, field, value);
    }

    /// Called after a region with at least one replacement was rewritten.
    ///
    /// # Arguments
    /// * `region` - The rewritten region
    /// * `count` - Number of tokens replaced in the region
    /// * `outcome` - How the region's runs were rewritten
    fn on_region_rewritten(&mut self, region: &Region, count: usize, outcome: EditOutcome) {
        let _ = (region, count, outcome);
    }
}

/// Observer that does nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopObserver;

impl NoopObserver {
    /// Create a new no-op observer.
    pub fn new() -> Self {
        Self
    }
}

impl FillObserver for NoopObserver {}

/// Observer that logs rewrites through the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver;

impl FillObserver for LoggingObserver {
    fn on_replacement(&mut self, region: &Region, field: &str, value: &str) {
        log::trace!(
            "region {}/{}: {{{{{}}}}} -> {:?}",
            region.id.part,
            region.id.paragraph,
            field,
            value
        );
    }

    fn on_region_rewritten(&mut self, region: &Region, count: usize, outcome: EditOutcome) {
        log::debug!(
            "region {}/{} ({:?}): {} replacement(s), {:?}",
            region.id.part,
            region.id.paragraph,
            region.kind,
            count,
            outcome
        );
        if outcome == EditOutcome::Collapsed {
            log::debug!(
                "region {}/{} collapsed: placeholder spans runs with different formatting",
                region.id.part,
                region.id.paragraph
            );
        }
    }
}

/// Observer that skips header and footer regions.
#[derive(Debug, Clone, Default)]
pub struct BodyOnlyObserver;

impl FillObserver for BodyOnlyObserver {
    fn visit_region(&mut self, region: &Region, _text: &str) -> FillAction {
        match region.kind {
            RegionKind::Header(_) | RegionKind::Footer(_) => FillAction::Skip,
            RegionKind::Body | RegionKind::TableCell => FillAction::Continue,
        }
    }
}

/// A replacement recorded by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementRecord {
    /// Region the replacement happened in
    pub region: RegionId,
    /// Region location
    pub kind: RegionKind,
    /// Field name
    pub field: String,
    /// Inserted value
    pub value: String,
}

/// Observer that records every replacement.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Replacements in the order they were made
    pub replacements: Vec<ReplacementRecord>,
    /// Regions that had to be collapsed
    pub collapsed: Vec<RegionId>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FillObserver for RecordingObserver {
    fn on_replacement(&mut self, region: &Region, field: &str, value: &str) {
        self.replacements.push(ReplacementRecord {
            region: region.id,
            kind: region.kind,
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    fn on_region_rewritten(&mut self, region: &Region, _count: usize, outcome: EditOutcome) {
        if outcome == EditOutcome::Collapsed {
            self.collapsed.push(region.id);
        }
    }
}

/// Composite observer that chains multiple observers.
///
/// Observers are called in order. The first observer that asks to skip a
/// region decides; notifications go to every observer.
pub struct CompositeObserver {
    observers: Vec<Box<dyn FillObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer to the chain.
    pub fn with_observer<O: FillObserver + 'static>(mut self, observer: O) -> Self {
        self.observers.push(Box::new(observer));
        self
    }
}

impl Default for CompositeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl FillObserver for CompositeObserver {
    fn visit_region(&mut self, region: &Region, text: &str) -> FillAction {
        for observer in &mut self.observers {
            let action = observer.visit_region(region, text);
            if action.should_skip() {
                return action;
            }
        }
        FillAction::Continue
    }

    fn on_replacement(&mut self, region: &Region, field: &str, value: &str) {
        for observer in &mut self.observers {
            observer.on_replacement(region, field, value);
        }
    }

    fn on_region_rewritten(&mut self, region: &Region, count: usize, outcome: EditOutcome) {
        for observer in &mut self.observers {
            observer.on_region_rewritten(region, count, outcome);
        }
    }
}
