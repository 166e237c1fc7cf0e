//! # Selection Stage Types
//!
//! Portable stage enums for the two-step effect picker. These describe which
//! sheet is logically open without any rendering state.

use crate::views::catalog::EffectItem;
use crate::views::effects::EffectDomain;
use crate::views::words::WordLimits;
use serde::{Deserialize, Serialize};

/// A configurable effect waiting for its custom words.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEffect {
    /// Category the item was picked from
    pub category: String,
    /// The picked item
    pub item: EffectItem,
    /// Limits the collector enforces
    pub limits: WordLimits,
}

/// Where the single selection session currently is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionStage {
    /// No sheet open
    #[default]
    Closed,
    /// Category list open for a domain
    CategoryOpen(EffectDomain),
    /// Detail list open for a category
    DetailOpen {
        /// Domain being edited
        domain: EffectDomain,
        /// Category whose items are listed
        category: String,
    },
    /// Word collector open for a pending effect
    ConfiguringWords {
        /// Domain being edited (always active in the built-in catalog)
        domain: EffectDomain,
        /// Effect applied once words are saved
        pending: PendingEffect,
    },
}

impl SelectionStage {
    /// Domain the open sheet belongs to.
    #[must_use]
    pub fn domain(&self) -> Option<EffectDomain> {
        match self {
            Self::Closed => None,
            Self::CategoryOpen(domain)
            | Self::DetailOpen { domain, .. }
            | Self::ConfiguringWords { domain, .. } => Some(*domain),
        }
    }

    /// Sheet the host should be showing for this stage.
    #[must_use]
    pub fn sheet(&self) -> Option<Sheet> {
        match self {
            Self::Closed => None,
            Self::CategoryOpen(domain) => Some(Sheet::CategoryList(*domain)),
            Self::DetailOpen { domain, category } => Some(Sheet::DetailList {
                domain: *domain,
                category: category.clone(),
            }),
            Self::ConfiguringWords { domain, .. } => Some(Sheet::WordCollector(*domain)),
        }
    }

    /// Check if no sheet is open.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A presentable overlay.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sheet {
    /// Category list bottom sheet
    CategoryList(EffectDomain),
    /// Detail list modal
    DetailList {
        /// Domain
        domain: EffectDomain,
        /// Category listed
        category: String,
    },
    /// Free-text word collector
    WordCollector(EffectDomain),
}

/// Instruction for the host's presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetCommand {
    /// Mount and show the sheet
    Present(Sheet),
    /// Hide and unmount the sheet
    Dismiss(Sheet),
}
