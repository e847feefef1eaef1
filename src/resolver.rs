//! Asset reference resolution
//!
//! Confirms that every asset a mod manifest names exists in the asset catalog
//! with the category the author declared. Resolution is read-only with
//! respect to the catalog.

use crate::catalog::{AssetCatalog, CatalogType};
use crate::manifest::{AssetCategory, ModRecord};
use serde::Serialize;
use std::fmt;

/// Record-level resolution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResolutionStatus {
    /// Not yet checked, or the catalog was still loading.
    Unresolved,
    Resolved,
    Missing,
    TypeMismatch,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Unresolved => "Unresolved",
            ResolutionStatus::Resolved => "Resolved",
            ResolutionStatus::Missing => "Missing",
            ResolutionStatus::TypeMismatch => "TypeMismatch",
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one asset reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReferenceOutcome {
    Resolved,
    Missing,
    TypeMismatch {
        expected: AssetCategory,
        /// `None` when the catalog's type maps to no supported category
        actual: Option<AssetCategory>,
    },
}

impl ReferenceOutcome {
    pub fn status(&self) -> ResolutionStatus {
        match self {
            ReferenceOutcome::Resolved => ResolutionStatus::Resolved,
            ReferenceOutcome::Missing => ResolutionStatus::Missing,
            ReferenceOutcome::TypeMismatch { .. } => ResolutionStatus::TypeMismatch,
        }
    }
}

/// Per-reference outcome, keyed by the reference's position in the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceResolution {
    pub index: usize,
    pub path: String,
    pub outcome: ReferenceOutcome,
}

/// Result of one resolver pass over a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub status: ResolutionStatus,

    /// One entry per asset reference, in declaration order.
    /// Empty when the pass was skipped because the catalog was not ready.
    pub references: Vec<ReferenceResolution>,
}

impl Resolution {
    pub fn unresolved() -> Self {
        Self {
            status: ResolutionStatus::Unresolved,
            references: Vec::new(),
        }
    }

    /// References that did not resolve, in declaration order.
    pub fn failures(&self) -> impl Iterator<Item = &ReferenceResolution> {
        self.references
            .iter()
            .filter(|r| r.outcome != ReferenceOutcome::Resolved)
    }

    pub fn is_resolved(&self) -> bool {
        self.status == ResolutionStatus::Resolved
    }
}

/// Resolve every asset reference of `record` against `catalog`.
///
/// The record is Resolved only when all of its references resolve (a record
/// without assets is trivially Resolved). Otherwise it takes the outcome of
/// the first failing reference in declaration order.
pub fn resolve<C: AssetCatalog + ?Sized>(record: &ModRecord, catalog: &C) -> Resolution {
    if !catalog.is_ready() {
        tracing::debug!(
            identifier = %record.identifier,
            "asset catalog not ready, leaving record unresolved"
        );
        return Resolution::unresolved();
    }

    let references: Vec<ReferenceResolution> = record
        .assets
        .iter()
        .enumerate()
        .map(|(index, asset)| {
            let outcome = match catalog.type_of(&asset.path) {
                None => ReferenceOutcome::Missing,
                Some(CatalogType::Known(actual)) if actual == asset.category => {
                    ReferenceOutcome::Resolved
                }
                Some(CatalogType::Known(actual)) => ReferenceOutcome::TypeMismatch {
                    expected: asset.category,
                    actual: Some(actual),
                },
                Some(CatalogType::Unknown) => ReferenceOutcome::TypeMismatch {
                    expected: asset.category,
                    actual: None,
                },
            };
            ReferenceResolution {
                index,
                path: asset.path.clone(),
                outcome,
            }
        })
        .collect();

    let status = references
        .iter()
        .map(|r| r.outcome.status())
        .find(|s| *s != ResolutionStatus::Resolved)
        .unwrap_or(ResolutionStatus::Resolved);

    Resolution { status, references }
}
