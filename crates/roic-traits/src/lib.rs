#![doc(issue_tracker_base_url = "https://github.com/factordynamics/roic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for ROIC quality analysis.
//!
//! This crate provides the vocabulary shared by the calculator, the data
//! sources and the outer surfaces: financial snapshots, quality assessments,
//! price projections, the error type, and the [`FundamentalsSource`] seam
//! through which fundamentals are retrieved.

/// The version of the roic-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod source;
pub mod types;

// Re-exports
pub use error::{Result, RoicError};
pub use source::{FundamentalsSource, InMemorySource};
pub use types::{
    AnnualFundamentals, CompanyFundamentals, Date, FinancialSnapshot, MoatRating, PriceProjection,
    ProjectedPrice, QualityAssessment, QualityTier, Symbol,
};
