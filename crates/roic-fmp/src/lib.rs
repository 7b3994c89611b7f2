//! Financial Modeling Prep (FMP) fundamentals source for ROIC analysis.
//!
//! This crate fetches the statements and market context the ROIC calculator
//! needs from the [Financial Modeling Prep](https://financialmodelingprep.com/)
//! stable API and exposes them through [`roic_traits::FundamentalsSource`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use roic_fmp::{FmpClient, Period};
//! use roic_traits::FundamentalsSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FmpClient::from_env()?;
//!
//!     // Raw vendor statements
//!     let income = client.income_statement("AAPL", Period::Annual, Some(5)).await?;
//!
//!     // Normalised record for the calculator
//!     let company = client.company("AAPL", 5).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `ROIC_FMP_API_KEY` (or `FMP_API_KEY`) in your environment or `.env` file:
//!
//! ```bash
//! ROIC_FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod source;
mod types;

pub use client::{API_KEY_VARS, FmpClient};
pub use error::FmpError;
pub use source::merge_statements;
pub use types::*;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
