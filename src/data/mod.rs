//! Data layer: typed base table, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawTable → ContractTable   (memoised by cache)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ ContractTable │  Vec<ContractRecord>, domains, value bounds
//!   └──────────────┘
//!        │                              │
//!        ▼                              ▼
//!   ┌──────────┐   ┌───────────┐   ┌────────────────┐
//!   │  filter   │ → │ aggregate │   │ private view    │  fixed criteria
//!   └──────────┘   └───────────┘   └────────────────┘
//!                        │
//!                        ▼
//!                   ┌──────────┐
//!                   │  export   │  CSV
//!                   └──────────┘
//! ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod views;
pub mod xlsx;
