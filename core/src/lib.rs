#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Tools for calling SNPs from pooled-sequencing pileup.
//!
//! This serves as the core library implementation for the `poolsnp` CLI, but can also be used as
//! a free-standing library for working with pileup of pooled samples.
//!
//! # Overview
//!
//! Sites are read one at a time from a [`pileup::Reader`]. The read bases of each sample are
//! decoded into [`Observation`]s and aggregated into [`AlleleCounts`] by [`SiteCounts`]. A
//! [`Caller`] then filters the site-wide alleles by count and frequency, and classifies each
//! sample into a [`Genotype`], using a [`MaxCoverageTable`] for per-sample coverage bounds.
//!
//! # Example
//!
//! ```
//! use poolsnp_core::{
//!     call::{Call, Config},
//!     pileup::Site,
//!     Caller, MaxCoverageTable,
//! };
//!
//! let table: MaxCoverageTable = "2L\t100,100\n".parse()?;
//! let caller = Caller::new(Config::default().set_min_cov(2).set_min_count(2), &table);
//!
//! let site = Site::parse(b"2L\t11\tA\t4\t..,T\tIIII\t4\t.,TT\tIIII")?;
//!
//! match caller.call(&site)? {
//!     Call::Record(record) => assert_eq!(
//!         record.to_string(),
//!         "2L\t11\t.\tA\tT\t.\t.\tADP=4.0;NC=0\tGT:RD:AD:DP:FREQ\t\
//!         0/1:3:1:4:0.25\t0/1:2:2:4:0.5"
//!     ),
//!     call => panic!("unexpected call: {call:?}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod allele;
pub use allele::{Base, Observation};

pub mod call;
pub use call::{Caller, Genotype};

pub mod count;
pub use count::{AlleleCounts, SiteCounts};

pub mod coverage;
pub use coverage::MaxCoverageTable;

pub mod input;
pub use input::Input;

pub mod mask;

pub mod pileup;

pub mod utils;
