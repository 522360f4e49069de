//! # Codebook Core
//!
//! A sparse-coding dictionary learner for time-windowed sensor data.
//! Unlabeled frames are expressed as sparse combinations of learned basis
//! vectors, so downstream classifiers work on compact activation vectors
//! instead of raw high-dimensional frames.
//!
//! ## Quick Start
//!
//! ```rust
//! use codebook_core::{
//!     Codebook, LearnConfig, PartitionPolicy, SyntheticConfig, SyntheticDataset,
//! };
//!
//! // Frames drawn as sparse combinations of a hidden basis
//! let dataset = SyntheticDataset::generate(SyntheticConfig {
//!     dimension: 8,
//!     num_frames: 24,
//!     basis_size: 4,
//!     active_components: 2,
//!     noise_level: 0.01,
//!     seed: 7,
//! })
//! .unwrap();
//!
//! // Learn a 4-vector codebook with alternating optimization
//! let config = LearnConfig {
//!     partition: PartitionPolicy::PartitionSize(8),
//!     convergence_threshold: 0.05,
//!     alpha: 0.05,
//!     max_passes: 10,
//!     seed: 7,
//! };
//! let (codebook, result) = Codebook::learn(&dataset.frames, 4, &config).unwrap();
//!
//! // Encode frames into sparse activations
//! let activations = codebook.activate(&dataset.frames).unwrap();
//! assert_eq!(activations.num_frames(), 24);
//! println!("final error: {}", result.final_error);
//! ```
//!
//! ## Core Modules
//!
//! - [`data`] - Frame collections and batch partitioning
//! - [`codebook`] - Dictionary learning, activation, subset selection
//! - [`solver`] - L1-regularized least-squares solvers
//! - [`config`] - Learning configuration via TOML
//! - [`checkpoint`] - Versioned codebook persistence
//! - [`logging`] - JSON line-delimited pass logging

pub mod checkpoint;
pub mod cluster;
pub mod codebook;
pub mod config;
pub mod data;
pub mod logging;
pub mod similarity;
pub mod solver;

pub use checkpoint::{CheckpointError, Checkpointable, CODEBOOK_SNAPSHOT_VERSION};
pub use cluster::complete_linkage_partition;
pub use codebook::activation::ActivationMatrix;
pub use codebook::error::{CodebookError, CodebookResult};
pub use codebook::learning::{LearnConfig, LearnResult, PassMetrics};
pub use codebook::subset::empirical_entropy;
pub use codebook::Codebook;
pub use config::{CodebookConfig, ConfigError};
pub use data::synthetic::{SyntheticConfig, SyntheticDataset};
pub use data::{Frame, FrameCollection, PartitionPolicy};
pub use logging::{log_learn_result, log_pass, PassLogEntry};
pub use similarity::maximal_cross_correlation;
pub use solver::coordinate_descent::CoordinateDescent;
pub use solver::{SolverError, SparseSolver, Verbosity};
