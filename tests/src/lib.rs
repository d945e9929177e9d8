//! # SPS Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion throughput benchmarks
//! └── src/integration/  # end-to-end behaviour through the public API
//!     ├── delivery.rs     # ordering, isolation, idempotent subscribe
//!     ├── retention.rs    # collector vs. lagging subscribers
//!     ├── lifecycle.rs    # close, drain, reuse after close
//!     ├── concurrency.rs  # many publishers, many topics
//!     └── model.rs        # randomized operations against a reference model
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sps-tests
//! cargo test -p sps-tests integration::retention
//! cargo bench -p sps-tests
//! ```

pub mod integration;
