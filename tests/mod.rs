//! Test module organization.
//!
//! This module organizes all integration tests for the memory controller
//! simulator.




/// Controller request handling, issue arbitration, and completions.
mod controller_tests;


/// Fixed-access-time interleaving estimate.
mod interleave_tests;

/// Address decoding and bank partitioning.
mod mapping_tests;


/// Device timing file parsing and derived constraints.
mod timing_tests;
