//! # Integration Tests
//!
//! End-to-end behaviour of the simulator: reference traces, randomized
//! properties against a naive model, victim selection through a mocked
//! policy, and trace replay from files.
