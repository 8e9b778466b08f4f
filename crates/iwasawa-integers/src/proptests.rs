//! Property-based tests for the integer and modular layers.
