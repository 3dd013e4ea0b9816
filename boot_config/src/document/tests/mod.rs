//! Unit tests for fragment parsing, directive classification and loading.

mod loader_tests;
