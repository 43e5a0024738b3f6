//! Integration tests for the provider bridge.

mod dispatcher;
