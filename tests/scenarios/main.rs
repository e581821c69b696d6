//! Scenario-based tests for quay-pipeline

mod helpers;

mod failure_handling;
mod fan_out;
mod success_chain;
