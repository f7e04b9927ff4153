// testgen - Human-in-the-loop test case generation
// Library exports

// Core modules
pub mod artifact;
pub mod errors;
pub mod providers;
pub mod refinement;

// Input and output
pub mod documents;
pub mod export;

// Service
pub mod cli;
pub mod config;
pub mod server;
