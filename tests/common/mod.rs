//! Shared test utilities for tcscl integration tests.
//!
//! This module provides:
//! - Assembly and run helpers
//! - Configuration builders
//! - Assertion helpers for run reports
//!
//! ## AAA Pattern
//!
//! All tests follow the Arrange-Act-Assert pattern:
//! - Arrange: Build the symbolic program and configuration
//! - Act: Assemble and run it
//! - Assert: Verify outputs, registers, lists or faults

#![allow(dead_code)]

use tcscl::*;

// =============================================================================
// Assembly Utilities
// =============================================================================

/// Assemble a builder.
///
/// # Panics
/// Panics if assembly fails, which is appropriate for test code.
pub fn assemble(builder: ProgramBuilder) -> Assembly {
    builder.assemble().expect("Failed to assemble program")
}

/// Assemble and return the structural error.
pub fn assemble_err(builder: ProgramBuilder) -> VmError {
    match builder.assemble() {
        Ok(assembly) => panic!("Expected assembly error, got {} words", assembly.program.len()),
        Err(e) => e,
    }
}

// =============================================================================
// Configuration Builders
// =============================================================================

/// Sequential run with a fixed seed.
pub fn default_config() -> VmConfig {
    VmConfig::sequential().with_seed(0)
}

/// Fan-out run, optionally forced onto one thread.
pub fn fan_out_config(parallel: bool) -> VmConfig {
    VmConfig::fan_out().with_parallel(parallel)
}

// =============================================================================
// Run Utilities
// =============================================================================

/// Run a builder sequentially and keep the machine for inspection.
pub fn run(builder: ProgramBuilder) -> (Machine, RunReport) {
    run_with(builder, "", default_config())
}

/// Run a builder with preload text and configuration.
pub fn run_with(builder: ProgramBuilder, preload: &str, config: VmConfig) -> (Machine, RunReport) {
    let assembly = assemble(builder);
    let source = PreloadSource::parse(preload).expect("Failed to parse preload source");
    let machine = Machine::new(config);
    machine.preload(&assembly, &source);
    let report = machine.run(&assembly.program);
    (machine, report)
}

// =============================================================================
// Assertion Helpers
// =============================================================================

/// Assert that a register holds an integer value.
pub fn assert_int(machine: &Machine, reg: usize, expected: i32) {
    let actual = machine.register(reg).expect("register index in range").as_int();
    assert_eq!(actual, expected, "r{} = {}, expected {}", reg, actual, expected);
}

/// Assert that a register holds a float within tolerance.
pub fn assert_float(machine: &Machine, reg: usize, expected: f32, tolerance: f32) {
    let actual = machine.register(reg).expect("register index in range").as_float();
    assert!(
        (actual - expected).abs() <= tolerance,
        "r{} = {}, expected {} ± {}",
        reg,
        actual,
        expected,
        tolerance
    );
}

/// Assert that every context halted.
pub fn assert_clean(report: &RunReport) {
    let faults: Vec<String> = report.faults().map(|(c, e)| format!("{}: {}", c, e)).collect();
    assert!(faults.is_empty(), "Expected clean run, got faults: {:?}", faults);
}

/// The main context's fault.
pub fn main_fault(report: &RunReport) -> VmError {
    match &report.main().expect("main context report").status {
        ContextStatus::Faulted(e) => e.clone(),
        ContextStatus::Halted => panic!("Expected main context to fault"),
    }
}

/// Single float written under an output id.
pub fn single_float(report: &RunReport, id: u32) -> f32 {
    match report.values(id).as_slice() {
        [OutputValue::Float(v)] => *v,
        other => panic!("Expected one float for output {}, got {:?}", id, other),
    }
}
