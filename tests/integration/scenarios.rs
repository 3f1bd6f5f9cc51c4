//! End-to-end scenarios.
//!
//! Component: Assembler + Preload + VM + Result Sink
//!
//! Each scenario runs a complete program from symbolic input to sink text.

#![cfg(test)]

use crate::common::*;

use tcscl::*;

#[test]
fn squared_difference_via_function() {
    // Arrange: A = 8.5, B = 7.341, f0 computes (A - B) * (A - B) into C
    let builder = ProgramBuilder::new()
        .load_float(0, 8.5)
        .load_float(1, 7.341)
        .call(0)
        .output_float(5, 2)
        .halt()
        .function(0)
        .binary(OpCode::SubFloat, 3, 0, 1)
        .binary(OpCode::MulFloat, 2, 3, 3)
        .ret();

    // Act
    let (_, report) = run(builder);

    // Assert
    assert_clean(&report);
    let diff = 8.5f32 - 7.341f32;
    assert!((single_float(&report, 5) - diff * diff).abs() < 1e-4);
    assert!((single_float(&report, 5) - 1.343281).abs() < 1e-4);
}

#[test]
fn preload_remove_output() {
    // Arrange
    let builder = ProgramBuilder::new()
        .list_preload(3, 3)
        .load_int(0, 0)
        .list_remove(3, 0)
        .output_list(9, 3)
        .halt();

    // Act
    let (_, report) = run_with(builder, "# fixture\n3: [1.0, 2.0, 3.0]\n", default_config());

    // Assert
    assert_eq!(report.to_text(), "9: [3.0, 2.0]\n");
}

#[test]
fn self_recursion_overflows_call_stack() {
    // Arrange: f0 calls itself 300 times before any return
    let builder = ProgramBuilder::new()
        .load_int(0, 300)
        .load_int(1, 1)
        .call(0)
        .halt()
        .function(0)
        .binary(OpCode::SubInt, 0, 0, 1)
        .jump_if_zero(0, 1)
        .call(0)
        .label(1)
        .ret();

    // Act
    let (machine, report) = run(builder);

    // Assert: 256 frames fit, the 257th call faults with r0 = 300 - 256
    match main_fault(&report) {
        VmError::StackOverflow { max_depth, .. } => assert_eq!(max_depth, MAX_CALL_DEPTH),
        other => panic!("Expected StackOverflow, got {}", other),
    }
    assert_int(&machine, 0, 300 - MAX_CALL_DEPTH as i32);
}

#[test]
fn shallow_recursion_unwinds() {
    // Arrange: recursion depth 200 stays under the limit
    let builder = ProgramBuilder::new()
        .load_int(0, 200)
        .load_int(1, 1)
        .call(0)
        .output_int(1, 2)
        .halt()
        .function(0)
        .binary(OpCode::AddInt, 2, 2, 1)
        .binary(OpCode::SubInt, 0, 0, 1)
        .jump_if_zero(0, 1)
        .call(0)
        .label(1)
        .ret();

    // Act
    let (_, report) = run(builder);

    // Assert
    assert_clean(&report);
    assert_eq!(report.to_text(), "1: 200\n");
}

#[test]
fn if_false_endif_resumes_after_block() {
    // Arrange
    let builder = ProgramBuilder::new()
        .if_(0)
        .output_int(1, 0)
        .end_if()
        .output_int(2, 0)
        .halt();

    // Act
    let (_, report) = run(builder);

    // Assert
    assert_eq!(report.to_text(), "2: 0\n");
}

#[test]
fn json_lines_sink_for_fan_out_run() {
    // Arrange
    let builder = ProgramBuilder::new()
        .load_int(0, 3)
        .output_int(1, 0)
        .halt()
        .function(2)
        .list_declare(5)
        .load_float(1, 0.5)
        .list_append(5, 1)
        .output_list(4, 5)
        .ret();

    // Act
    let (_, report) = run_with(builder, "", fan_out_config(false));
    let mut buffer = Vec::new();
    ResultSink::json_lines().write_to(&report.outputs, &mut buffer).unwrap();

    // Assert
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(
        text,
        "{\"id\":1,\"kind\":\"int\",\"value\":3,\"context\":\"main\"}\n\
         {\"id\":4,\"kind\":\"list\",\"value\":[0.5],\"context\":\"function 2\"}\n"
    );
}

#[test]
fn random_values_stay_in_unit_interval() {
    // Arrange: draw 500 values, count any outside [0, 1]
    let builder = ProgramBuilder::new()
        .load_int(0, 500)
        .load_int(1, 1)
        .load_float(2, 0.0)
        .load_float(3, 1.0)
        .label(0)
        .random(4)
        .binary(OpCode::LtFloat, 5, 4, 2)
        .binary(OpCode::AddInt, 6, 6, 5)
        .binary(OpCode::GtFloat, 5, 4, 3)
        .binary(OpCode::AddInt, 6, 6, 5)
        .binary(OpCode::SubInt, 0, 0, 1)
        .jump_if_not_zero(0, 0)
        .output_int(1, 6)
        .halt();

    // Act
    let (_, report) = run_with(builder, "", default_config().with_seed(99));

    // Assert
    assert_eq!(report.to_text(), "1: 0\n");
}
