//! Integration tests for the Virtual Machine.
//!
//! Component: VM (Execution Engine)
//!
//! These tests verify:
//! - Data movement (LOAD, MOVE, CLEAR, ROUND, INT_TO_FLOAT)
//! - Arithmetic (int wrapping, float IEEE)
//! - Comparison and logic opcodes
//! - Control flow (JUMP, conditional jumps, CALL/RETURN, IF/ELSE)
//! - Context faults and instruction limits
//! - Fan-out execution

#![cfg(test)]

use crate::common::*;

use tcscl::*;

// =============================================================================
// Data Movement Tests
// =============================================================================

mod data_movement {
    use super::*;

    #[test]
    fn clear_writes_integer_zero() {
        // Arrange
        let builder = ProgramBuilder::new().load_float(0, 3.25).clear(0);

        // Act
        let (machine, report) = run(builder);

        // Assert
        assert_clean(&report);
        assert_eq!(machine.register(0), Some(Word::ZERO));
    }

    #[test]
    fn int_to_float_converts_value() {
        let (machine, _) = run(ProgramBuilder::new().load_int(0, -7).unary(OpCode::IntToFloat, 1, 0));
        assert_float(&machine, 1, -7.0, 0.0);
    }

    #[test]
    fn round_ties_toward_positive_infinity() {
        // Arrange
        let builder = ProgramBuilder::new()
            .load_float(0, 0.5)
            .unary(OpCode::Round, 1, 0)
            .load_float(0, -0.5)
            .unary(OpCode::Round, 2, 0)
            .load_float(0, 1.4)
            .unary(OpCode::Round, 3, 0);

        // Act
        let (machine, _) = run(builder);

        // Assert
        assert_int(&machine, 1, 1);
        assert_int(&machine, 2, 0);
        assert_int(&machine, 3, 1);
    }
}

// =============================================================================
// Arithmetic Tests
// =============================================================================

mod arithmetic {
    use super::*;

    fn int_op(op: OpCode, a: i32, b: i32) -> i32 {
        let (machine, _) = run(ProgramBuilder::new().load_int(0, a).load_int(1, b).binary(op, 2, 0, 1));
        machine.register(2).unwrap().as_int()
    }

    fn float_op(op: OpCode, a: f32, b: f32) -> f32 {
        let (machine, _) = run(ProgramBuilder::new().load_float(0, a).load_float(1, b).binary(op, 2, 0, 1));
        machine.register(2).unwrap().as_float()
    }

    #[test]
    fn integer_ops_wrap() {
        assert_eq!(int_op(OpCode::AddInt, i32::MAX, 1), i32::MIN);
        assert_eq!(int_op(OpCode::SubInt, i32::MIN, 1), i32::MAX);
        assert_eq!(int_op(OpCode::MulInt, 1 << 30, 4), 0);
        assert_eq!(int_op(OpCode::DivInt, i32::MIN, -1), i32::MIN);
    }

    #[test]
    fn integer_division_truncates_and_zero_divisor_yields_zero() {
        assert_eq!(int_op(OpCode::DivInt, -7, 2), -3);
        assert_eq!(int_op(OpCode::ModInt, -7, 2), -1);
        assert_eq!(int_op(OpCode::DivInt, 7, 0), 0);
        assert_eq!(int_op(OpCode::ModInt, 7, 0), 0);
    }

    #[test]
    fn float_ops_follow_ieee() {
        assert_eq!(float_op(OpCode::AddFloat, 0.5, 0.25), 0.75);
        assert_eq!(float_op(OpCode::DivFloat, 1.0, 0.0), f32::INFINITY);
        assert!(float_op(OpCode::DivFloat, 0.0, 0.0).is_nan());
        assert!(float_op(OpCode::SubFloat, f32::INFINITY, f32::INFINITY).is_nan());
    }

    #[test]
    fn int_and_float_views_share_bits() {
        // Arrange: ADD_INT on float bits is a bit-level operation
        let one = 1.0f32.to_bits() as i32;

        // Act
        let result = int_op(OpCode::AddInt, one, 1);

        // Assert
        assert_eq!(result as u32, 1.0f32.to_bits() + 1);
    }
}

// =============================================================================
// Comparison & Logic Tests
// =============================================================================

mod comparison_and_logic {
    use super::*;

    #[test]
    fn comparisons_write_one_or_zero() {
        // Arrange
        let builder = ProgramBuilder::new()
            .load_int(0, -1)
            .load_int(1, 1)
            .binary(OpCode::LtInt, 2, 0, 1)
            .binary(OpCode::EqInt, 3, 0, 1)
            .binary(OpCode::NeqInt, 4, 0, 1)
            .load_float(5, 2.0)
            .load_float(6, 2.0)
            .binary(OpCode::GteFloat, 7, 5, 6)
            .binary(OpCode::GtFloat, 8, 5, 6);

        // Act
        let (machine, _) = run(builder);

        // Assert
        assert_int(&machine, 2, 1);
        assert_int(&machine, 3, 0);
        assert_int(&machine, 4, 1);
        assert_int(&machine, 7, 1);
        assert_int(&machine, 8, 0);
    }

    #[test]
    fn int_comparison_is_signed() {
        let (machine, _) = run(ProgramBuilder::new()
            .load_int(0, -5)
            .load_int(1, 3)
            .binary(OpCode::GtInt, 2, 0, 1));
        assert_int(&machine, 2, 0);
    }

    #[test]
    fn and_or_treat_nonzero_as_true() {
        let (machine, _) = run(ProgramBuilder::new()
            .load_int(0, 4)
            .load_int(1, -2)
            .binary(OpCode::And, 2, 0, 1)
            .binary(OpCode::Or, 3, 0, 9)
            .binary(OpCode::And, 4, 0, 9));
        assert_int(&machine, 2, 1);
        assert_int(&machine, 3, 1);
        assert_int(&machine, 4, 0);
    }
}

// =============================================================================
// Control Flow Tests
// =============================================================================

mod control_flow {
    use super::*;

    #[test]
    fn counted_loop_with_jump_if_not_zero() {
        // Arrange: sum 1..=5 into r1
        let builder = ProgramBuilder::new()
            .load_int(0, 5)
            .load_int(2, 1)
            .label(0)
            .binary(OpCode::AddInt, 1, 1, 0)
            .binary(OpCode::SubInt, 0, 0, 2)
            .jump_if_not_zero(0, 0)
            .halt();

        // Act
        let (machine, report) = run(builder);

        // Assert
        assert_clean(&report);
        assert_int(&machine, 1, 15);
    }

    #[test]
    fn nested_calls_return_in_order() {
        // Arrange: f0 calls f1, each appends its id to output 1
        let builder = ProgramBuilder::new()
            .call(0)
            .load_int(9, 100)
            .output_int(1, 9)
            .halt()
            .function(0)
            .load_int(9, 0)
            .output_int(1, 9)
            .call(1)
            .ret()
            .function(1)
            .load_int(9, 1)
            .output_int(1, 9)
            .ret();

        // Act
        let (_, report) = run(builder);

        // Assert
        assert_eq!(report.to_text(), "1: 0\n1: 1\n1: 100\n");
    }

    #[test]
    fn nested_if_else_selects_inner_branch() {
        // Arrange
        let builder = ProgramBuilder::new()
            .load_int(0, 1)
            .if_(0)
            .if_(1)
            .load_int(2, 10)
            .else_()
            .load_int(2, 20)
            .end_if()
            .else_()
            .load_int(2, 30)
            .end_if()
            .halt();

        // Act
        let (machine, _) = run(builder);

        // Assert
        assert_int(&machine, 2, 20);
    }

    #[test]
    fn halt_stops_before_following_code() {
        let (machine, report) = run(ProgramBuilder::new().halt().load_int(0, 1));
        assert_clean(&report);
        assert_eq!(report.main().unwrap().instructions, 1);
        assert_int(&machine, 0, 0);
    }

    #[test]
    fn markers_execute_as_no_ops() {
        let (machine, _) = run(ProgramBuilder::new().label(3).function(8).load_int(0, 4));
        assert_int(&machine, 0, 4);
    }
}

// =============================================================================
// Fault Tests
// =============================================================================

mod faults {
    use super::*;

    #[test]
    fn unknown_opcode_in_raw_program() {
        // Arrange
        let program = Program::from_words(vec![Word::from_bits(OpCode::Nop.id()), Word::from_bits(4242)]);

        // Act
        let report = Machine::new(default_config()).run(&program);

        // Assert
        let error = main_fault(&report);
        assert!(matches!(error, VmError::UnknownOpcode { word: 4242, .. }));
        assert_eq!(error.location().unwrap().pc, 1);
        assert!(error.is_context_fatal());
    }

    #[test]
    fn register_index_beyond_file_faults() {
        let (_, report) = run(ProgramBuilder::new().mov(0, REGISTER_COUNT as u32));
        assert!(matches!(
            main_fault(&report),
            VmError::RegisterOutOfRange { index, max, .. } if index as usize == REGISTER_COUNT && max == REGISTER_COUNT - 1
        ));
    }

    #[test]
    fn instruction_limit_stops_infinite_loop() {
        // Arrange
        let builder = ProgramBuilder::new().label(0).jump(0);
        let config = default_config().with_instruction_limit(1_000);

        // Act
        let (_, report) = run_with(builder, "", config);

        // Assert
        assert!(matches!(main_fault(&report), VmError::InstructionLimitExceeded { limit: 1_000, .. }));
    }
}

// =============================================================================
// Fan-out Tests
// =============================================================================

mod fan_out {
    use super::*;

    fn counters_program() -> ProgramBuilder {
        // Each function writes its own register; main seeds r0.
        let mut builder = ProgramBuilder::new().load_int(0, 5).halt();
        for id in 0..8u32 {
            builder = builder
                .function(id)
                .load_int(100 + id, id as i32)
                .binary(OpCode::AddInt, 100 + id, 100 + id, 0)
                .ret();
        }
        builder
    }

    #[test]
    fn every_function_runs_after_main() {
        for parallel in [true, false] {
            // Act
            let (machine, report) = run_with(counters_program(), "", fan_out_config(parallel));

            // Assert
            assert_clean(&report);
            assert_eq!(report.contexts.len(), 9);
            for id in 0..8 {
                assert_int(&machine, 100 + id, id as i32 + 5);
            }
        }
    }

    #[test]
    fn faulting_function_does_not_stop_siblings() {
        // Arrange
        let builder = ProgramBuilder::new()
            .halt()
            .function(0)
            .load_int(9999, 1)
            .ret()
            .function(1)
            .load_int(7, 42)
            .ret();

        // Act
        let (machine, report) = run_with(builder, "", fan_out_config(true));

        // Assert
        let faults: Vec<ContextId> = report.faults().map(|(c, _)| c).collect();
        assert_eq!(faults, vec![ContextId::Function(0)]);
        assert!(report.context(ContextId::Function(1)).unwrap().status.is_halted());
        assert_int(&machine, 7, 42);
    }

    #[test]
    fn sequential_mode_ignores_functions() {
        let (machine, report) = run(counters_program());
        assert_eq!(report.contexts.len(), 1);
        assert_int(&machine, 103, 0);
    }

    #[test]
    fn fan_out_outputs_are_tagged_with_context() {
        // Arrange
        let builder = ProgramBuilder::new()
            .load_int(0, 1)
            .output_int(1, 0)
            .halt()
            .function(6)
            .output_int(2, 0)
            .ret();

        // Act
        let (_, report) = run_with(builder, "", fan_out_config(false));

        // Assert
        let contexts: Vec<ContextId> = report.outputs.iter().map(|e| e.context).collect();
        assert_eq!(contexts, vec![ContextId::Main, ContextId::Function(6)]);
    }
}
