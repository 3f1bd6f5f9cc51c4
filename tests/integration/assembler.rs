//! Integration tests for the assembler.
//!
//! Component: Assembler/Linker
//!
//! These tests verify:
//! - Symbol resolution for labels and functions
//! - Structural errors (duplicates, unresolved, unbalanced, arity, range)
//! - Preload rewriting and the side table
//! - Symbolic JSON input and the disassembler

#![cfg(test)]

use crate::common::*;

use tcscl::*;

mod resolution {
    use super::*;

    #[test]
    fn forward_and_backward_labels_resolve() {
        // Arrange
        let builder = ProgramBuilder::new()
            .label(1)
            .jump(2)
            .label(2)
            .jump(1);

        // Act
        let assembly = assemble(builder);

        // Assert: LABEL(2) JUMP(2) LABEL(2) JUMP(2)
        let program = &assembly.program;
        assert_eq!(program.label_pc(1), Some(2));
        assert_eq!(program.label_pc(2), Some(6));
        assert_eq!(program.word(3), Some(Word::from_bits(6)));
        assert_eq!(program.word(7), Some(Word::from_bits(2)));
    }

    #[test]
    fn function_table_is_ordered_by_id() {
        // Arrange
        let builder = ProgramBuilder::new()
            .halt()
            .function(20)
            .ret()
            .function(3)
            .ret();

        // Act
        let assembly = assemble(builder);

        // Assert
        let functions: Vec<(u32, u32)> = assembly.program.functions().iter().map(|(&k, &v)| (k, v)).collect();
        assert_eq!(functions, vec![(3, 6), (20, 3)]);
    }

    #[test]
    fn conditional_jump_keeps_register_operand() {
        // Arrange
        let builder = ProgramBuilder::new().jump_if_not_zero(17, 0).label(0);

        // Act
        let assembly = assemble(builder);

        // Assert
        let words: Vec<u32> = assembly.program.words().iter().map(|w| w.bits()).collect();
        assert_eq!(words, vec![62, 17, 5, 2, 0]);
    }
}

mod errors {
    use super::*;

    #[test]
    fn duplicate_function_reports_first_definition() {
        // Arrange
        let builder = ProgramBuilder::new().function(5).ret().function(5).ret();

        // Act
        let error = assemble_err(builder);

        // Assert
        assert!(matches!(
            error,
            VmError::DuplicateSymbol { kind: SymbolKind::Function, id: 5, first_pc: 2, .. }
        ));
        assert_eq!(error.category(), ErrorCategory::Assembly);
    }

    #[test]
    fn unresolved_label_reports_instruction_index() {
        // Arrange
        let builder = ProgramBuilder::new().nop().nop().jump(3);

        // Act
        let error = assemble_err(builder);

        // Assert
        let location = error.location().copied().unwrap();
        assert_eq!(location, Location::new(2, 2));
        assert_eq!(error.code(), 1002);
    }

    #[test]
    fn stray_endif_is_unbalanced() {
        let error = assemble_err(ProgramBuilder::new().if_(0).end_if().end_if());
        assert!(matches!(error, VmError::UnbalancedConditional { .. }));
    }

    #[test]
    fn unclosed_if_is_unbalanced() {
        let error = assemble_err(ProgramBuilder::new().if_(0).if_(1).end_if());
        assert!(matches!(error, VmError::UnbalancedConditional { location, .. } if location.index == 0));
    }

    #[test]
    fn wrong_operand_count_is_rejected() {
        // Arrange
        let builder = ProgramBuilder::new().op(OpCode::Halt, &[Word::ONE]);

        // Act
        let error = assemble_err(builder);

        // Assert
        assert!(matches!(
            error,
            VmError::OperandArityMismatch { opcode: "HALT", expected: 0, found: 1, .. }
        ));
    }

    #[test]
    fn function_id_above_range_is_rejected() {
        let error = assemble_err(ProgramBuilder::new().function(MAX_FUNCTION_ID + 1).ret());
        assert!(matches!(error, VmError::SymbolOutOfRange { kind: SymbolKind::Function, .. }));
    }

    #[test]
    fn check_collects_all_scan_faults() {
        // Arrange
        let instrs = ProgramBuilder::new()
            .op(OpCode::Move, &[Word::ZERO])
            .function(600)
            .else_()
            .build();

        // Act
        let errors = Assembler::new().check(&instrs);

        // Assert
        let codes: Vec<u32> = errors.iter().map(VmError::code).collect();
        assert_eq!(codes, vec![1004, 1005, 1003]);
    }
}

mod preload_rewrite {
    use super::*;

    #[test]
    fn preload_keeps_every_pc() {
        // Arrange
        let with_preload = ProgramBuilder::new().list_preload(1, 1).label(4).jump(4);
        let with_nops = ProgramBuilder::new().nop().nop().nop().label(4).jump(4);

        // Act
        let a = assemble(with_preload);
        let b = assemble(with_nops);

        // Assert
        assert_eq!(a.program.words(), b.program.words());
        assert_eq!(a.preloads.len(), 1);
        assert!(b.preloads.is_empty());
    }

    #[test]
    fn side_table_keeps_program_order() {
        let assembly = assemble(
            ProgramBuilder::new()
                .list_preload(9, 100)
                .halt()
                .list_preload(2, 50),
        );
        let order: Vec<(u32, u32)> = assembly.preloads.iter().map(|b| (b.key, b.list)).collect();
        assert_eq!(order, vec![(100, 9), (50, 2)]);
        assert_eq!(assembly.preloads[1].pc, 4);
    }
}

mod interchange {
    use super::*;

    #[test]
    fn json_program_assembles_like_builder() {
        // Arrange
        let json = r#"[
            {"op": "LOAD_INT", "operands": [0, 3]},
            {"op": "CALL", "operands": [1]},
            {"op": "HALT"},
            {"op": "FUNCTION", "operands": [1]},
            {"op": "RETURN"}
        ]"#;
        let built = ProgramBuilder::new().load_int(0, 3).call(1).halt().function(1).ret();

        // Act
        let parsed = parse_symbolic_json(json).unwrap();
        let from_json = Assembler::new().assemble(&parsed).unwrap();

        // Assert
        assert_eq!(from_json, assemble(built));
    }

    #[test]
    fn json_conditional_block_with_negative_immediate_runs() {
        // Arrange
        let json = r#"[
            {"op": "LOAD_INT", "operands": [0, -5]},
            {"op": "IF", "operands": [0]},
            {"op": "OUTPUT_INT", "operands": [1, 0]},
            {"op": "ELSE"},
            {"op": "OUTPUT_INT", "operands": [2, 0]},
            {"op": "ENDIF"},
            {"op": "HALT"}
        ]"#;

        // Act
        let instrs = parse_symbolic_json(json).unwrap();
        let report = run_symbolic(&instrs, "", default_config()).unwrap();

        // Assert
        assert_clean(&report);
        assert_eq!(report.to_text(), "1: -5\n");
    }

    #[test]
    fn disassembly_lists_each_instruction() {
        let assembly = assemble(ProgramBuilder::new().list_preload(0, 0).call(0).halt().function(0).ret());
        let listing = disassemble(&assembly.program);
        let mnemonics: Vec<&str> = listing
            .lines()
            .map(|l| l.split_whitespace().nth(1).unwrap())
            .collect();
        assert_eq!(mnemonics, vec!["NOP", "NOP", "NOP", "CALL", "HALT", "FUNCTION", "RETURN"]);
    }
}
