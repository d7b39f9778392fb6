//! Middle-end tests

use crate::frontend::parse_program;
use crate::frontend::parser::ast::{BinOp, CmpOp};
use crate::frontend::parser::Category;
use crate::middle::bytecode::{Artifact, ArtifactError, MAGIC, VERSION};
use crate::middle::compiler::{Compiler, STDIN_NAME};
use crate::middle::ir::{ConstValue, Ir, IrKind};
use crate::middle::opcode::{Instruction, Opcode};
use crate::middle::translate::Translator;
use crate::middle::CompileError;

fn compile(code: &str) -> Artifact {
    let program = parse_program(code, None).unwrap();
    Compiler::new(program).compile().unwrap()
}

const COUNTDOWN: &str = "open sluice
declare x is 2 litres
while (x > 0 litres)
    declare x is (x - 1 litre)
done
close sluice
";

const BRANCH: &str = "open sluice
if (1 litre == 2 litres)
    print(\"a\")
else
    print(\"b\")
end
close sluice
";

#[cfg(test)]
mod translate_tests {
    use super::*;

    #[test]
    fn test_standard_covers_every_concrete_category() {
        let translator = Translator::standard();
        for category in Category::Statement.descendants() {
            if !category.is_abstract() {
                assert!(translator.supports(category), "{}", category);
            }
        }
        for category in Category::Expression.descendants() {
            if !category.is_abstract() {
                assert!(translator.supports(category), "{}", category);
            }
        }
        assert!(translator.supports(Category::Program));
    }

    #[test]
    fn test_missing_lowering() {
        let program = parse_program("open sluice\nx\nclose sluice\n", None).unwrap();
        let empty = Translator::new();
        assert_eq!(
            empty.translate_program(&program),
            Err(CompileError::MissingLowering(Category::Program))
        );
    }

    #[test]
    fn test_custom_lowering() {
        fn constant_program(
            _: &Translator,
            _: crate::middle::translate::NodeRef<'_>,
        ) -> Result<Ir, CompileError> {
            Ok(Ir::new(IrKind::Module(vec![Ir::new(IrKind::Const(ConstValue::Int(7)))])))
        }

        let mut translator = Translator::new();
        translator.register(&[Category::Program], constant_program);
        let program = parse_program("open sluice\nx\nclose sluice\n", None).unwrap();
        let ir = Compiler::with_translator(program, &translator).translate().unwrap();
        match ir.kind {
            IrKind::Module(items) => assert_eq!(items[0].kind, IrKind::Const(ConstValue::Int(7))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lines_come_from_spans() {
        let program = parse_program(COUNTDOWN, None).unwrap();
        let ir = Translator::standard().translate_program(&program).unwrap();
        let IrKind::Module(items) = &ir.kind else {
            panic!("expected a module");
        };
        assert_eq!(items[0].line, Some(2));
        assert_eq!(items[1].line, Some(3));
    }

    #[test]
    fn test_fill_lines_inherits_from_parent() {
        let mut ir = Ir::new(IrKind::Module(vec![
            Ir::new(IrKind::Discard(Box::new(Ir::new(IrKind::Name("a".into()))))).with_line(4),
            Ir::new(IrKind::Name("b".into())),
        ]));
        ir.fill_lines(1);

        let IrKind::Module(items) = &ir.kind else {
            panic!("expected a module");
        };
        assert_eq!(ir.line, Some(1));
        assert_eq!(items[0].line, Some(4));
        let IrKind::Discard(inner) = &items[0].kind else {
            panic!("expected a discard");
        };
        assert_eq!(inner.line, Some(4));
        assert_eq!(items[1].line, Some(1));
    }
}

#[cfg(test)]
mod codegen_tests {
    use super::*;

    #[test]
    fn test_declaration() {
        let artifact = compile("open sluice\ndeclare x is 3 litres\nclose sluice\n");
        assert_eq!(artifact.code, vec![Instruction::LoadConst(0), Instruction::StoreName(0)]);
        assert_eq!(artifact.constants, vec![ConstValue::Int(3)]);
        assert_eq!(artifact.names, vec!["x".to_string()]);
        assert_eq!(artifact.lines, vec![2, 2]);
        assert_eq!(artifact.source_name, STDIN_NAME);
    }

    #[test]
    fn test_loop_jumps() {
        let artifact = compile(COUNTDOWN);
        assert_eq!(
            artifact.code,
            vec![
                Instruction::LoadConst(0),
                Instruction::StoreName(0),
                Instruction::LoadName(0),
                Instruction::LoadConst(1),
                Instruction::Compare(CmpOp::Gt),
                Instruction::JumpIfFalse(11),
                Instruction::LoadName(0),
                Instruction::LoadConst(2),
                Instruction::Binary(BinOp::Sub),
                Instruction::StoreName(0),
                Instruction::Jump(2),
            ]
        );
        assert_eq!(artifact.lines, vec![2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 3]);
    }

    #[test]
    fn test_branch_jumps() {
        let artifact = compile(BRANCH);
        assert_eq!(
            artifact.code,
            vec![
                Instruction::LoadConst(0),
                Instruction::LoadConst(1),
                Instruction::Compare(CmpOp::Eq),
                Instruction::JumpIfFalse(8),
                Instruction::LoadConst(2),
                Instruction::Call { name: 0, argc: 1 },
                Instruction::Pop,
                Instruction::Jump(11),
                Instruction::LoadConst(3),
                Instruction::Call { name: 0, argc: 1 },
                Instruction::Pop,
            ]
        );
        assert_eq!(artifact.names, vec!["print".to_string()]);
    }

    #[test]
    fn test_constants_are_interned() {
        let artifact = compile("open sluice\nprint(1 litre, 1 litre, \"1\")\nclose sluice\n");
        assert_eq!(
            artifact.constants,
            vec![ConstValue::Int(1), ConstValue::String("1".to_string())]
        );
        assert!(artifact.validate().is_ok());
    }
}

#[cfg(test)]
mod artifact_tests {
    use super::*;

    #[test]
    fn test_bytes_roundtrip() {
        let artifact = compile(BRANCH);
        let bytes = artifact.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &MAGIC.to_be_bytes());
        assert_eq!(&bytes[4..8], &VERSION.to_le_bytes());
        assert_eq!(Artifact::from_bytes(&bytes).unwrap(), artifact);
    }

    #[test]
    fn test_every_constant_kind_survives() {
        let artifact = compile(
            "open sluice\nprint(4 litres, 2.5 litres, 'é', \"tab\\there\")\nclose sluice\n",
        );
        let loaded = Artifact::from_bytes(&artifact.to_bytes().unwrap()).unwrap();
        assert_eq!(loaded.constants, artifact.constants);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = compile(BRANCH).to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(Artifact::from_bytes(&bytes), Err(ArtifactError::BadMagic(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = compile(BRANCH).to_bytes().unwrap();
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            Artifact::from_bytes(&bytes),
            Err(ArtifactError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_truncated_file() {
        let bytes = compile(BRANCH).to_bytes().unwrap();
        assert!(matches!(
            Artifact::from_bytes(&bytes[..bytes.len() - 1]),
            Err(ArtifactError::Io(_))
        ));
    }

    #[test]
    fn test_operand_out_of_range() {
        let artifact = Artifact {
            code: vec![Instruction::LoadConst(5)],
            lines: vec![1],
            ..Artifact::default()
        };
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::OperandOutOfRange {
                index: 0,
                opcode: Opcode::LoadConst,
                operand: 5
            })
        ));
    }

    #[test]
    fn test_line_table_mismatch() {
        let artifact = Artifact {
            code: vec![Instruction::Pop],
            ..Artifact::default()
        };
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::LineTableMismatch { lines: 0, code: 1 })
        ));
    }

    #[test]
    fn test_disassemble_lists_instructions() {
        let listing = compile(BRANCH).disassemble();
        assert!(listing.contains("print"), "{}", listing);
        assert_eq!(listing.lines().count(), 1 + 11);
    }
}

#[cfg(test)]
mod compiler_tests {
    use super::*;
    use crate::prelude::{Capture, Prelude};
    use crate::runtime::{Environment, Value};
    use crate::vm::EnvMode;
    use crate::Error;

    #[test]
    fn test_dump_defaults_next_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("prog.sl");
        std::fs::write(&source, BRANCH).unwrap();

        let compiler = Compiler::from_file(&source).unwrap();
        let target = compiler.dump(None).unwrap();
        assert_eq!(target, dir.path().join("prog.sluc"));

        let loaded = Compiler::load(&target).unwrap();
        assert_eq!(loaded, compiler.compile().unwrap());
        assert_eq!(loaded.source_name, source.display().to_string());
    }

    #[test]
    fn test_dump_explicit_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");
        let compiler = Compiler::from_source(BRANCH, None).unwrap();
        assert_eq!(compiler.dump(Some(&target)).unwrap(), target);
        assert!(target.exists());
    }

    #[test]
    fn test_dump_needs_a_target() {
        let compiler = Compiler::from_source(BRANCH, None).unwrap();
        assert!(matches!(compiler.dump(None), Err(Error::NoDumpTarget)));
    }

    #[test]
    fn test_missing_file() {
        let err = Compiler::from_file(std::path::Path::new("/no/such/prog.sl")).err().unwrap();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_copy_mode_leaves_environment_alone() {
        let compiler = Compiler::from_source("open sluice\ndeclare x is 1 litre\nclose sluice\n", None).unwrap();

        let mut env = Environment::new();
        compiler.execute(&mut env, EnvMode::Copy).unwrap();
        assert!(env.get("x").is_none());

        compiler.execute(&mut env, EnvMode::Alias).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_evaluate_returns_new_environment() {
        let out = Capture::new();
        let base = Prelude::new().with_output(out.clone()).environment();
        let compiler = Compiler::from_source(BRANCH, None).unwrap();

        let env = compiler.evaluate(&base).unwrap();
        assert_eq!(out.contents(), "b\n");
        assert_eq!(env.bindings().len(), base.bindings().len());
    }
}
