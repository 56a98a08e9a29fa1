use std::collections::HashSet;

use pasmips::codegen::*;
use pasmips::parser::*;
use pasmips::Error;

fn push_count(instructions: &[Instruction]) -> usize {
    instructions
        .iter()
        .filter(|i| **i == Instruction::SubuImm(Register::Sp, Register::Sp, 4))
        .count()
}

fn pop_count(instructions: &[Instruction]) -> usize {
    instructions
        .iter()
        .filter(|i| **i == Instruction::AdduImm(Register::Sp, Register::Sp, 4))
        .count()
}

/// Instructions from `proc<name>:` up to and including its `jr $ra`.
fn procedure_body(assembly: &Assembly, name: &str) -> Vec<Instruction> {
    let label = format!("proc{name}");
    let lines = assembly
        .lines()
        .iter()
        .skip_while(|line| **line != Line::Label(label.clone()));

    let mut instructions = vec![];
    for line in lines {
        if let Line::Instruction(i) = line {
            instructions.push(i.clone());
            if *i == Instruction::Jr(Register::Ra) {
                break;
            }
        }
    }
    assert!(!instructions.is_empty(), "no procedure `{name}`");
    instructions
}

fn rendered(instructions: &[Instruction]) -> Vec<String> {
    instructions.iter().map(|i| i.to_string()).collect()
}

#[test]
fn frame_is_n_plus_two_words_whatever_the_body() {
    let bodies = [
        "p := 0;",
        "BEGIN a := 1 + 2 * (3 - 4); IF a < b + 1 THEN p := q(a, b, a * b); END;",
        "WHILE a < 10 DO BEGIN c := q(1, 2, 3) + q(a, b, c); a := a + 1; END;",
    ];
    let mut prologues = vec![];
    let mut epilogues = vec![];

    for body in bodies {
        let source = format!(
            "PROCEDURE q(x, y, z); q := x;
             PROCEDURE p(); VAR a, b, c; {body}
             WRITELN(p());"
        );
        let assembly = pasmips::compile(&source).unwrap();
        let instructions = procedure_body(&assembly, "p");

        // return slot, $ra and three locals: each push is two instructions
        let frame = 3 + 2;
        let prologue = &instructions[..2 * frame];
        let epilogue = &instructions[instructions.len() - 1 - 2 * frame..];
        assert_eq!(push_count(prologue), frame);
        assert_eq!(pop_count(epilogue), frame);
        assert_eq!(push_count(&instructions), pop_count(&instructions));

        prologues.push(prologue.to_vec());
        epilogues.push(epilogue.to_vec());
    }

    assert!(prologues.windows(2).all(|w| w[0] == w[1]));
    assert!(epilogues.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn prologue_and_epilogue_order() {
    let assembly = pasmips::compile("PROCEDURE f(); VAR a; f := 1; WRITELN(f());").unwrap();
    assert_eq!(
        rendered(&procedure_body(&assembly, "f")),
        vec![
            "subu $sp, $sp, 4",
            "sw $zero, ($sp)",
            "subu $sp, $sp, 4",
            "sw $ra, ($sp)",
            "subu $sp, $sp, 4",
            "sw $zero, ($sp)",
            "li $v0, 1",
            "sw $v0, 8($sp)",
            "lw $t0, ($sp)",
            "addu $sp, $sp, 4",
            "lw $ra, ($sp)",
            "addu $sp, $sp, 4",
            "lw $v0, ($sp)",
            "addu $sp, $sp, 4",
            "jr $ra",
        ]
    );
}

#[test]
fn condition_branches_on_the_negated_operator() {
    let cases = [
        ("<=", RelOp::GreaterThan, "bgt"),
        ("<", RelOp::GreaterEqual, "bge"),
        (">=", RelOp::LessThan, "blt"),
        (">", RelOp::LessEqual, "ble"),
        ("=", RelOp::NotEqual, "bne"),
        ("<>", RelOp::Equal, "beq"),
    ];

    for (op, negated, mnemonic) in cases {
        let assembly = pasmips::compile(&format!("IF 1 {op} 2 THEN WRITELN(1);")).unwrap();
        let branches: Vec<_> = assembly
            .instructions()
            .filter(|i| matches!(i, Instruction::Branch(..)))
            .collect();
        assert_eq!(branches.len(), 1, "{op}");

        let Instruction::Branch(emitted, Register::T0, Register::V0, label) = branches[0] else {
            panic!("unexpected branch {:?}", branches[0]);
        };
        assert_eq!(*emitted, negated, "{op}");
        assert_eq!(label, "endif1");
        assert_eq!(branch_mnemonic(*emitted), mnemonic);
        assert_eq!(
            branches[0].to_string(),
            format!("{mnemonic} $t0, $v0, endif1")
        );
    }
}

#[test]
fn negation_is_an_involution() {
    for op in [
        RelOp::Equal,
        RelOp::NotEqual,
        RelOp::LessThan,
        RelOp::LessEqual,
        RelOp::GreaterThan,
        RelOp::GreaterEqual,
    ] {
        assert_eq!(op.negate().negate(), op);
        for (l, r) in [(1, 2), (2, 2), (3, 2)] {
            assert_ne!(op.holds(l, r), op.negate().holds(l, r));
        }
    }
}

#[test]
fn labels_are_unique() {
    let input = "
VAR a;
PROCEDURE f(n);
BEGIN
  IF n > 0 THEN f := 1;
  WHILE n > 0 DO n := n - 1;
END;
BEGIN
  IF a = 0 THEN
    WHILE a < 3 DO
      IF a <> 1 THEN a := a + 1;
  IF a = 3 THEN a := f(a);
  WHILE a > 0 DO a := a - 1;
END.
";
    let assembly = pasmips::compile(input).unwrap();
    let labels: Vec<_> = assembly.labels().collect();
    let unique: HashSet<_> = labels.iter().collect();
    assert_eq!(labels.len(), unique.len(), "{labels:?}");

    // 4 IFs and 3 WHILEs
    let ids: HashSet<_> = labels
        .iter()
        .filter_map(|l| {
            l.strip_prefix("endwhile")
                .or_else(|| l.strip_prefix("while"))
                .or_else(|| l.strip_prefix("endif"))
        })
        .collect();
    assert_eq!(ids.len(), 7);
    assert_eq!(labels.iter().filter(|l| l.starts_with("endif")).count(), 4);
    assert_eq!(labels.iter().filter(|l| l.starts_with("while")).count(), 3);
    assert_eq!(labels.iter().filter(|l| l.starts_with("endwhile")).count(), 3);
}

#[test]
fn while_loop_shape() {
    let assembly = pasmips::compile("WHILE x < 5 DO x := x + 1;").unwrap();
    let text: Vec<_> = assembly.to_string().lines().map(str::to_string).collect();
    let begin = text.iter().position(|l| l == "while1:").unwrap();
    let end = text.iter().position(|l| l == "endwhile1:").unwrap();
    assert!(begin < end);
    assert_eq!(text[end - 1], "  j while1");
    assert!(text[begin..end].contains(&"  bge $t0, $v0, endwhile1".to_string()));
}

#[test]
fn offsets_at_statement_boundaries() {
    let input = "
PROCEDURE p(a, b);
VAR x, y;
BEGIN
  x := a;
  y := b;
  p := x;
END;
WRITELN(p(1, 2));
";
    let assembly = pasmips::compile(input).unwrap();
    let body = rendered(&procedure_body(&assembly, "p"));
    // 2 params, 2 locals: sp -> y, x, $ra, return slot, b, a
    let statements = &body[8..14];
    assert_eq!(
        statements,
        [
            "lw $v0, 20($sp)",
            "sw $v0, 4($sp)",
            "lw $v0, 16($sp)",
            "sw $v0, ($sp)",
            "lw $v0, 4($sp)",
            "sw $v0, 12($sp)",
        ]
    );
}

#[test]
fn offsets_follow_temporaries() {
    let input = "PROCEDURE p(a); VAR x; p := x + (a + p); WRITELN(p(1));";
    let assembly = pasmips::compile(input).unwrap();
    let loads: Vec<_> = rendered(&procedure_body(&assembly, "p"))
        .into_iter()
        .filter(|l| l.starts_with("lw $v0"))
        .collect();
    // x at depth 3, a at depth 4, p at depth 5; the final load is the epilogue
    assert_eq!(
        loads,
        vec!["lw $v0, ($sp)", "lw $v0, 16($sp)", "lw $v0, 16($sp)", "lw $v0, ($sp)"]
    );
}

fn procedure(name: &str, params: &[&str], locals: &[&str]) -> ProcedureDeclaration {
    ProcedureDeclaration {
        name: name.to_string(),
        params: params.iter().map(|s| s.to_string()).collect(),
        locals: locals.iter().map(|s| s.to_string()).collect(),
        body: Box::new(Statement::Block(vec![])),
    }
}

#[test]
fn resolve_order_and_globals() {
    let procedures = vec![procedure("f", &["a", "f"], &["a", "b"])];
    let mut ctx = Context::new(&procedures);

    assert_eq!(ctx.resolve("g"), Slot::Global("varg".to_string()));

    ctx.enter_procedure(&procedures[0]);
    assert_eq!(ctx.current_procedure().map(|p| p.name.as_str()), Some("f"));
    assert_eq!(ctx.depth(), 0);
    // the procedure's own name beats a parameter of the same name
    assert_eq!(ctx.resolve("f"), Slot::Stack(-4));
    // a local beats a parameter of the same name
    assert_eq!(ctx.resolve("a"), Slot::Stack(-12));
    assert_eq!(ctx.resolve("b"), Slot::Stack(-16));
    assert_eq!(ctx.resolve("h"), Slot::Global("varh".to_string()));
    ctx.leave_procedure().unwrap();

    assert_eq!(ctx.globals().collect::<Vec<_>>(), vec!["g", "h"]);
    assert!(ctx.current_procedure().is_none());
}

#[test]
fn label_ids_are_fresh() {
    let mut ctx = Context::new(&[]);
    let ids: Vec<_> = (0..5).map(|_| ctx.new_label_id()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn depth_is_restored_after_each_construct() {
    let program = pasmips::parse(
        "
PROCEDURE f(a, b); f := a * b;
BEGIN
  x := 1 + 2 * (3 - f(4, 5 % 2));
  IF x > -x THEN WRITELN(f(x, x) / 2);
  WHILE x >= 0 DO x := x - f(1, 1);
END.
",
    )
    .unwrap();
    let Statement::Block(stmts) = &program.body else {
        panic!();
    };

    let mut ctx = Context::new(&program.procedures);
    let mut codegen = Codegen::new();
    for stmt in stmts {
        codegen.gen_stmt(stmt, &mut ctx).unwrap();
        assert_eq!(ctx.depth(), 0);
        if let Statement::Assignment(_, expr) = stmt {
            codegen.gen_expr(expr, &mut ctx).unwrap();
            assert_eq!(ctx.depth(), 0);
        }
    }

    let f = &program.procedures[0];
    ctx.enter_procedure(f);
    codegen.gen_stmt(&f.body, &mut ctx).unwrap();
    assert_eq!(ctx.depth(), 0);
    ctx.leave_procedure().unwrap();

    let assembly = codegen.finish();
    assert_eq!(
        push_count(&assembly.instructions().cloned().collect::<Vec<_>>()),
        pop_count(&assembly.instructions().cloned().collect::<Vec<_>>())
    );
}

#[test]
fn nested_procedure_statement_is_internal_error() {
    let mut ctx = Context::new(&[]);
    let stmt = Statement::Procedure(procedure("inner", &[], &[]));
    let err = Codegen::new().gen_stmt(&stmt, &mut ctx).unwrap_err();
    assert!(matches!(err, Error::Internal(_)), "{err:?}");
}

#[test]
fn unknown_procedure() {
    let err = pasmips::compile("WRITELN(nope(1));").unwrap_err();
    assert!(matches!(err, Error::UnknownProcedure(ref name) if name == "nope"), "{err:?}");
}

#[test]
fn wrong_argument_count() {
    let err = pasmips::compile("PROCEDURE f(a); f := a; WRITELN(f(1, 2));").unwrap_err();
    let Error::ArityMismatch {
        name,
        expected,
        found,
    } = err
    else {
        panic!("expected an arity error, got {err:?}");
    };
    assert_eq!((name.as_str(), expected, found), ("f", 1, 2));
}

#[test]
fn data_section_lists_declared_and_referenced_globals() {
    let assembly = pasmips::compile(
        "
VAR b, a;
PROCEDURE f(); c := 1;
BEGIN a := f(); d := a; END.
",
    )
    .unwrap();
    let words: Vec<_> = assembly
        .lines()
        .iter()
        .filter_map(|line| match line {
            Line::Word(label) => Some(label.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(words, vec!["varb", "vara", "vard", "varc"]);

    let text = assembly.to_string();
    assert!(text.starts_with("  .data\n  newline: .asciiz \"\\n\"\n"));
    assert!(text.find(".data").unwrap() < text.find(".text").unwrap());
}

#[test]
fn main_exits_through_syscall() {
    let assembly = pasmips::compile("BEGIN END.").unwrap();
    let text = assembly.to_string();
    assert!(text.contains("  .globl main\nmain:\n  li $v0, 10\n  syscall\n"));
}

#[test]
fn labels_flush_left_everything_else_indented() {
    let assembly = pasmips::compile(
        "
PROCEDURE f(n); IF n > 0 THEN f := n;
BEGIN x := f(2); WHILE x > 0 DO x := x - 1; WRITELN(x); END.
",
    )
    .unwrap();
    for line in assembly.to_string().lines() {
        if line.ends_with(':') {
            assert!(!line.starts_with(' '), "{line:?}");
        } else {
            assert!(line.starts_with("  "), "{line:?}");
        }
    }
}

#[test]
fn global_access_goes_through_t0() {
    let assembly = pasmips::compile("BEGIN a := 3; WRITELN(a); END.").unwrap();
    let text = assembly.to_string();
    assert!(text.contains("  li $v0, 3\n  sw $v0, vara\n"));
    assert!(text.contains("  la $t0, vara\n  lw $v0, ($t0)\n  move $a0, $v0\n"));
}
