use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn minipascal() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_minipascal"));
    command.env_remove("RUST_LOG");
    command
}

/// Runs the interpreter on a source file and compares its standard output to
/// the `.expected` file next to it. A `.stderr` file marks a program that must
/// fail; its contents must then appear in the error output.
fn test_program(source_file: &Path) {
    let expected_output_file = source_file.with_extension("expected");
    let expected_output = fs::read_to_string(&expected_output_file).unwrap_or_else(|_| {
        panic!("Failed to read expected output file {}", expected_output_file.display())
    });

    let output = minipascal()
        .arg(source_file)
        .output()
        .expect("Failed to run interpreter");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(
        stdout.trim(),
        expected_output.trim(),
        "Test failed for: {:?}",
        source_file
    );

    match fs::read_to_string(source_file.with_extension("stderr")) {
        Ok(expected_error) => {
            assert!(!output.status.success(), "{:?} should fail", source_file);
            assert!(
                stderr.contains(expected_error.trim()),
                "{:?}: error output was\n{}",
                source_file,
                stderr
            );
        }
        Err(_) => assert!(output.status.success(), "{:?} failed:\n{}", source_file, stderr),
    }
}

#[test]
fn test_all_pas_files() {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/programs");

    let mut count = 0;
    for entry in fs::read_dir(&test_dir).expect("Failed to read test directory") {
        let path = entry.expect("Failed to read directory entry").path();

        if path.extension().and_then(|s| s.to_str()) == Some("pas") {
            test_program(&path);
            count += 1;
        }
    }
    assert!(count > 0, "no programs found in {}", test_dir.display());
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn expression_flag_prints_the_value() {
    let output = minipascal().args(["-e", "(1+2)*(3+4)"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "21\n");
}

#[test]
fn ast_flag_prints_the_tree_without_running() {
    // the division would fail if the program were run
    let output = minipascal().args(["--ast", "-e", "1 DIV 0"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "BinOp DIV\n  Num 1\n  Num 0\n");
}

#[test]
fn dot_flag_prints_a_digraph() {
    let output = minipascal().args(["--dot", "--expr=-x"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        "digraph ast {\n  \
         node [shape=box];\n  \
         n0 [label=\"UnaryOp(-)\"];\n  \
         n1 [label=\"Var(x)\"];\n  \
         n0 -> n1;\n\
         }\n"
    );
}

#[test]
fn check_flag_forces_the_semantic_pass() {
    let output = minipascal()
        .args(["--check", "always", "tests/programs/nested.pas"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("undeclared variable 'a'"));
}

#[test]
fn missing_file_is_reported() {
    let output = minipascal().arg("no/such/file.pas").output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error reading file"));
}

#[test]
fn prompt_runs_each_line_in_a_fresh_scope() {
    let mut child = minipascal()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(
            b"2 + 3\n\
              BEGIN x := 1 END.\n\
              \n\
              x\n\
              VAR a : INTEGER; BEGIN a := 1 END.\n\
              { header } BEGIN x := 2 END.\n\
              PROGRAM p; BEGIN y := 3 END.\n\
              VAR a : INTEGER; BEGIN b := a END.\n\
              quit\n\
              BEGIN z := 4 END.\n",
        )
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        "minipascal> 5\n\
         minipascal> x = 1\n\
         minipascal> \
         minipascal> \
         minipascal> a = 1\n\
         minipascal> x = 2\n\
         minipascal> y = 3\n\
         minipascal> \
         minipascal> "
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("variable 'x' is used before it is assigned"));
    assert!(stderr.contains("undeclared variable 'b'"));
}
