use assert_cmd::Command;

fn run(input: &str) -> (String, String, bool) {
    run_with(&["--quiet"], input)
}

fn run_with(args: &[&str], input: &str) -> (String, String, bool) {
    let output = Command::cargo_bin("deskcalc")
        .unwrap()
        .args(args)
        .write_stdin(input)
        .output()
        .unwrap();

    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        output.status.success(),
    )
}

#[test]
fn prints_results() {
    let (stdout, stderr, ok) = run("1+2*3;\nlet x = 2; x*x;\nquit\n");

    assert!(ok);
    assert_eq!(stdout, "= 7\n= 2\n= 4\n");
    assert_eq!(stderr, "");
}

#[test]
fn reports_errors_and_continues() {
    let (stdout, stderr, ok) = run("1/0; 2;\nconst c = 1; set c = 2; c;\n");

    assert!(ok);
    assert_eq!(stdout, "= 2\n= 1\n= 1\n");
    assert_eq!(
        stderr,
        "error: divide by zero\nerror: cannot update constant c\n"
    );
}

#[test]
fn help_lists_functions() {
    let (stdout, _, ok) = run("help\n");

    assert!(ok);
    assert!(stdout.contains("Functions of one argument: abs, acos"));
    assert!(stdout.contains("Functions of two arguments: atan2, hypot, log, max, min, pow, rand"));
}

#[test]
fn prompts_for_piped_input() {
    let (stdout, stderr, ok) = run_with(&[], "1+2*3;\n1; 2;\n");

    assert!(ok);
    assert_eq!(stdout, "> = 7\n> = 1\n= 2\n> ");
    assert_eq!(stderr, "");
}

#[test]
fn prints_extreme_values_compactly() {
    let (stdout, _, ok) = run("1e300; -1/4e8; 0.5; 123456;\n");

    assert!(ok);
    assert_eq!(stdout, "= 1e300\n= -2.5e-9\n= 0.5\n= 123456\n");
}
