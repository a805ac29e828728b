mod common;

use common::{output_lines, run_source};
use pretty_assertions::assert_eq;

#[test]
fn test_inner_var_shadows_outer() {
    assert_eq!(
        output_lines("var a = 1; { var a = 2; print a; } print a;"),
        vec!["2", "1"]
    );
}

#[test]
fn test_assignment_from_inner_block_reaches_outer() {
    assert_eq!(
        output_lines("var a = 1; { a = 2; print a; } print a;"),
        vec!["2", "2"]
    );
}

#[test]
fn test_shadowed_name_assignment_stays_inner() {
    assert_eq!(
        output_lines("var a = 1; { var a = 2; a = 3; print a; } print a;"),
        vec!["3", "1"]
    );
}

#[test]
fn test_lookup_walks_several_levels() {
    let source = r#"
        var a = "global a";
        var b = "global b";
        {
            var a = "outer a";
            {
                var b = "inner b";
                print a;
                print b;
            }
            print b;
        }
        print a;
    "#;
    assert_eq!(
        output_lines(source),
        vec!["outer a", "inner b", "global b", "global a"]
    );
}

#[test]
fn test_sibling_blocks_do_not_share_bindings() {
    assert_eq!(
        output_lines(r#"{ var scoped = "first"; print scoped; } { var scoped = "second"; print scoped; }"#),
        vec!["first", "second"]
    );
}

#[test]
fn test_block_local_is_gone_after_block() {
    let result = run_source("{ var local = 1; } print local;");
    assert_eq!(result.stdout, "");
    assert_eq!(result.diagnostics, vec!["Undefined variable 'local'.\n[line 1]"]);
}

#[test]
fn test_initializer_sees_outer_binding_of_same_name() {
    assert_eq!(
        output_lines("var a = 1; { var a = a + 1; print a; } print a;"),
        vec!["2", "1"]
    );
}

#[test]
fn test_redefinition_in_same_scope_is_runtime_error() {
    let result = run_source("var x = 1;\nvar x = 2;\nprint x;");
    assert_eq!(result.stdout, "");
    assert!(result.had_runtime_error);
    assert!(!result.had_error);
    assert_eq!(
        result.diagnostics,
        vec!["Variable 'x' cannot be reinitialized.\n[line 2]"]
    );
}

#[test]
fn test_redefinition_in_same_block_is_runtime_error() {
    let result = run_source(r#"{ var y = "a"; print y; var y = "b"; print y; }"#);
    assert_eq!(result.lines(), vec!["a"]);
    assert_eq!(
        result.diagnostics,
        vec!["Variable 'y' cannot be reinitialized.\n[line 1]"]
    );
}

#[test]
fn test_redefinition_without_initializer_is_still_an_error() {
    let result = run_source("var z; var z;");
    assert_eq!(
        result.diagnostics,
        vec!["Variable 'z' cannot be reinitialized.\n[line 1]"]
    );
}

#[test]
fn test_loop_body_block_is_fresh_each_iteration() {
    let source = r#"
        var i = 0;
        while (i < 3) {
            var square = i * i;
            print square;
            i = i + 1;
        }
    "#;
    assert_eq!(output_lines(source), vec!["0", "1", "4"]);
}
