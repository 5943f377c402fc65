use lox_test::*;

lox_test!(concatenation
"
var a = \"hello\" + \" \" + \"world\";
var b = \"\" + \"\";
"
  a == "hello world"
  b == ""
);

lox_test!(print_strings
"
print \"hello\";
print \"multi
line\";
print \"caf\" + \"é\";
"
  prints "hello\nmulti\nline\ncafé\n"
);

lox_test!(concatenating_a_number_is_an_error
"\"a\" + 1;"
  RuntimeError
);

lox_test!(unterminated_string
"print \"hello;"
  CompileError
);

#[test]
fn identical_strings_share_one_object() {
  let mut run = run("var a = \"abc\"; var b = \"ab\" + \"c\";");

  let a = run.vm.get_global("a").unwrap();
  let b = run.vm.get_global("b").unwrap();
  assert!(a.is_same(&b));

  let before = run.vm.heap().len();
  run.vm.new_string("abc");
  assert_eq!(run.vm.heap().len(), before);
}
