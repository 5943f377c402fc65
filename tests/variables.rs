use lox_test::*;

lox_test!(define_globals
"
var a = 1;
var b;
var c = a + 1;
"
  a == 1.0
  c == 2.0
);

lox_test!(uninitialized_variables_are_nil
"
var a;
print a;
"
  prints "nil\n"
);

lox_test!(redefine_a_global
"
var a = 1;
var a = \"again\";
"
  a == "again"
);

lox_test!(assign_globals
"
var a = 1;
var b = a = 3;
a = a + 1;
"
  a == 4.0
  b == 3.0
);

lox_test!(undefined_global
"print unknown;"
  RuntimeError
);

lox_test!(assign_to_undefined_global
"unknown = 1;"
  RuntimeError
);

lox_test!(can_assign_local_variables
"
var global;
{
  var local = 7;
  global = local;
}
"
  global == 7.0
);

lox_test!(can_use_local_variables
"
var global;
{
  var a = 2;
  var b = 3;
  var c = a + b;
  global = c / 2;
}
"
  global == 2.5
);

lox_test!(shadows_higher_scopes
"
var a;
var b;
var hello = 0;
{
  var hello = 1;
  {
    var hello = 2;
    a = hello;
  }
  b = hello;
}
"
  a == 2.0
  b == 0.0
);

lox_test!(shadowed_local_is_restored
"
var result;
{
  var a = \"outer\";
  {
    var a = \"inner\";
  }
  result = a;
}
"
  result == "outer"
);

lox_test!(local_can_read_global_with_same_name_in_initializer
"
var a = \"global\";
{
  var b = a;
  var a = b + \"!\";
  print a;
}
"
  prints "global!\n"
);

lox_test!(assign_locals
"
{
  var a = 1;
  a = a + 1;
  print a;
}
"
  prints "2\n"
);

lox_test!(define_a_local_twice
"
{
  var a = 1;
  var a = 2;
}
"
  CompileError
);

lox_test!(read_local_in_its_own_initializer
"
{
  var a = a;
}
"
  CompileError
);

lox_test!(invalid_assignment_target
"
var a = 1;
var b = 2;
a + b = 3;
"
  CompileError
);

lox_test!(locals_are_not_globals
"
{
  var local = 1;
}
print local;
"
  RuntimeError
);

#[test]
fn globals_survive_between_interpret_calls() {
  let mut run = run("var count = 1;");
  assert_eq!(run.result, InterpretResult::Ok);

  assert_eq!(run.vm.interpret("count = count + 1;"), InterpretResult::Ok);
  assert_eq!(run.vm.interpret("{ var local = count; count = local * 10; }"), InterpretResult::Ok);

  let count = run.vm.get_global("count").unwrap();
  assert_eq!(run.vm.format_value(&count), "20");
}
