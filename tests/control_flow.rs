use lox_test::*;

lox_test!(if_statement
"
var a = 0;
var b = 0;
if (true) a = 1;
if (false) b = 1;
"
  a == 1.0
  b == 0.0
);

lox_test!(if_else
"
var a;
var b;
if (1 > 2) a = \"then\"; else a = \"else\";
if (nil) b = 1; else if (0) b = 2; else b = 3;
"
  a == "else"
  b == 2.0
);

lox_test!(if_with_blocks
"
var result = 0;
if (true) {
  var local = 5;
  result = local;
} else {
  result = -1;
}
"
  result == 5.0
);

lox_test!(dangling_else_binds_to_nearest_if
"
if (true) if (false) print 1; else print 2;
"
  prints "2\n"
);

lox_test!(while_loop
"
var i = 0;
var total = 0;
while (i < 5) {
  total = total + i;
  i = i + 1;
}
"
  i == 5.0
  total == 10.0
);

lox_test!(while_loop_never_runs
"
var ran = false;
while (false) ran = true;
"
  ran == false
);

lox_test!(for_loop
"
var total = 0;
for (var i = 1; i <= 4; i = i + 1) {
  total = total * 10 + i;
}
"
  total == 1234.0
);

lox_test!(for_loop_prints
"
for (var i = 0; i < 3; i = i + 1) print i;
"
  prints "0\n1\n2\n"
);

lox_test!(for_loop_with_global_initializer
"
var i;
var steps = 0;
for (i = 10; i > 0; i = i - 3) steps = steps + 1;
"
  i == -2.0
  steps == 4.0
);

lox_test!(for_loop_without_increment
"
var total = 0;
for (var i = 0; i < 3;) {
  total = total + 1;
  i = i + 1;
}
"
  total == 3.0
);

lox_test!(for_loop_variable_is_scoped
"
for (var i = 0; i < 1; i = i + 1) {}
print i;
"
  RuntimeError
);

lox_test!(nested_loops
"
var count = 0;
for (var i = 0; i < 4; i = i + 1) {
  var j = 0;
  while (j < i) {
    count = count + 1;
    j = j + 1;
  }
}
"
  count == 6.0
);

lox_test!(loop_body_with_many_instructions
"
var total = 0;
for (var i = 0; i < 2; i = i + 1) {
  total = total + 1; total = total + 1; total = total + 1; total = total + 1;
  total = total + 1; total = total + 1; total = total + 1; total = total + 1;
  total = total + 1; total = total + 1; total = total + 1; total = total + 1;
  total = total + 1; total = total + 1; total = total + 1; total = total + 1;
}
"
  total == 32.0
);

lox_test!(missing_condition_bracket
"if true) print 1;"
  CompileError
);

lox_test!(missing_for_clause_bracket
"for (var i = 0; i < 1; i = i + 1 print i;"
  CompileError
);

lox_test!(return_at_top_level
"return 1;"
  CompileError
);
