use lox_test::*;

lox_test!(not
"
var a = !true;
var b = !false;
var c = !nil;
var d = !0;
var e = !\"\";
var f = !!1;
"
  a == false
  b == true
  c == true
  d == false
  e == false
  f == true
);

lox_test!(and_returns_an_operand
"
var a = 1 and 2;
var b = false and 2;
var c = true and \"yes\";
"
  a == 2.0
  b == false
  c == "yes"
);

lox_test!(or_returns_an_operand
"
var a = 1 or 2;
var b = false or 2;
var c = false or false;
"
  a == 1.0
  b == 2.0
  c == false
);

lox_test!(and_short_circuits
"
var a = 1;
false and (a = 2);
"
  a == 1.0
);

lox_test!(or_short_circuits
"
var a = 1;
true or (a = 2);
"
  a == 1.0
);

lox_test!(nil_and_or
"
print nil and 1;
print nil or \"fallback\";
"
  prints "nil\nfallback\n"
);

lox_test!(and_binds_tighter_than_or
"
var a = true or false and false;
var b = (true or false) and false;
"
  a == true
  b == false
);
