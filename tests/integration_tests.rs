//! End-to-end tests: source text through tokenization, parsing and semantic
//! analysis.

use std::rc::Rc;

use pretty_assertions::assert_eq;
use remc::{
    ast::{ast::NodeId, statements::BlockStmt},
    errors::diagnostics::{render_diagnostics, Diagnostic, ErrorCategory},
    lexer::lexer::tokenize,
    parser::parser::parse,
    solver::solver::SolverConfig,
    type_checker::type_checker::{type_check, TypeChecker},
    types::types::{ClassMember, ClassType, Type},
};

fn parse_source(source: &str) -> BlockStmt {
    let tokens = tokenize(source.to_string(), Some("main.rem".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("main.rem".to_string()));
    result.unwrap()
}

fn analyze(source: &str) -> (BlockStmt, TypeChecker, Vec<Diagnostic>) {
    let root = parse_source(source);
    let (checker, diagnostics) = type_check(&root);
    (root, checker, diagnostics)
}

fn names(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
    diagnostics
        .iter()
        .map(|diagnostic| diagnostic.error.name())
        .collect()
}

fn class(id: u32, name: &str, superclass: Option<Rc<ClassType>>) -> Rc<ClassType> {
    Rc::new(ClassType {
        id: NodeId(id),
        name: name.to_string(),
        superclass,
        members: Vec::<ClassMember>::new(),
    })
}

const NUMERIC: [Type; 8] = [
    Type::I8,
    Type::I16,
    Type::I32,
    Type::I64,
    Type::I128,
    Type::F32,
    Type::F64,
    Type::F128,
];

#[test]
fn test_numeric_assignability_is_widening() {
    for a in NUMERIC.iter() {
        for b in NUMERIC.iter() {
            let widening = Type::max(a, b).kind() == b.kind();
            assert_eq!(a.is_assignable_to(b), widening, "{} -> {}", a, b);
        }
    }

    assert!(Type::I32.is_assignable_to(&Type::F64));
    assert!(!Type::F64.is_assignable_to(&Type::I32));
    assert!(!Type::I64.is_assignable_to(&Type::I32));
}

#[test]
fn test_class_assignability_follows_inheritance() {
    let animal = class(2000, "Animal", None);
    let dog = class(2001, "Dog", Some(animal.clone()));
    let rock = class(2002, "Rock", None);

    let animal = Type::Class(animal);
    let dog = Type::Class(dog);
    let rock = Type::Class(rock);

    assert!(dog.is_assignable_to(&animal));
    assert!(animal.is_assignable_from(&dog));
    assert!(!animal.is_assignable_to(&dog));

    assert!(!rock.is_assignable_to(&animal));
    assert!(!animal.is_assignable_to(&rock));
    assert_eq!(Type::common_type(&rock, &animal), None);
    assert_eq!(Type::common_type(&dog, &animal), Some(animal.clone()));
}

#[test]
fn test_common_type_existence_is_symmetric() {
    let samples = [
        Type::I32,
        Type::F64,
        Type::Bool,
        Type::Nil,
        Type::array(Type::I32, 0),
        Type::mapped(Type::I32, Type::F64),
        Type::Class(class(2010, "Shape", None)),
    ];

    for a in samples.iter() {
        for b in samples.iter() {
            assert_eq!(
                Type::common_type(a, b).is_some(),
                Type::common_type(b, a).is_some(),
                "{} and {}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_reference_before_declaration() {
    let (_, _, diagnostics) = analyze("var b = a + 1\nvar a = 1");
    assert_eq!(names(&diagnostics), vec!["UsedBeforeDeclaration"]);
    assert_eq!(diagnostics[0].category(), ErrorCategory::Unresolved);

    let (_, _, diagnostics) = analyze("fn outer() {\n  { echo later }\n  var later = 1\n}");
    assert_eq!(names(&diagnostics), vec!["UsedBeforeDeclaration"]);
}

#[test]
fn test_forward_function_call() {
    let (_, _, diagnostics) = analyze(
        "fn main() -> i32 { return helper(2) }\nfn helper(x: i32) -> i32 { return x * 2 }",
    );
    assert_eq!(names(&diagnostics), Vec::<&str>::new());
}

#[test]
fn test_return_checks() {
    let (_, _, diagnostics) = analyze("fn f() -> i32 { }");
    assert_eq!(names(&diagnostics), vec!["MissingReturn"]);
    assert_eq!(diagnostics[0].category(), ErrorCategory::Flow);

    let (_, _, diagnostics) = analyze("fn f() -> void { return 1 }");
    assert_eq!(names(&diagnostics), vec!["ReturnValueInVoid"]);

    let (root, checker, diagnostics) = analyze("fn f() -> i32 { return 1 }");
    assert_eq!(names(&diagnostics), Vec::<&str>::new());
    assert_eq!(
        checker.type_of(root.body[0].id),
        Some(Type::def(Type::I32, vec![], false))
    );
}

#[test]
fn test_initializer_widening() {
    let (_, _, diagnostics) = analyze("var a: i32 = 1.5");
    assert_eq!(names(&diagnostics), vec!["IncompatibleInitializer"]);

    let (root, checker, diagnostics) = analyze("var a: f64 = 10");
    assert_eq!(names(&diagnostics), Vec::<&str>::new());
    assert_eq!(checker.type_of(root.body[0].id), Some(Type::F64));
}

#[test]
fn test_collection_literal_inference() {
    let (root, checker, diagnostics) =
        analyze("var a = [1, 2, 3]\nvar b = [1, 2.0]\nvar c: []i32 = []");
    assert_eq!(names(&diagnostics), Vec::<&str>::new());

    match checker.type_of(root.body[0].id) {
        Some(Type::Array(array)) => {
            assert_eq!(*array.element, Type::I32);
            assert_eq!(array.length, 3);
        }
        other => panic!("expected an array, got {:?}", other),
    }
    match checker.type_of(root.body[1].id) {
        Some(Type::Array(array)) => {
            assert_eq!(*array.element, Type::F64);
            assert_eq!(array.length, 2);
        }
        other => panic!("expected an array, got {:?}", other),
    }
    assert_eq!(
        checker.type_of(root.body[2].id),
        Some(Type::array(Type::I32, 0))
    );
}

#[test]
fn test_reanalysis_is_idempotent() {
    let source = "class Shape {
        var sides: i32 = 0
        fn area() -> f64 { return 0 }
    }
    class Square < Shape {
        var size: f64 = 1.0
        fn area() -> f64 { return self.size * self.size }
    }
    var s: Shape = new Square()
    var total = s.area() + [1, 2][0]
    var bad: i32 = total
    echo unknown";

    let root = parse_source(source);
    let mut checker = TypeChecker::new();
    checker.analyze(&root);

    let before: Vec<String> = checker
        .solver()
        .attributes()
        .map(|(key, value)| format!("{} = {:?}", key, value))
        .collect();
    let diagnostics = checker.diagnostics().to_vec();
    let mut found = names(&diagnostics);
    found.sort();
    assert_eq!(found, vec!["IncompatibleInitializer", "UnresolvedName"]);

    checker.analyze(&root);

    let mut after: Vec<String> = checker
        .solver()
        .attributes()
        .map(|(key, value)| format!("{} = {:?}", key, value))
        .collect();
    let mut before = before;
    before.sort();
    after.sort();

    assert_eq!(after, before);
    assert_eq!(checker.diagnostics(), diagnostics.as_slice());
}

#[test]
fn test_rule_budget_is_reported() {
    let root = parse_source("var a = 1 + 2\nvar b = a * 3");
    let mut checker = TypeChecker::with_config(SolverConfig { max_rule_runs: 1 });
    checker.analyze(&root);

    let names = names(checker.diagnostics());
    assert_eq!(names[0], "RuleBudgetExhausted");
    assert!(names[1..].iter().all(|name| *name == "UnresolvedDependency"));
    assert!(names.len() > 1);
}

#[test]
fn test_rendered_diagnostics_point_at_source() {
    let source = "var a = 1\nvar b = missing";
    let (_, _, diagnostics) = analyze(source);

    let rendered = render_diagnostics(&diagnostics, source, "main.rem");
    assert!(rendered.starts_with("Error: UnresolvedName"));
    assert!(rendered.contains("var b = missing"));
}
