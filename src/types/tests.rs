//! Unit tests for the type lattice.
//!
//! This module contains tests for promotion, assignability, comparability,
//! common-type unification and class hierarchies.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::ast::ast::NodeId;

use super::types::{ClassMember, ClassType, MemberKind, Type, TypeKind};

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

fn class(id: u32, name: &str, superclass: Option<&Rc<ClassType>>) -> Rc<ClassType> {
    Rc::new(ClassType {
        id: NodeId(id),
        name: name.to_string(),
        superclass: superclass.cloned(),
        members: vec![],
    })
}

#[test]
fn test_numeric_assignability_is_widening_only() {
    for a in NUMERIC.iter() {
        for b in NUMERIC.iter() {
            let widening = a.is_numeric() && b.is_numeric() && Type::max(a, b) == *b;
            assert_eq!(a.is_assignable_to(b), widening, "{} -> {}", a, b);
        }
    }

    assert!(Type::I32.is_assignable_to(&Type::F64));
    assert!(!Type::F64.is_assignable_to(&Type::I32));
}

#[test]
fn test_narrowing_within_integer_band_is_rejected() {
    // The integer band alone does not make a type assignable.
    assert!(!Type::I64.is_assignable_to(&Type::I32));
    assert!(!Type::I128.is_assignable_to(&Type::I8));
    assert!(!Type::F128.is_assignable_to(&Type::F32));
    assert!(Type::I8.is_assignable_to(&Type::I128));
}

#[test]
fn test_type_order() {
    assert!(TypeKind::Bool < TypeKind::I8);
    assert!(TypeKind::I128 < TypeKind::F32);
    assert!(TypeKind::F128 < TypeKind::Array);
    assert!(TypeKind::Class < TypeKind::Type);

    assert_eq!(Type::max(&Type::I32, &Type::F32), Type::F32);
    assert_eq!(Type::max(&Type::I64, &Type::I8), Type::I64);
    assert_eq!(Type::min(&Type::I64, &Type::I8), Type::I8);
}

#[test]
fn test_numeric_predicates() {
    assert!(Type::I8.is_integer());
    assert!(Type::I128.is_integer());
    assert!(!Type::F32.is_integer());
    assert!(Type::F32.is_float());
    assert!(Type::F128.is_numeric());
    assert!(!Type::Bool.is_numeric());
    assert!(!Type::array(Type::I32, 0).is_numeric());
}

#[test]
fn test_void_is_never_assignable() {
    assert!(!Type::Void.is_assignable_to(&Type::Void));
    assert!(!Type::I32.is_assignable_to(&Type::Void));
    assert!(!Type::Void.is_assignable_to(&Type::I32));
}

#[test]
fn test_error_type_is_assignable_both_ways() {
    assert!(Type::Error.is_assignable_to(&Type::I32));
    assert!(Type::Bool.is_assignable_to(&Type::Error));
    assert!(Type::Error.is_comparable_to(&Type::Void));
}

#[test]
fn test_array_assignability() {
    let ints = Type::array(Type::I32, 3);
    let floats = Type::array(Type::F64, 0);

    assert!(ints.is_assignable_to(&floats));
    assert!(!floats.is_assignable_to(&ints));
    assert!(Type::Nil.is_assignable_to(&ints));
    assert!(!ints.is_assignable_to(&Type::I32));
}

#[test]
fn test_array_equality_ignores_length() {
    assert_eq!(Type::array(Type::I32, 3), Type::array(Type::I32, 0));
    assert!(Type::array(Type::I32, 3) != Type::array(Type::I64, 3));
}

#[test]
fn test_mapped_assignability() {
    let small = Type::mapped(Type::I32, Type::I32);
    let wide = Type::mapped(Type::I64, Type::F64);

    assert!(small.is_assignable_to(&wide));
    assert!(!wide.is_assignable_to(&small));
    assert!(Type::Nil.is_assignable_to(&wide));
}

#[test]
fn test_def_requires_identical_signature() {
    let a = Type::def(Type::I32, vec![Type::I32, Type::Bool], false);
    let b = Type::def(Type::I32, vec![Type::I32, Type::Bool], false);
    let wider = Type::def(Type::I64, vec![Type::I32, Type::Bool], false);

    assert!(a.is_assignable_to(&b));
    assert!(!a.is_assignable_to(&wider));
    assert!(!Type::Nil.is_assignable_to(&a));
}

#[test]
fn test_class_hierarchy_assignability() {
    let animal = class(1100, "Animal", None);
    let dog = class(1101, "Dog", Some(&animal));
    let puppy = class(1102, "Puppy", Some(&dog));
    let rock = class(1103, "Rock", None);

    let animal_ty = Type::Class(Rc::clone(&animal));
    let dog_ty = Type::Class(Rc::clone(&dog));
    let puppy_ty = Type::Class(Rc::clone(&puppy));
    let rock_ty = Type::Class(Rc::clone(&rock));

    assert!(dog_ty.is_assignable_to(&animal_ty));
    assert!(puppy_ty.is_assignable_to(&animal_ty));
    assert!(animal_ty.is_assignable_from(&puppy_ty));
    assert!(!animal_ty.is_assignable_to(&dog_ty));

    assert!(!rock_ty.is_assignable_to(&animal_ty));
    assert!(!animal_ty.is_assignable_to(&rock_ty));

    assert!(Type::Nil.is_assignable_to(&rock_ty));
    assert!(animal.is_superclass_of(&puppy));
    assert!(!puppy.is_superclass_of(&animal));
}

#[test]
fn test_common_type() {
    assert_eq!(Type::common_type(&Type::I32, &Type::F64), Some(Type::F64));
    assert_eq!(Type::common_type(&Type::F64, &Type::I32), Some(Type::F64));
    assert_eq!(Type::common_type(&Type::Bool, &Type::I32), None);
    assert_eq!(Type::common_type(&Type::I32, &Type::Bool), None);

    let animal = class(1100, "Animal", None);
    let dog = class(1101, "Dog", Some(&animal));
    let rock = class(1103, "Rock", None);

    assert_eq!(
        Type::common_type(&Type::Class(dog.clone()), &Type::Class(animal.clone())),
        Some(Type::Class(animal.clone()))
    );
    assert_eq!(
        Type::common_type(&Type::Class(animal.clone()), &Type::Class(dog)),
        Some(Type::Class(animal.clone()))
    );
    assert_eq!(
        Type::common_type(&Type::Class(animal.clone()), &Type::Class(rock.clone())),
        None
    );
    assert_eq!(
        Type::common_type(&Type::Class(rock), &Type::Class(animal)),
        None
    );
}

#[test]
fn test_common_type_existence_is_symmetric() {
    let samples = [
        Type::Nil,
        Type::Bool,
        Type::I8,
        Type::I64,
        Type::F32,
        Type::array(Type::I32, 0),
        Type::array(Type::F64, 0),
        Type::mapped(Type::I32, Type::Bool),
    ];

    for a in samples.iter() {
        for b in samples.iter() {
            assert_eq!(
                Type::common_type(a, b).is_some(),
                Type::common_type(b, a).is_some(),
                "{} / {}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_comparability() {
    assert!(Type::I32.is_comparable_to(&Type::F64));
    assert!(Type::Bool.is_comparable_to(&Type::Bool));
    assert!(!Type::Bool.is_comparable_to(&Type::I32));
    assert!(!Type::Void.is_comparable_to(&Type::Void));

    let node = class(1100, "Node", None);
    assert!(Type::Class(node.clone()).is_comparable_to(&Type::Nil));
    assert!(Type::Class(node).is_comparable_to(&Type::array(Type::I32, 0)));
}

#[test]
fn test_find_member_walks_superclasses() {
    let base = Rc::new(ClassType {
        id: NodeId(1100),
        name: String::from("Base"),
        superclass: None,
        members: vec![
            ClassMember {
                name: String::from("size"),
                node: NodeId(1200),
                kind: MemberKind::Property {
                    is_static: false,
                    is_constant: false,
                },
            },
            ClassMember {
                name: String::from("grow"),
                node: NodeId(1201),
                kind: MemberKind::Method { is_static: false },
            },
        ],
    });
    let derived = ClassType {
        id: NodeId(1101),
        name: String::from("Derived"),
        superclass: Some(Rc::clone(&base)),
        members: vec![ClassMember {
            name: String::from("grow"),
            node: NodeId(1300),
            kind: MemberKind::Method { is_static: false },
        }],
    };

    let (owner, member) = derived.find_member("grow").unwrap();
    assert_eq!(owner.name, "Derived");
    assert_eq!(member.node, NodeId(1300));

    let (owner, member) = derived.find_member("size").unwrap();
    assert_eq!(owner.name, "Base");
    assert_eq!(member.node, NodeId(1200));

    assert!(derived.find_member("missing").is_none());
}

#[test]
fn test_type_display() {
    assert_eq!(Type::I32.to_string(), "i32");
    assert_eq!(Type::array(Type::F64, 2).to_string(), "[]f64");
    assert_eq!(Type::mapped(Type::I32, Type::Bool).to_string(), "[i32]bool");
    assert_eq!(
        Type::def(Type::Void, vec![Type::I32, Type::F32], true).to_string(),
        "(i32, ...f32) -> void"
    );
    assert_eq!(Type::Type.to_string(), "type");
}
