use std::{fmt::Display, rc::Rc};

use crate::ast::ast::NodeId;

/// The total preorder over types, lowest first.
///
/// Numeric promotion picks the higher-ranked operand and the numeric/integer
/// predicates are range checks against this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeKind {
    Error,
    Void,
    Nil,
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    F128,
    Array,
    Mapped,
    Def,
    Class,
    Type,
}

#[derive(Debug, Clone)]
pub enum Type {
    /// Poison value handed to dependents of a failed rule.
    Error,
    Void,
    Nil,
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    F128,
    Array(ArrayType),
    Mapped(MappedType),
    Def(DefType),
    Class(Rc<ClassType>),
    /// Meta-type of declarations that denote a type.
    Type,
}

#[derive(Debug, Clone)]
pub struct ArrayType {
    pub element: Box<Type>,
    /// Number of elements of the literal the type was inferred from, 0 otherwise.
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedType {
    pub key: Box<Type>,
    pub value: Box<Type>,
}

/// A function signature. When variadic, the last parameter holds the element
/// type of the trailing arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct DefType {
    pub return_type: Box<Type>,
    pub parameters: Vec<Type>,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property { is_static: bool, is_constant: bool },
    Method { is_static: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMember {
    pub name: String,
    /// Declaring node; its `type` attribute is the member's type.
    pub node: NodeId,
    pub kind: MemberKind,
}

#[derive(Debug)]
pub struct ClassType {
    /// The declaring class statement. Two class types are the same class iff
    /// their ids match.
    pub id: NodeId,
    pub name: String,
    pub superclass: Option<Rc<ClassType>>,
    pub members: Vec<ClassMember>,
}

impl Type {
    pub fn array(element: Type, length: u64) -> Type {
        Type::Array(ArrayType {
            element: Box::new(element),
            length,
        })
    }

    pub fn mapped(key: Type, value: Type) -> Type {
        Type::Mapped(MappedType {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn def(return_type: Type, parameters: Vec<Type>, is_variadic: bool) -> Type {
        Type::Def(DefType {
            return_type: Box::new(return_type),
            parameters,
            is_variadic,
        })
    }

    /// The primitive (non-composite) type of the given kind.
    pub fn primitive(kind: TypeKind) -> Option<Type> {
        let ty = match kind {
            TypeKind::Error => Type::Error,
            TypeKind::Void => Type::Void,
            TypeKind::Nil => Type::Nil,
            TypeKind::Bool => Type::Bool,
            TypeKind::I8 => Type::I8,
            TypeKind::I16 => Type::I16,
            TypeKind::I32 => Type::I32,
            TypeKind::I64 => Type::I64,
            TypeKind::I128 => Type::I128,
            TypeKind::F32 => Type::F32,
            TypeKind::F64 => Type::F64,
            TypeKind::F128 => Type::F128,
            TypeKind::Type => Type::Type,
            TypeKind::Array | TypeKind::Mapped | TypeKind::Def | TypeKind::Class => return None,
        };
        Some(ty)
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Error => TypeKind::Error,
            Type::Void => TypeKind::Void,
            Type::Nil => TypeKind::Nil,
            Type::Bool => TypeKind::Bool,
            Type::I8 => TypeKind::I8,
            Type::I16 => TypeKind::I16,
            Type::I32 => TypeKind::I32,
            Type::I64 => TypeKind::I64,
            Type::I128 => TypeKind::I128,
            Type::F32 => TypeKind::F32,
            Type::F64 => TypeKind::F64,
            Type::F128 => TypeKind::F128,
            Type::Array(_) => TypeKind::Array,
            Type::Mapped(_) => TypeKind::Mapped,
            Type::Def(_) => TypeKind::Def,
            Type::Class(_) => TypeKind::Class,
            Type::Type => TypeKind::Type,
        }
    }

    /// The higher-ranked of two types; `b` on a tie.
    pub fn max(a: &Type, b: &Type) -> Type {
        if a.kind() > b.kind() {
            a.clone()
        } else {
            b.clone()
        }
    }

    /// The lower-ranked of two types; `a` on a tie.
    pub fn min(a: &Type, b: &Type) -> Type {
        if a.kind() <= b.kind() {
            a.clone()
        } else {
            b.clone()
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Type::Nil)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Bool)
    }

    pub fn is_numeric(&self) -> bool {
        (TypeKind::I8..=TypeKind::F128).contains(&self.kind())
    }

    pub fn is_integer(&self) -> bool {
        (TypeKind::I8..=TypeKind::I128).contains(&self.kind())
    }

    pub fn is_float(&self) -> bool {
        (TypeKind::F32..=TypeKind::F128).contains(&self.kind())
    }

    /// Values of reference types are handles; everything else is a primitive.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Error
                | Type::Array(_)
                | Type::Mapped(_)
                | Type::Def(_)
                | Type::Class(_)
                | Type::Type
        )
    }

    /// Whether a value of type `self` may be stored in a location of type
    /// `target`.
    ///
    /// Numeric assignability is widening-only: `i32` to `f64` is accepted,
    /// `f64` to `i32` and `i64` to `i32` are not.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        if self.is_error() || target.is_error() {
            return true;
        }

        if self.is_void() || target.is_void() {
            return false;
        }

        if self == target {
            return true;
        }

        if self.is_numeric() && target.is_numeric() {
            return Type::max(self, target).kind() == target.kind();
        }

        match (self, target) {
            (Type::Array(from), Type::Array(to)) => from.element.is_assignable_to(&to.element),
            (Type::Mapped(from), Type::Mapped(to)) => {
                from.key.is_assignable_to(&to.key) && from.value.is_assignable_to(&to.value)
            }
            (Type::Nil, Type::Array(_) | Type::Mapped(_) | Type::Class(_)) => true,
            (Type::Class(from), Type::Class(to)) => from.is_subclass_of(to),
            // Def types only match identical signatures, handled above.
            _ => false,
        }
    }

    pub fn is_assignable_from(&self, source: &Type) -> bool {
        source.is_assignable_to(self)
    }

    /// Whether `==`, `!=` and the ordering operators accept these operands.
    pub fn is_comparable_to(&self, other: &Type) -> bool {
        if self.is_error() || other.is_error() {
            return true;
        }

        if self.is_void() || other.is_void() {
            return false;
        }

        let reference_like = |ty: &Type| ty.is_reference() || ty.is_nil();

        (reference_like(self) && reference_like(other))
            || self == other
            || (self.is_numeric() && other.is_numeric())
    }

    /// The type both `a` and `b` widen to, preferring `b`.
    ///
    /// Used to unify the element types of collection literals. Whether a
    /// result exists does not depend on the argument order.
    pub fn common_type(a: &Type, b: &Type) -> Option<Type> {
        if a.is_assignable_to(b) {
            Some(b.clone())
        } else if b.is_assignable_to(a) {
            Some(a.clone())
        } else {
            None
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Array identity ignores the literal length.
            (Type::Array(a), Type::Array(b)) => a.element == b.element,
            (Type::Mapped(a), Type::Mapped(b)) => a == b,
            (Type::Def(a), Type::Def(b)) => a == b,
            (Type::Class(a), Type::Class(b)) => a.id == b.id,
            _ => {
                self.kind() == other.kind()
                    && !matches!(
                        self.kind(),
                        TypeKind::Array | TypeKind::Mapped | TypeKind::Def | TypeKind::Class
                    )
            }
        }
    }
}

impl PartialEq for ArrayType {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl ClassType {
    /// This class followed by its superclass chain.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            current: Some(self),
        }
    }

    /// Whether `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &ClassType) -> bool {
        self.ancestors().any(|class| class.id == other.id)
    }

    /// Whether `other` is `self` or inherits from it.
    pub fn is_superclass_of(&self, other: &ClassType) -> bool {
        other.is_subclass_of(self)
    }

    /// Looks a member up by name, properties before methods, walking up the
    /// superclass chain.
    pub fn find_member(&self, name: &str) -> Option<(&ClassType, &ClassMember)> {
        for class in self.ancestors() {
            let property = class
                .members
                .iter()
                .find(|m| m.name == name && matches!(m.kind, MemberKind::Property { .. }));
            let member = property.or_else(|| {
                class
                    .members
                    .iter()
                    .find(|m| m.name == name && matches!(m.kind, MemberKind::Method { .. }))
            });

            if let Some(member) = member {
                return Some((class, member));
            }
        }

        None
    }
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

pub struct Ancestors<'a> {
    current: Option<&'a ClassType>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ClassType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = current.superclass.as_deref();
        Some(current)
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Array(array) => write!(f, "[]{}", array.element),
            Type::Mapped(mapped) => write!(f, "[{}]{}", mapped.key, mapped.value),
            Type::Def(def) => {
                write!(f, "(")?;
                for (i, parameter) in def.parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if def.is_variadic && i + 1 == def.parameters.len() {
                        write!(f, "...")?;
                    }
                    write!(f, "{}", parameter)?;
                }
                write!(f, ") -> {}", def.return_type)
            }
            Type::Class(class) => write!(f, "{}", class.name),
            _ => write!(f, "{}", self.kind()),
        }
    }
}
