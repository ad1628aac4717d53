//! Type descriptors.
//!
//! One variant per runtime value variant, plus `Untyped` (a slot whose type
//! is not fixed yet) and the `Reference`/`Alias` indirections. Numeric types
//! are nominal: `int` covers every stored integer width, the width lives in
//! the value's [`Subtype`].

use tern_ir::Name;

/// Discriminant of a [`Type`] (and of a runtime value).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Untyped,
    Nil,
    Any,
    Bool,
    Char,
    Int,
    Float,
    Complex,
    String,
    Array,
    Tuple,
    Struct,
    Union,
    Lambda,
    Spreadable,
    Reference,
    Alias,
}

impl Kind {
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Untyped => "untyped",
            Kind::Nil => "nil",
            Kind::Any => "any",
            Kind::Bool => "bool",
            Kind::Char => "char",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Complex => "complex",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Tuple => "tuple",
            Kind::Struct => "struct",
            Kind::Union => "union",
            Kind::Lambda => "lambda",
            Kind::Spreadable => "spreadable",
            Kind::Reference => "reference",
            Kind::Alias => "alias",
        }
    }
}

/// Storage precision of a numeric value.
///
/// Purely representational: it never changes the nominal type, it only
/// distinguishes members when deduplicating union values and when
/// displaying.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subtype {
    Int8,
    Int16,
    IntBig,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl Subtype {
    pub const fn name(self) -> &'static str {
        match self {
            Subtype::Int8 => "int8",
            Subtype::Int16 => "int16",
            Subtype::IntBig => "bigint",
            Subtype::Float32 => "float32",
            Subtype::Float64 => "float64",
            Subtype::Complex64 => "complex64",
            Subtype::Complex128 => "complex128",
        }
    }
}

/// A named, typed struct attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: Name,
    pub ty: Type,
}

/// Ordered set of named attributes. Zero attributes is the struct wildcard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructType {
    pub attributes: Vec<Attribute>,
}

impl StructType {
    pub fn new(attributes: impl IntoIterator<Item = (Name, Type)>) -> Self {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(name, ty)| Attribute { name, ty })
                .collect(),
        }
    }

    /// The zero-attribute struct that matches any struct.
    pub fn wildcard() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.attributes.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attribute(&self, name: Name) -> Option<&Type> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.ty)
    }
}

/// A lambda parameter. Names matter for binding, never for type identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Name,
    pub ty: Type,
}

/// Lambda signature.
///
/// When `variadic` is set, the last parameter's `ty` is the element type of
/// the array the trailing arguments are packed into.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LambdaType {
    pub params: Vec<Param>,
    pub ret: Type,
    pub variadic: bool,
}

impl LambdaType {
    pub fn new(params: impl IntoIterator<Item = (Name, Type)>, ret: Type) -> Self {
        Self {
            params: params
                .into_iter()
                .map(|(name, ty)| Param { name, ty })
                .collect(),
            ret,
            variadic: false,
        }
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameters bound one argument each.
    pub fn fixed_params(&self) -> &[Param] {
        if self.variadic {
            &self.params[..self.params.len().saturating_sub(1)]
        } else {
            &self.params
        }
    }

    /// Element type of the variadic tail, if any.
    pub fn variadic_param(&self) -> Option<&Param> {
        if self.variadic {
            self.params.last()
        } else {
            None
        }
    }
}

/// Type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Not yet fixed; absorbs the first type assigned to it.
    Untyped,
    Nil,
    Any,
    Bool,
    Char,
    Int,
    Float,
    Complex,
    String,
    /// Homogeneous-by-union array of the element type.
    Array(Box<Type>),
    /// Fixed arity, positional types.
    Tuple(Vec<Type>),
    Struct(StructType),
    /// Flattened, deduplicated, at least two members.
    Union(Vec<Type>),
    Lambda(Box<LambdaType>),
    /// Iterable marked for call-site expansion.
    Spreadable(Box<Type>),
    /// Identifier to resolve against a scope.
    Reference(Name),
    /// Named type; reconciles through its target.
    Alias { name: Name, target: Box<Type> },
}

impl Type {
    pub fn kind(&self) -> Kind {
        match self {
            Type::Untyped => Kind::Untyped,
            Type::Nil => Kind::Nil,
            Type::Any => Kind::Any,
            Type::Bool => Kind::Bool,
            Type::Char => Kind::Char,
            Type::Int => Kind::Int,
            Type::Float => Kind::Float,
            Type::Complex => Kind::Complex,
            Type::String => Kind::String,
            Type::Array(_) => Kind::Array,
            Type::Tuple(_) => Kind::Tuple,
            Type::Struct(_) => Kind::Struct,
            Type::Union(_) => Kind::Union,
            Type::Lambda(_) => Kind::Lambda,
            Type::Spreadable(_) => Kind::Spreadable,
            Type::Reference(_) => Kind::Reference,
            Type::Alias { .. } => Kind::Alias,
        }
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn lambda(ty: LambdaType) -> Self {
        Type::Lambda(Box::new(ty))
    }

    pub fn spreadable(inner: Type) -> Self {
        Type::Spreadable(Box::new(inner))
    }

    pub fn alias(name: Name, target: Type) -> Self {
        Type::Alias {
            name,
            target: Box::new(target),
        }
    }

    pub fn structure(attributes: impl IntoIterator<Item = (Name, Type)>) -> Self {
        Type::Struct(StructType::new(attributes))
    }

    /// Build a union: nested unions are flattened, duplicates dropped, a
    /// single survivor is returned as itself and no members at all yield
    /// `untyped`.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        let mut flat: Vec<Type> = Vec::new();
        for member in members {
            match member {
                Type::Union(inner) => {
                    for ty in inner {
                        if !flat.contains(&ty) {
                            flat.push(ty);
                        }
                    }
                }
                ty => {
                    if !flat.contains(&ty) {
                        flat.push(ty);
                    }
                }
            }
        }
        match flat.len() {
            0 => Type::Untyped,
            1 => flat.pop().unwrap_or(Type::Untyped),
            _ => Type::Union(flat),
        }
    }

    #[inline]
    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Untyped)
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Type::Nil)
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    /// Types whose slots may hold `nil` without converting it.
    pub fn is_reference_like(&self) -> bool {
        match self {
            Type::Nil
            | Type::Any
            | Type::String
            | Type::Array(_)
            | Type::Tuple(_)
            | Type::Struct(_)
            | Type::Union(_)
            | Type::Lambda(_)
            | Type::Spreadable(_)
            | Type::Reference(_) => true,
            Type::Alias { target, .. } => target.is_reference_like(),
            _ => false,
        }
    }

    /// Element type of an array, looking through aliases.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            Type::Alias { target, .. } => target.element_type(),
            _ => None,
        }
    }

    /// Strip alias wrappers.
    pub fn unaliased(&self) -> &Type {
        match self {
            Type::Alias { target, .. } => target.unaliased(),
            ty => ty,
        }
    }
}

#[cfg(test)]
mod tests;
