//! Source-like rendering of types for diagnostics.

use std::fmt;

use crate::{LambdaType, StructType, Type};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Untyped
            | Type::Nil
            | Type::Any
            | Type::Bool
            | Type::Char
            | Type::Int
            | Type::Float
            | Type::Complex
            | Type::String => f.write_str(self.kind().name()),
            Type::Array(element) => write!(f, "[{element}]"),
            Type::Tuple(members) => {
                f.write_str("(")?;
                write_joined(f, members, ", ")?;
                if members.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Type::Struct(st) => st.fmt(f),
            Type::Union(members) => write_joined(f, members, "|"),
            Type::Lambda(lambda) => lambda.fmt(f),
            Type::Spreadable(inner) => write!(f, "...{inner}"),
            Type::Reference(name) | Type::Alias { name, .. } => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", attr.name, attr.ty)?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for LambdaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty)?;
            if self.variadic && i == last {
                f.write_str("...")?;
            }
        }
        write!(f, ") -> {}", self.ret)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{LambdaType, Type};
    use pretty_assertions::assert_eq;
    use tern_ir::StringInterner;

    #[test]
    fn renders_composites() {
        let interner = StringInterner::new();
        let point = Type::structure([
            (interner.intern("x"), Type::Int),
            (interner.intern("y"), Type::Float),
        ]);
        assert_eq!(point.to_string(), "{x: int, y: float}");
        assert_eq!(Type::array(Type::union([Type::Int, Type::String])).to_string(), "[int|string]");
        assert_eq!(Type::Tuple(vec![Type::Bool]).to_string(), "(bool,)");
        assert_eq!(Type::spreadable(Type::array(Type::Char)).to_string(), "...[char]");
    }

    #[test]
    fn renders_variadic_lambda() {
        let interner = StringInterner::new();
        let sig = LambdaType::new(
            [
                (interner.intern("fmt"), Type::String),
                (interner.intern("args"), Type::Any),
            ],
            Type::Nil,
        )
        .variadic();
        assert_eq!(Type::lambda(sig).to_string(), "(fmt: string, args: any...) -> nil");
    }

    #[test]
    fn aliases_render_by_name() {
        let interner = StringInterner::new();
        let id = interner.intern("UserId");
        assert_eq!(Type::alias(id, Type::Int).to_string(), "UserId");
        assert_eq!(Type::Reference(id).to_string(), "UserId");
    }
}
