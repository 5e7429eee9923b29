// Abstract Syntax Tree for the supported expression subset

/// A parsed source text: a sequence of expression statements
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Expr>,
}

/// Runtime kind of a literal token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    BigInt,
    String,
    Boolean,
    Null,
    Regex,
}

/// Literal token, keeping the exact spelling used in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub raw: String,
}

impl Literal {
    pub fn new(kind: LiteralKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Identifier(String),
    This,
    /// Template literal, stored verbatim including the backticks
    Template(String),
    /// Array literal; `None` marks a hole such as the middle of `[1, , 2]`
    Array(Vec<Option<Expr>>),
    Object(Vec<Property>),
    Arrow {
        is_async: bool,
        params: ArrowParams,
        body: ArrowBody,
    },
    /// `function` expression with its parameter list and body kept verbatim
    Function {
        is_async: bool,
        generator: bool,
        name: Option<String>,
        params: String,
        body: String,
    },
    Member {
        object: Box<Expr>,
        property: MemberProperty,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Unary {
        operator: String,
        argument: Box<Expr>,
    },
    Binary {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// `...expr` inside an array literal or argument list
    Spread(Box<Expr>),
}

/// Property accessed by a member expression
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    Name(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowParams {
    /// Plain identifiers: `d`, `(a, b)`
    Names(Vec<String>),
    /// Destructuring or default values, kept as raw source including the parentheses
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expression(Box<Expr>),
    /// Block body, kept as raw source including the braces
    Block(String),
}

/// Key of an object literal property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Identifier(String),
    Literal(Literal),
    Computed(Box<Expr>),
}

/// Entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    KeyValue {
        key: PropertyKey,
        value: Expr,
        shorthand: bool,
    },
    Spread(Expr),
}

impl Property {
    /// Static name of the property key, if it has one.
    ///
    /// String keys yield their contents, numeric keys their raw spelling.
    /// Computed keys and spread entries have no static name.
    pub fn key_name(&self) -> Option<String> {
        match self {
            Property::KeyValue { key, .. } => match key {
                PropertyKey::Identifier(name) => Some(name.clone()),
                PropertyKey::Literal(lit) => match lit.kind {
                    LiteralKind::String => Some(unquote(&lit.raw)),
                    _ => Some(lit.raw.clone()),
                },
                PropertyKey::Computed(_) => None,
            },
            Property::Spread(_) => None,
        }
    }

    pub fn value(&self) -> &Expr {
        match self {
            Property::KeyValue { value, .. } => value,
            Property::Spread(value) => value,
        }
    }
}

impl Expr {
    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call { .. })
    }

    /// Name of the accessed property when this is a `object.name` member expression
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Expr::Member {
                property: MemberProperty::Name(name),
                ..
            } => Some(name),
            _ => None,
        }
    }

    /// Object of a member expression
    pub fn member_object(&self) -> Option<&Expr> {
        match self {
            Expr::Member { object, .. } => Some(object),
            _ => None,
        }
    }
}

/// Decode the contents of a quoted string literal (escapes resolved)
fn unquote(raw: &str) -> String {
    let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or("");
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\n') | None => {}
            Some(other) => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_value(key: PropertyKey) -> Property {
        Property::KeyValue {
            key,
            value: Expr::Identifier("v".to_string()),
            shorthand: false,
        }
    }

    #[test]
    fn test_key_name_identifier() {
        let prop = key_value(PropertyKey::Identifier("stroke".to_string()));
        assert_eq!(prop.key_name(), Some("stroke".to_string()));
    }

    #[test]
    fn test_key_name_string_literal() {
        let prop = key_value(PropertyKey::Literal(Literal::new(LiteralKind::String, "'fill'")));
        assert_eq!(prop.key_name(), Some("fill".to_string()));
    }

    #[test]
    fn test_key_name_escaped_string() {
        let prop = key_value(PropertyKey::Literal(Literal::new(LiteralKind::String, r#""a\"b""#)));
        assert_eq!(prop.key_name(), Some("a\"b".to_string()));
    }

    #[test]
    fn test_key_name_computed() {
        let prop = key_value(PropertyKey::Computed(Box::new(Expr::Identifier("k".to_string()))));
        assert_eq!(prop.key_name(), None);
    }

    #[test]
    fn test_member_name() {
        let expr = Expr::Member {
            object: Box::new(Expr::Identifier("Plot".to_string())),
            property: MemberProperty::Name("dot".to_string()),
            optional: false,
        };
        assert_eq!(expr.member_name(), Some("dot"));
        assert_eq!(expr.member_object(), Some(&Expr::Identifier("Plot".to_string())));
    }
}
