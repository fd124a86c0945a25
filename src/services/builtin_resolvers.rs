//! Built-in argument resolvers.
//!
//! One resolver per primitive the host has a native argument type for:
//! text, 32-bit integer, double, float and boolean.

use std::sync::Arc;

use crate::domain::errors::ResolverError;
use crate::domain::models::value::{ArgValue, TypeKey};
use crate::domain::ports::host::{arg_types, ArgType};
use crate::services::resolver_registry::ArgumentResolver;

/// Resolver backed directly by a host argument type.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveResolver {
    arg_type: ArgType,
    expected: &'static str,
}

impl PrimitiveResolver {
    /// Resolver for `arg_type`; `expected` names the type in errors.
    pub const fn new(arg_type: ArgType, expected: &'static str) -> Self {
        Self { arg_type, expected }
    }
}

impl ArgumentResolver for PrimitiveResolver {
    fn arg_type(&self) -> ArgType {
        self.arg_type
    }

    fn parse_default(&self, raw: &str) -> Result<ArgValue, ResolverError> {
        self.arg_type
            .parse(raw)
            .map_err(|_| ResolverError::InvalidDefault {
                value: raw.to_string(),
                expected: self.expected.to_string(),
            })
    }
}

/// Text resolver.
pub const STRING: PrimitiveResolver = PrimitiveResolver::new(arg_types::STRING, "string");
/// `i32` resolver.
pub const INTEGER: PrimitiveResolver = PrimitiveResolver::new(arg_types::INTEGER, "integer");
/// `f64` resolver.
pub const DOUBLE: PrimitiveResolver = PrimitiveResolver::new(arg_types::DOUBLE, "double");
/// `f32` resolver.
pub const FLOAT: PrimitiveResolver = PrimitiveResolver::new(arg_types::FLOAT, "float");
/// `bool` resolver.
pub const BOOLEAN: PrimitiveResolver = PrimitiveResolver::new(arg_types::BOOLEAN, "boolean");

/// Every built-in resolver with the type it serves.
pub(crate) fn all() -> Vec<(TypeKey, Arc<dyn ArgumentResolver>)> {
    vec![
        (TypeKey::of::<String>(), Arc::new(STRING)),
        (TypeKey::of::<i32>(), Arc::new(INTEGER)),
        (TypeKey::of::<f64>(), Arc::new(DOUBLE)),
        (TypeKey::of::<f32>(), Arc::new(FLOAT)),
        (TypeKey::of::<bool>(), Arc::new(BOOLEAN)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        assert_eq!(INTEGER.parse_default("20").unwrap().downcast_ref::<i32>(), Some(&20));
        assert_eq!(DOUBLE.parse_default("0.25").unwrap().downcast_ref::<f64>(), Some(&0.25));
        assert_eq!(FLOAT.parse_default("1.5").unwrap().downcast_ref::<f32>(), Some(&1.5));
        assert_eq!(BOOLEAN.parse_default("false").unwrap().downcast_ref::<bool>(), Some(&false));
        assert_eq!(
            STRING.parse_default("world").unwrap().downcast_ref::<String>(),
            Some(&"world".to_string())
        );
    }

    #[test]
    fn test_invalid_default_is_descriptive() {
        let err = INTEGER.parse_default("twenty").unwrap_err();
        assert_eq!(err.to_string(), "Default value \"twenty\" is not a valid integer");

        assert!(DOUBLE.parse_default("x").is_err());
        assert!(FLOAT.parse_default("").is_err());
        assert!(BOOLEAN.parse_default("maybe").is_err());
    }

    #[test]
    fn test_integer_rejects_out_of_range() {
        assert!(INTEGER.parse_default("2147483648").is_err());
    }
}
