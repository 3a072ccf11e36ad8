//! Literal synthesis and parameterized-test components.
//!
//! A literal for a type is chosen in this order:
//!
//! 1. exact entry in the default-value table
//! 2. string-like types: the label hint, quoted
//! 3. arrays: one element literal, coerced with `as T[]`
//! 4. exact entry in the shape table
//! 5. first shape-table entry (declaration order) among the type's ancestors
//! 6. enums: the first constant
//! 7. concrete types with an empty constructor: `new T()`
//! 8. `null`
//!
//! Shapes are filled with one element literal per `<VAL>`, synthesized from
//! the type arguments through the nested shape table.

use std::sync::LazyLock;

use regex::Regex;

use testsmith_core::model::{Method, Type};
use testsmith_core::tables::{DefaultValueTable, ShapeTable, TYPES_PLACEHOLDER, VAL_PLACEHOLDER};

use crate::error::RenderError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[A-Z]+>").unwrap());

/// Types rendered as a quoted label.
const STRING_TYPES: [&str; 5] = [
    "java.lang.String",
    "java.lang.Object",
    "scala.Nothing",
    "scala.Predef.String",
    "String",
];

const NULL_LITERAL: &str = "null";

// ============================================================================
// Components
// ============================================================================

/// One data-table column and its value in the single generated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataColumn {
    pub name: String,
    pub value: String,
}

/// The `where:` block of one feature method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    /// One column per parameter, in declaration order.
    pub inputs: Vec<DataColumn>,
    /// The expected-result column, absent for methods without a return value.
    pub expected: Option<DataColumn>,
}

impl DataTable {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.expected.is_none()
    }
}

/// What a parameterized feature method needs besides its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterizedTestComponents {
    /// Argument list of the invocation, e.g. `0, "name"`.
    pub invocation_args: String,
    pub table: DataTable,
}

// ============================================================================
// Builder
// ============================================================================

/// Synthesizes literals from the shape and default-value tables.
pub struct TestBuilder<'c> {
    shapes: &'c ShapeTable,
    nested_shapes: &'c ShapeTable,
    defaults: &'c DefaultValueTable,
}

impl<'c> TestBuilder<'c> {
    /// `shapes` apply to top-level values, `nested_shapes` to the element
    /// literals inside a shape.
    pub fn new(
        shapes: &'c ShapeTable,
        nested_shapes: &'c ShapeTable,
        defaults: &'c DefaultValueTable,
    ) -> Self {
        TestBuilder {
            shapes,
            nested_shapes,
            defaults,
        }
    }

    /// Invocation arguments and the data table for `method`.
    ///
    /// `expected_column` names the result column; it is only present when
    /// the method returns a value.
    pub fn build_parameterized_test_components(
        &self,
        method: &Method,
        expected_column: &str,
    ) -> Result<ParameterizedTestComponents, RenderError> {
        let mut inputs = Vec::with_capacity(method.params().len());
        for param in method.params() {
            inputs.push(DataColumn {
                name: param.name().to_string(),
                value: self.literal(param.param_type(), param.name(), self.shapes)?,
            });
        }
        let expected = match method.return_type() {
            Some(ty) if method.has_return() => Some(DataColumn {
                name: expected_column.to_string(),
                value: self.literal(ty, expected_column, self.shapes)?,
            }),
            _ => None,
        };
        let invocation_args = inputs
            .iter()
            .map(|c| c.value.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(ParameterizedTestComponents {
            invocation_args,
            table: DataTable { inputs, expected },
        })
    }

    /// Literal for a stubbed or spied response of type `return_type`.
    pub fn render_return_param(
        &self,
        method: &Method,
        return_type: &Type,
        label_hint: &str,
    ) -> Result<String, RenderError> {
        tracing::trace!(method = %method.method_id(), return_type = %return_type, "rendering response literal");
        self.literal(return_type, label_hint, self.shapes)
    }

    fn literal(&self, ty: &Type, label: &str, shapes: &ShapeTable) -> Result<String, RenderError> {
        let name = ty.canonical_name();
        if let Some(value) = self.defaults.get(name) {
            return Ok(value.to_string());
        }
        if STRING_TYPES.contains(&name) {
            return Ok(format!("\"{}\"", label));
        }
        if let Some(element) = ty.element() {
            let value = self.literal(element, label, self.nested_shapes)?;
            return Ok(format!("[{}] as {}", value, name));
        }
        if let Some(shape) = shapes.exact(name) {
            return self.fill(shape, ty, label);
        }
        if let Some(entry) = shapes.first_structural(ty.supertypes()) {
            return self.fill(&entry.shape, ty, label);
        }
        if ty.is_enum() {
            if let Some(constant) = ty.enum_values().first() {
                return Ok(format!("{}.{}", name, constant));
            }
        }
        if ty.has_valid_empty_constructor() {
            return Ok(format!("new {}()", name));
        }
        Ok(NULL_LITERAL.to_string())
    }

    fn fill(&self, shape: &str, ty: &Type, label: &str) -> Result<String, RenderError> {
        let values = ty
            .type_args()
            .iter()
            .map(|arg| self.literal(arg, label, self.nested_shapes))
            .collect::<Result<Vec<_>, _>>()?;
        let types: Vec<&str> = ty.type_args().iter().map(|arg| arg.identity()).collect();
        fill_shape(shape, &values, &types)
    }
}

/// Substitute the placeholders of `shape`.
///
/// The i-th `<VAL>` takes `values[i]`, or the last value when there are
/// fewer values than placeholders (`null` when there are none). `<TYPES>`
/// becomes `<A,B>`, or nothing without type arguments. A value in map-key
/// position that starts with a letter is parenthesized so Groovy does not
/// read it as a string key.
pub fn fill_shape(shape: &str, values: &[String], types: &[&str]) -> Result<String, RenderError> {
    for found in PLACEHOLDER.find_iter(shape) {
        let token = found.as_str();
        if token != VAL_PLACEHOLDER && token != TYPES_PLACEHOLDER {
            return Err(RenderError::UnknownPlaceholder {
                placeholder: token.to_string(),
                shape: shape.to_string(),
            });
        }
    }

    let type_list = if types.is_empty() {
        String::new()
    } else {
        format!("<{}>", types.join(","))
    };
    let shape = shape.replace(TYPES_PLACEHOLDER, &type_list);

    let mut out = String::with_capacity(shape.len());
    let mut rest = shape.as_str();
    let mut index = 0;
    while let Some(pos) = rest.find(VAL_PLACEHOLDER) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + VAL_PLACEHOLDER.len()..];
        let value = values
            .get(index)
            .or_else(|| values.last())
            .map(String::as_str)
            .unwrap_or(NULL_LITERAL);
        let is_key = rest.starts_with(':');
        if is_key && value.starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.push('(');
            out.push_str(value);
            out.push(')');
        } else {
            out.push_str(value);
        }
        index += 1;
    }
    out.push_str(rest);
    Ok(out)
}
