//! The `MethodCall` entity.

use crate::model::method::Method;

/// A resolved call: the callee and the argument texts at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodCall {
    method: Method,
    args: Vec<String>,
}

impl MethodCall {
    pub(crate) fn new(method: Method, args: Vec<String>) -> Self {
        MethodCall { method, args }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}
