//! The transport seam.
//!
//! Everything below the request body (session login, envelope, signing,
//! HTTP) belongs to the transport. The mapping layer only asks it to run one
//! named operation whose body is filled in by a callback.

use std::sync::Arc;

use crate::error::TransportError;
use crate::tree::TreeBuilder;

/// Parsed response with snake_case keys, e.g. `{"amend_response": {...}}`.
pub type ResponseTree = serde_json::Value;

/// A connection to the remote API.
pub trait Transport {
    /// Invoke `operation`, letting `build` write the request body.
    ///
    /// Errors are returned as-is to the caller of the mapping operation.
    fn invoke(
        &self,
        operation: &str,
        build: &mut dyn FnMut(&mut TreeBuilder),
    ) -> Result<ResponseTree, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn invoke(
        &self,
        operation: &str,
        build: &mut dyn FnMut(&mut TreeBuilder),
    ) -> Result<ResponseTree, TransportError> {
        (**self).invoke(operation, build)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn invoke(
        &self,
        operation: &str,
        build: &mut dyn FnMut(&mut TreeBuilder),
    ) -> Result<ResponseTree, TransportError> {
        (**self).invoke(operation, build)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn invoke(
        &self,
        operation: &str,
        build: &mut dyn FnMut(&mut TreeBuilder),
    ) -> Result<ResponseTree, TransportError> {
        (**self).invoke(operation, build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Namespace;

    struct Echo;

    impl Transport for Echo {
        fn invoke(
            &self,
            operation: &str,
            build: &mut dyn FnMut(&mut TreeBuilder),
        ) -> Result<ResponseTree, TransportError> {
            let mut builder = TreeBuilder::new();
            build(&mut builder);
            let body: Vec<String> = builder.finish().iter().map(|e| e.to_xml()).collect();
            Ok(serde_json::json!({ "operation": operation, "body": body }))
        }
    }

    #[test]
    fn test_transport_through_smart_pointers() {
        let shared: Arc<dyn Transport> = Arc::new(Echo);
        let response = (&shared)
            .invoke("query", &mut |b| {
                b.leaf(Namespace::Api, "queryString", "select Id from Account");
            })
            .unwrap();
        assert_eq!(response["operation"], "query");
        assert_eq!(
            response["body"][0],
            "<zns:queryString>select Id from Account</zns:queryString>"
        );
    }
}
