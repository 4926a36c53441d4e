//! Call metadata: which operation is being invoked.

use std::any::type_name;
use std::fmt;

use crate::error::Error;

/// Read-only descriptor of the invoked operation.
///
/// Built once per method at setup time and shared (`Arc<CallInfo>`) by every
/// stage of every invocation of that method.
///
/// ```rust
/// use weft::CallInfo;
///
/// let info = CallInfo::new("/helloworld.Greeter/SayHello").unwrap();
/// assert_eq!(info.service(), "helloworld.Greeter");
/// assert_eq!(info.method(), "SayHello");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallInfo {
    full_method: String,
    split: usize,
    request_type: &'static str,
    response_type: &'static str,
}

impl CallInfo {
    /// Parses a full method name of the form `/service/method`.
    pub fn new(full_method: impl Into<String>) -> Result<Self, Error> {
        let full_method = full_method.into();
        let split = match full_method.strip_prefix('/').and_then(|rest| rest.split_once('/')) {
            Some((service, method))
                if !service.is_empty() && !method.is_empty() && !method.contains('/') =>
            {
                service.len() + 1
            }
            _ => return Err(Error::InvalidMethodName(full_method)),
        };
        Ok(Self { full_method, split, request_type: "", response_type: "" })
    }

    /// Records the request and response type names for this method.
    pub fn with_types<Req, Res>(mut self) -> Self {
        self.request_type = type_name::<Req>();
        self.response_type = type_name::<Res>();
        self
    }

    /// `/package.Service/Method`
    pub fn full_method(&self) -> &str { &self.full_method }

    /// `package.Service`
    pub fn service(&self) -> &str { &self.full_method[1..self.split] }

    /// `Method`
    pub fn method(&self) -> &str { &self.full_method[self.split + 1..] }

    /// Request type name, empty unless set through [`with_types`](Self::with_types).
    pub fn request_type(&self) -> &'static str { self.request_type }

    /// Response type name, empty unless set through [`with_types`](Self::with_types).
    pub fn response_type(&self) -> &'static str { self.response_type }
}

impl fmt::Display for CallInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_method)
    }
}
