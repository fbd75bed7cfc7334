use std::fmt;
use std::str::FromStr;

use tonic::codegen::http::uri::PathAndQuery;

/// Error returned when a string is not a valid `package.Service/Method` path.
#[derive(Debug, thiserror::Error)]
#[error("invalid gRPC path '{path}': {reason}")]
pub struct GrpcPathParse {
    pub path: String,
    pub reason: &'static str,
}

/// A fully qualified gRPC method path such as `pcbook.LaptopService/CreateLaptop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrpcPath {
    service: String,
    method: String,
    path_and_query: PathAndQuery,
}

impl GrpcPath {
    pub fn parse(path: &str) -> Result<Self, GrpcPathParse> {
        let invalid = |reason| GrpcPathParse {
            path: path.to_string(),
            reason,
        };

        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let (service, method) = trimmed
            .split_once('/')
            .ok_or_else(|| invalid("expected '<package>.<Service>/<Method>'"))?;

        if method.is_empty() || method.contains('/') {
            return Err(invalid("method must be a single non-empty segment"));
        }
        match service.rsplit_once('.') {
            Some((package, name)) if !package.is_empty() && !name.is_empty() => {}
            _ => return Err(invalid("service must be qualified by a package")),
        }

        let path_and_query = PathAndQuery::try_from(format!("/{service}/{method}").as_str())
            .map_err(|_| invalid("contains characters not allowed in a URI path"))?;

        Ok(Self {
            service: service.to_string(),
            method: method.to_string(),
            path_and_query,
        })
    }

    /// Build a path from a string known at compile time.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid `package.Service/Method` path.
    pub fn from_static(path: &'static str) -> Self {
        match Self::parse(path) {
            Ok(path) => path,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fully qualified service name, e.g. `pcbook.LaptopService`.
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn path_and_query(&self) -> PathAndQuery {
        self.path_and_query.clone()
    }
}

impl FromStr for GrpcPath {
    type Err = GrpcPathParse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GrpcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.method)
    }
}
