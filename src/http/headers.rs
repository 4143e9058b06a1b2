//! Header names shared with the ingress controller.
//!
//! See <https://kubernetes.github.io/ingress-nginx/user-guide/custom-errors/>.

/// Value of the client's `Accept` header, forwarded by the ingress.
pub const X_FORMAT: &str = "x-format";

/// Status code the upstream answered with.
pub const X_CODE: &str = "x-code";

/// URI that caused the error.
pub const X_ORIGINAL_URI: &str = "x-original-uri";

/// Namespace of the backend Service.
pub const X_NAMESPACE: &str = "x-namespace";

/// Name of the matched Ingress.
pub const X_INGRESS_NAME: &str = "x-ingress-name";

/// Name of the Service backing the Ingress.
pub const X_SERVICE_NAME: &str = "x-service-name";

/// Port of the Service backing the Ingress.
pub const X_SERVICE_PORT: &str = "x-service-port";

/// Request identifier, same as the one seen by the backend.
pub const X_REQUEST_ID: &str = "x-request-id";

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

pub const HOST: &str = "host";

/// Search engines should not index error pages.
pub const X_ROBOTS_TAG: &str = "x-robots-tag";
