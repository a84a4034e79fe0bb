//! Wire types for the Kubernetes admission review exchange.
//!
//! The request side models only the fields the policy consumes; every nested
//! level is an `Option` so a review for a non-pod object, or a pod with a
//! partially populated spec, deserializes cleanly instead of failing. Unknown
//! fields are ignored.
//!
//! The response side is a two-variant sum type with a hand-written
//! `Serialize` impl so the wire shape stays exactly what the API server
//! expects: `{"allowed": true}` or `{"allowed": false, "status": {...}}`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Status text reported on every denial.
pub const STATUS_FAILURE: &str = "Failure";
/// Machine-readable reason reported on every denial.
pub const DENY_REASON: &str = "Only private images are allowed";
/// Status code reported on every denial.
pub const DENY_CODE: u16 = 402;

const DENY_MESSAGE_PREFIX: &str = "The following containers have incorrect prefixes ";

/// Incoming review envelope, the body of `POST /`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdmissionReview {
    pub request: Option<AdmissionRequest>,
}

/// The admission request nested inside the review envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdmissionRequest {
    /// Request identifier, consumed for logging only.
    pub uid: Option<String>,
    /// The object under review. Absent for reviews that carry no object.
    pub object: Option<PodObject>,
}

/// The pod (or pod-shaped object) under review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodObject {
    pub metadata: Option<ObjectMeta>,
    pub spec: Option<PodSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodSpec {
    pub containers: Option<Vec<Container>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Container {
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Outgoing review envelope, the body of every webhook reply.
#[derive(Debug, Serialize)]
pub struct AdmissionReviewReply {
    pub response: AdmissionResponse,
}

impl From<AdmissionResponse> for AdmissionReviewReply {
    fn from(response: AdmissionResponse) -> Self {
        Self { response }
    }
}

/// The admission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionResponse {
    Allowed,
    Denied(DenyStatus),
}

impl AdmissionResponse {
    /// Build a denial listing the offending images, comma-joined in the
    /// order they appeared in the pod spec.
    pub fn deny<S: AsRef<str>>(offending_images: &[S]) -> Self {
        Self::Denied(DenyStatus::for_images(offending_images))
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl Serialize for AdmissionResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Allowed => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("allowed", &true)?;
                map.end()
            }
            Self::Denied(status) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("allowed", &false)?;
                map.serialize_entry("status", status)?;
                map.end()
            }
        }
    }
}

/// Structured failure detail relayed verbatim to the API server, which
/// surfaces it to the user attempting the pod creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenyStatus {
    pub status: &'static str,
    pub message: String,
    pub reason: &'static str,
    pub code: u16,
}

impl DenyStatus {
    fn for_images<S: AsRef<str>>(offending_images: &[S]) -> Self {
        let joined = offending_images
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            status: STATUS_FAILURE,
            message: format!("{DENY_MESSAGE_PREFIX}{joined}"),
            reason: DENY_REASON,
            code: DENY_CODE,
        }
    }
}
