//! Image prefix admission policy.
//!
//! A single pure pass over the review: extract the container images, check
//! each against the required prefix, and build the response. No state, no
//! I/O, no failure mode; any input shape maps to a decision.

use tracing::{debug, info};

use crate::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Container};

/// Decide whether the pod under review may be admitted.
///
/// Missing structure (`request`, `object`, `spec`, or `containers`) means
/// there is nothing to validate and the review is allowed. The deny path is
/// only reachable once containers are present and at least one image fails
/// the prefix check. Containers with an absent or empty image carry no
/// validation input and are skipped.
///
/// The prefix check is a strict byte-wise `starts_with`: case-sensitive, no
/// normalization, no trimming.
pub fn evaluate(review: &AdmissionReview, required_prefix: &str) -> AdmissionResponse {
    let Some(request) = &review.request else {
        return AdmissionResponse::Allowed;
    };
    let Some(containers) = containers_of(request) else {
        return AdmissionResponse::Allowed;
    };

    let pod_name = pod_name(request).unwrap_or("<unnamed>");
    debug!(pod = %pod_name, uid = ?request.uid, "evaluating pod");

    let offending: Vec<&str> = containers
        .iter()
        .filter_map(|container| container.image.as_deref())
        .filter(|image| !image.is_empty() && !image.starts_with(required_prefix))
        .collect();

    if offending.is_empty() {
        AdmissionResponse::Allowed
    } else {
        info!(
            pod = %pod_name,
            images = ?offending,
            "denying pod with images outside the required prefix"
        );
        AdmissionResponse::deny(&offending)
    }
}

fn containers_of(request: &AdmissionRequest) -> Option<&[Container]> {
    request
        .object
        .as_ref()?
        .spec
        .as_ref()?
        .containers
        .as_deref()
}

fn pod_name(request: &AdmissionRequest) -> Option<&str> {
    request.object.as_ref()?.metadata.as_ref()?.name.as_deref()
}
