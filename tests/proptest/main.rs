// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for registry-gate.
//!
//! Uses proptest to generate random inputs and verify the evaluator
//! invariants: the decision partitions images exactly, preserves order, and
//! is idempotent.

use proptest::prelude::*;

use registry_gate::admission::{
    AdmissionRequest, AdmissionResponse, AdmissionReview, Container, ObjectMeta, PodObject, PodSpec,
};
use registry_gate::webhooks::policy::evaluate;

/// Strategy for generating registry-like prefixes.
fn any_prefix() -> impl Strategy<Value = String> {
    "[a-z]{2,10}(\\.[a-z]{2,5})?/"
}

/// Strategy for generating image references, including empty ones.
fn any_image() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9./:_-]{0,24}"
}

fn review_with_images(images: &[String]) -> AdmissionReview {
    AdmissionReview {
        request: Some(AdmissionRequest {
            uid: None,
            object: Some(PodObject {
                metadata: Some(ObjectMeta {
                    name: Some("prop-pod".to_string()),
                }),
                spec: Some(PodSpec {
                    containers: Some(
                        images
                            .iter()
                            .map(|image| Container {
                                name: None,
                                image: Some(image.clone()),
                            })
                            .collect(),
                    ),
                }),
            }),
        }),
    }
}

proptest! {
    /// Property: the decision partitions images exactly. A pod is denied iff
    /// at least one non-empty image lacks the prefix, and the denial message
    /// lists exactly those images, comma-joined, in original order.
    #[test]
    fn decision_partitions_images(prefix in any_prefix(), images in prop::collection::vec(any_image(), 0..8)) {
        let offending: Vec<&str> = images
            .iter()
            .map(String::as_str)
            .filter(|image| !image.is_empty() && !image.starts_with(&prefix))
            .collect();

        let review = review_with_images(&images);
        match evaluate(&review, &prefix) {
            AdmissionResponse::Allowed => prop_assert!(offending.is_empty()),
            AdmissionResponse::Denied(status) => {
                prop_assert!(!offending.is_empty());
                prop_assert_eq!(
                    status.message,
                    format!(
                        "The following containers have incorrect prefixes {}",
                        offending.join(",")
                    )
                );
                prop_assert_eq!(status.code, 402);
                prop_assert_eq!(status.reason, "Only private images are allowed");
            }
        }
    }

    /// Property: fully conforming pods are always allowed.
    #[test]
    fn conforming_pods_are_allowed(prefix in any_prefix(), suffixes in prop::collection::vec("[a-z0-9:.]{1,12}", 0..8)) {
        let images: Vec<String> = suffixes
            .iter()
            .map(|suffix| format!("{prefix}{suffix}"))
            .collect();
        let review = review_with_images(&images);
        prop_assert!(evaluate(&review, &prefix).is_allowed());
    }

    /// Property: evaluation is idempotent; no state leaks between calls.
    #[test]
    fn evaluation_is_idempotent(prefix in any_prefix(), images in prop::collection::vec(any_image(), 0..8)) {
        let review = review_with_images(&images);
        prop_assert_eq!(evaluate(&review, &prefix), evaluate(&review, &prefix));
    }
}
