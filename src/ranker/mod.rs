use std::cmp::Reverse;

use tracing::debug;

use crate::cloud::ImageCandidate;

/// Move every candidate matching `preferred` ahead of the rest, keeping the
/// relative order inside both groups.
fn prefer<F>(images: Vec<ImageCandidate>, preferred: F) -> Vec<ImageCandidate>
where
    F: Fn(&ImageCandidate) -> bool,
{
    let (mut matching, non_matching): (Vec<_>, Vec<_>) =
        images.into_iter().partition(|image| preferred(image));
    matching.extend(non_matching);
    matching
}

/// Order candidates best first.
///
/// Newest creation date is the base order (undated images sort last). On
/// top of that, each preference only reorders ties left by the ones after
/// it, so the last one applied dominates:
///
/// 1. x86_64 over other architectures
/// 2. a `gp2` root volume
/// 3. an `ebs` root device over instance store
/// 4. `hvm` over paravirtual
pub fn rank(images: Vec<ImageCandidate>) -> Vec<ImageCandidate> {
    let mut images = images;
    images.sort_by_key(|image| Reverse(image.created_at()));

    let images = prefer(images, |image| image.architecture() == "x86_64");
    let images = prefer(images, |image| image.root_volume_type() == Some("gp2"));
    let images = prefer(images, |image| image.root_device_type() == Some("ebs"));
    prefer(images, |image| image.virtualization_type() == Some("hvm"))
}

/// The single best candidate, or `None` for an empty list.
pub fn best(images: Vec<ImageCandidate>) -> Option<ImageCandidate> {
    let count = images.len();
    let winner = rank(images).into_iter().next();
    debug!(
        candidates = count,
        winner = winner.as_ref().map(|image| image.id()),
        "ranked image candidates"
    );
    winner
}
