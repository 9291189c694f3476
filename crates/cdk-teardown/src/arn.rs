//! ARN helpers

/// Short name of a resource: everything after the last `/`.
///
/// No validation is done. A string without `/` comes back unchanged and one
/// ending in `/` yields an empty name.
pub fn short_name(arn: &str) -> &str {
    arn.rsplit_once('/').map_or(arn, |(_, name)| name)
}
