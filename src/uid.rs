use uuid::Uuid;

/// Arc for UUID-derived UIDs (ISO/IEC 9834-8).
const UUID_UID_ROOT: &str = "2.25";

/// Mint a globally-unique DICOM UI value.
///
/// The decimal form of a v4 UUID under the 2.25 root is at most 44
/// characters, comfortably within the 64-character UI limit.
pub fn new_uid() -> String {
    format!("{}.{}", UUID_UID_ROOT, Uuid::new_v4().as_u128())
}
