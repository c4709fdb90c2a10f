//! UUIDv7 utilities for time-ordered identifiers.
//!
//! Job IDs use UUIDv7: the embedded millisecond timestamp keeps queue
//! listings chronologically sortable and makes log correlation trivial.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// UUIDv7 embeds a Unix timestamp (milliseconds) in the first 48 bits,
/// providing natural time-ordering.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check whether a UUID is version 7.
pub fn is_v7(id: &Uuid) -> bool {
    id.get_version_num() == 7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_v7_is_version_7() {
        let id = new_v7();
        assert!(is_v7(&id));
    }

    #[test]
    fn test_new_v7_is_time_ordered() {
        let a = new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_v7();
        assert!(a.as_bytes() < b.as_bytes());
    }

    #[test]
    fn test_is_v7_rejects_v4() {
        let id = Uuid::new_v4();
        assert!(!is_v7(&id));
    }
}
