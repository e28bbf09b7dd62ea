use crate::doctor::Doctor;

/// Type-ahead matches for `query`, at most `limit`, in list order.
pub fn suggest<'a>(doctors: &'a [Doctor], query: &str, limit: usize) -> Vec<&'a Doctor> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    doctors
        .iter()
        .filter(|d| d.matches_search(&needle))
        .take(limit)
        .collect()
}
