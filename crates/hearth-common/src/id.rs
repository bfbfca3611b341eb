//! Row identifiers: UUID v7, so primary keys sort by creation time.

use uuid::Uuid;

pub fn generate_id() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_sort_by_creation() {
        let first = generate_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = generate_id();
        assert!(first < second);
        assert!(first.to_string() < second.to_string());
    }
}
