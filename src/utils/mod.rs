pub mod error;
pub mod logger;
pub mod validation;

use chrono::Utc;

/// `last_updated` 使用 RFC850 格式，例如 `Monday, 02-Jan-06 15:04:05 UTC`
pub fn last_updated_stamp() -> String {
    Utc::now().format("%A, %d-%b-%y %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_updated_stamp_format() {
        let stamp = last_updated_stamp();
        let (weekday, rest) = stamp.split_once(", ").unwrap();
        assert!(weekday.ends_with("day"));
        assert!(rest.ends_with(" UTC"));
        // 02-Jan-06 15:04:05 UTC
        assert_eq!(rest.len(), "02-Jan-06 15:04:05 UTC".len());
    }
}
