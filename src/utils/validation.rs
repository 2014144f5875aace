use crate::utils::error::{EdgeError, Result};
use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

static EXPECTED_CODES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{3}(-\d{3})?(,\d{3}(-\d{3})?)*$").expect("expected codes pattern is valid")
});

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EdgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EdgeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EdgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EdgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EdgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Valid values: {} to {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_ip(field_name: &str, value: &str) -> Result<IpAddr> {
    value
        .parse::<IpAddr>()
        .map_err(|_| EdgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "must be a valid ip".to_string(),
        })
}

pub fn validate_cidr(field_name: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| EdgeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let (addr, prefix) = value
        .split_once('/')
        .ok_or_else(|| invalid("must be in CIDR notation"))?;
    let addr = addr
        .parse::<IpAddr>()
        .map_err(|_| invalid("invalid network address"))?;
    let prefix = prefix
        .parse::<u8>()
        .map_err(|_| invalid("invalid prefix length"))?;
    let max_prefix = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max_prefix {
        return Err(invalid("prefix length out of range"));
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let quoted: Vec<String> = allowed.iter().map(|a| format!("'{}'", a)).collect();
    Err(EdgeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("available values is {}", quoted.join(", ")),
    })
}

/// 兩個欄位必須恰好設定其中一個
pub fn validate_exactly_one(first: (&str, bool), second: (&str, bool)) -> Result<()> {
    match (first.1, second.1) {
        (true, false) | (false, true) => Ok(()),
        (false, false) => Err(EdgeError::validation(format!(
            "one of '{}' or '{}' must be specified",
            first.0, second.0
        ))),
        (true, true) => Err(EdgeError::validation(format!(
            "only one of '{}' or '{}' can be specified",
            first.0, second.0
        ))),
    }
}

pub fn validate_conflicts(first: (&str, bool), second: (&str, bool)) -> Result<()> {
    if first.1 && second.1 {
        return Err(EdgeError::validation(format!(
            "'{}' conflicts with '{}'",
            first.0, second.0
        )));
    }
    Ok(())
}

pub fn validate_expected_codes(field_name: &str, value: &str) -> Result<()> {
    if EXPECTED_CODES.is_match(value) {
        return Ok(());
    }
    Err(EdgeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: "expected a status code, a list like '200,202' or a range like '200-204'"
            .to_string(),
    })
}

pub fn validate_rfc3339(field_name: &str, value: &str) -> Result<()> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|e| EdgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("expected an RFC3339 timestamp: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("edgecenter_cloud_api", "https://api.edgecenter.ru/cloud").is_ok());
        assert!(validate_url("edgecenter_cloud_api", "http://localhost:8080").is_ok());
        assert!(validate_url("edgecenter_cloud_api", "").is_err());
        assert!(validate_url("edgecenter_cloud_api", "invalid-url").is_err());
        assert!(validate_url("edgecenter_cloud_api", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_weight_range() {
        assert!(validate_range("weight", 0, 0, 256).is_ok());
        assert!(validate_range("weight", 256, 0, 256).is_ok());
        assert!(validate_range("weight", 257, 0, 256).is_err());
        assert!(validate_range("weight", -1, 0, 256).is_err());
    }

    #[test]
    fn test_validate_ip() {
        assert!(validate_ip("address", "10.0.0.5").is_ok());
        assert!(validate_ip("address", "fd00::1").is_ok());
        assert!(validate_ip("address", "10.0.0.256").is_err());
        assert!(validate_ip("address", "host.local").is_err());
    }

    #[test]
    fn test_validate_cidr() {
        assert!(validate_cidr("destination", "10.0.3.0/24").is_ok());
        assert!(validate_cidr("destination", "2001:db8::/64").is_ok());
        assert!(validate_cidr("destination", "10.0.3.0").is_err());
        assert!(validate_cidr("destination", "10.0.3.0/33").is_err());
        assert!(validate_cidr("destination", "nope/24").is_err());
    }

    #[test]
    fn test_validate_exactly_one() {
        assert!(validate_exactly_one(("project_id", true), ("project_name", false)).is_ok());
        assert!(validate_exactly_one(("project_id", false), ("project_name", true)).is_ok());
        assert!(validate_exactly_one(("project_id", false), ("project_name", false)).is_err());
        assert!(validate_exactly_one(("project_id", true), ("project_name", true)).is_err());
    }

    #[test]
    fn test_validate_one_of_message() {
        let err = validate_one_of("lb_algorithm", "RANDOM", &["ROUND_ROBIN", "SOURCE_IP"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("'ROUND_ROBIN', 'SOURCE_IP'"));
    }

    #[test]
    fn test_validate_expected_codes() {
        assert!(validate_expected_codes("expected_codes", "200").is_ok());
        assert!(validate_expected_codes("expected_codes", "200,202").is_ok());
        assert!(validate_expected_codes("expected_codes", "200-204").is_ok());
        assert!(validate_expected_codes("expected_codes", "20x").is_err());
        assert!(validate_expected_codes("expected_codes", "").is_err());
    }

    #[test]
    fn test_validate_rfc3339() {
        assert!(validate_rfc3339("expiration", "2030-01-01T00:00:00+00:00").is_ok());
        assert!(validate_rfc3339("expiration", "2030-01-01").is_err());
    }
}
