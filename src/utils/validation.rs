use crate::utils::error::{Result, StoreError};
use regex::Regex;
use url::Url;

pub const OTP_LENGTH: usize = 6;
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(StoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(StoreError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(StoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(StoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

// 以下為表單驗證：失敗時直接回傳可顯示給使用者的訊息，不發出任何網路請求

pub fn validate_required(field_name: &str, value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(field_name, message));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    validate_required("email", email, "Email is required")?;

    let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").map_err(|e| StoreError::ConfigError {
        message: format!("email pattern: {}", e),
    })?;
    if !re.is_match(email.trim()) {
        return Err(StoreError::validation(
            "email",
            "Please enter a valid email address",
        ));
    }
    Ok(())
}

pub fn validate_otp(otp: &str) -> Result<()> {
    let otp = otp.trim();
    if otp.chars().count() != OTP_LENGTH || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(StoreError::validation("otp", "OTP must be 6 digits"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(StoreError::validation(
            "password",
            "Password must be at least 6 characters.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://example.com").is_ok());
        assert!(validate_url("api.base_url", "http://localhost:5000").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("api.timeout_seconds", 10, 1, 300).is_ok());
        assert!(validate_range("api.timeout_seconds", 0, 1, 300).is_err());
        assert!(validate_range("api.timeout_seconds", 301, 1, 300).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("rider@pharmacy.in").is_ok());
        assert_eq!(
            validate_email("   ").unwrap_err().to_string(),
            "Email is required"
        );
        assert!(validate_email("rider.pharmacy.in").is_err());
        assert!(validate_email("rider@pharmacy").is_err());
    }

    #[test]
    fn test_validate_otp() {
        assert!(validate_otp("123456").is_ok());
        assert_eq!(
            validate_otp("12345").unwrap_err().to_string(),
            "OTP must be 6 digits"
        );
        assert!(validate_otp("1234567").is_err());
        assert!(validate_otp("12a456").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("abc").unwrap_err().to_string(),
            "Password must be at least 6 characters."
        );
    }
}
