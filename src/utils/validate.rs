use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,19}$").expect("Invalid phone regex"));

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_person_name(name: &str) -> Result<(), &'static str> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err("Name must not be empty");
    }
    if len > 100 {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !PHONE_RE.is_match(phone.trim()) {
        return Err("Phone number format is invalid");
    }
    Ok(())
}

/// 缴费周期校验：月份 1-12，年份 2000-2100
pub fn validate_period(month: i32, year: i32) -> Result<(), &'static str> {
    if !(1..=12).contains(&month) {
        return Err("Month must be between 1 and 12");
    }
    if !(2000..=2100).contains(&year) {
        return Err("Year must be between 2000 and 2100");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("ana.lopez@school.edu").is_ok());
        assert!(validate_email("ana@school").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_person_name() {
        assert!(validate_person_name("Ana López").is_ok());
        assert!(validate_person_name("   ").is_err());
        assert!(validate_person_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+62 812-3456-7890").is_ok());
        assert!(validate_phone("0812345678").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("123").is_err());
    }

    #[test]
    fn test_period() {
        assert!(validate_period(1, 2025).is_ok());
        assert!(validate_period(12, 2100).is_ok());
        assert!(validate_period(0, 2025).is_err());
        assert!(validate_period(13, 2025).is_err());
        assert!(validate_period(6, 1999).is_err());
    }
}
