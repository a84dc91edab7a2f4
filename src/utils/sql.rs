/// 转义 LIKE 模式中的通配符
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 判断数据库错误信息是否为唯一约束冲突（SQLite / PostgreSQL / MySQL）
pub fn is_unique_violation(message: &str) -> bool {
    message.contains("UNIQUE constraint failed")
        || message.contains("duplicate key value violates unique constraint")
        || message.contains("Duplicate entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern() {
        assert_eq!(escape_like_pattern("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }

    #[test]
    fn test_is_unique_violation() {
        assert!(is_unique_violation(
            "Execution Error: UNIQUE constraint failed: course_payments.receipt_no"
        ));
        assert!(is_unique_violation(
            "duplicate key value violates unique constraint \"uq_class_enrollments_student_class\""
        ));
        assert!(is_unique_violation("Duplicate entry 'a@b.c' for key 'email'"));
        assert!(!is_unique_violation("FOREIGN KEY constraint failed"));
    }
}
