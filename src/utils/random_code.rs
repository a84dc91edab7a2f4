use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成指定长度的随机码（去掉易混淆的 0/O/1/I）
pub fn generate_random_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// 生成缴费收据号：`RCP-YYYYMM-XXXXXX`
pub fn generate_receipt_no(year: i32, month: i32) -> String {
    format!("RCP-{year:04}{month:02}-{}", generate_random_code(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_charset() {
        let code = generate_random_code(32);
        assert_eq!(code.len(), 32);
        assert!(code.bytes().all(|b| CHARSET.contains(&b)));
    }

    #[test]
    fn test_receipt_no_format() {
        let receipt = generate_receipt_no(2025, 3);
        assert!(receipt.starts_with("RCP-202503-"));
        assert_eq!(receipt.len(), "RCP-202503-".len() + 6);
    }
}
