//! 日期与时间解析
//!
//! 导入文件里的日期可能是 Excel 序列号（1900 日期系统）或文本。

use chrono::{Datelike, NaiveDate, NaiveTime};

/// Excel 允许的最大序列号（9999-12-31）
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// 将 Excel 1900 日期系统的序列号转换为日期
///
/// Excel 把 1900 年当作闰年，序列号 60 对应不存在的 1900-02-29，
/// 因此 60 之后的序列号需要回退一天。小数部分（时间）被舍弃。
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }
    let days = serial.floor() as i64;
    if days == 60 {
        return None;
    }

    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    base.checked_add_signed(chrono::Duration::days(days))
}

/// 解析文本日期：`YYYY-MM-DD`、`YYYY/MM/DD`、`DD/MM/YYYY`，
/// 或纯数字形式的 Excel 序列号
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    // 带时间的 ISO 字符串，只取日期部分
    if let Some((date_part, _)) = value.split_once('T')
        && let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
    {
        return Some(date);
    }

    value.parse::<f64>().ok().and_then(excel_serial_to_date)
}

/// 解析 `HH:MM` 或 `HH:MM:SS`
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// 某年某月的第一天与最后一天
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// 当前的 (年, 月)
pub fn current_period() -> (i32, i32) {
    let today = chrono::Utc::now().date_naive();
    (today.year(), today.month() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_excel_serial_known_values() {
        assert_eq!(excel_serial_to_date(1.0), Some(ymd(1900, 1, 1)));
        assert_eq!(excel_serial_to_date(59.0), Some(ymd(1900, 2, 28)));
        assert_eq!(excel_serial_to_date(61.0), Some(ymd(1900, 3, 1)));
        assert_eq!(excel_serial_to_date(45658.0), Some(ymd(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(36526.75), Some(ymd(2000, 1, 1)));
    }

    #[test]
    fn test_excel_serial_rejects_invalid() {
        assert_eq!(excel_serial_to_date(60.0), None);
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(-3.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(3_000_000.0), None);
    }

    #[test]
    fn test_parse_date_text_formats() {
        assert_eq!(parse_date_text("2024-09-01"), Some(ymd(2024, 9, 1)));
        assert_eq!(parse_date_text("2024/09/01"), Some(ymd(2024, 9, 1)));
        assert_eq!(parse_date_text("01/09/2024"), Some(ymd(2024, 9, 1)));
        assert_eq!(parse_date_text("2024-09-01T08:30:00Z"), Some(ymd(2024, 9, 1)));
        assert_eq!(parse_date_text("45658"), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("next tuesday"), None);
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("09:30"),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(
            parse_time_of_day("17:05:30"),
            NaiveTime::from_hms_opt(17, 5, 30)
        );
        assert_eq!(parse_time_of_day("25:00"), None);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((ymd(2024, 2, 1), ymd(2024, 2, 29)))
        );
        assert_eq!(
            month_bounds(2025, 12),
            Some((ymd(2025, 12, 1), ymd(2025, 12, 31)))
        );
        assert_eq!(month_bounds(2025, 13), None);
    }
}
