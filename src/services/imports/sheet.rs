//! CSV / XLSX 表格解析
//!
//! 表头大小写不敏感，空格按下划线处理；完全空白的行被忽略。

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Cursor;

use super::Upload;
use crate::models::ErrorCode;
use crate::utils::dates::{excel_serial_to_date, parse_date_text};

/// 解析失败
#[derive(Debug)]
pub enum ImportParseError {
    MissingColumn(String),
    ParseFailed(String),
    EmptyFile,
    UnsupportedFormat(String),
}

impl ImportParseError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn(_) => ErrorCode::ImportFileMissingColumn,
            Self::ParseFailed(_) | Self::UnsupportedFormat(_) => ErrorCode::ImportFileParseFailed,
            Self::EmptyFile => ErrorCode::ImportFileDataInvalid,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::MissingColumn(col) => format!("缺少必需列: {col}"),
            Self::ParseFailed(msg) => msg.clone(),
            Self::EmptyFile => "文件中没有数据".to_string(),
            Self::UnsupportedFormat(name) => format!("不支持的文件类型: {name}，仅支持 .xlsx 或 .csv"),
        }
    }
}

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// 文本值，空白返回 None；整数值不带小数部分
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
        }
    }

    /// 日期值，数字按 Excel 序列号解析
    pub fn date(&self) -> Result<Option<NaiveDate>, String> {
        match self {
            Cell::Empty => Ok(None),
            Cell::Number(n) => excel_serial_to_date(*n)
                .map(Some)
                .ok_or_else(|| format!("无效的 Excel 日期序列号: {n}")),
            Cell::Text(s) if s.trim().is_empty() => Ok(None),
            Cell::Text(s) => parse_date_text(s)
                .map(Some)
                .ok_or_else(|| format!("无法识别的日期: {}", s.trim())),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// 一行数据
#[derive(Debug, Clone)]
pub struct SheetRow {
    /// 在文件中的行号，表头为第 1 行
    pub row_num: i64,
    pub cells: Vec<Cell>,
}

impl SheetRow {
    fn cell(&self, idx: Option<usize>) -> &Cell {
        idx.and_then(|i| self.cells.get(i)).unwrap_or(&Cell::Empty)
    }

    pub fn text(&self, idx: Option<usize>) -> Option<String> {
        self.cell(idx).text()
    }

    pub fn date(&self, idx: Option<usize>) -> Result<Option<NaiveDate>, String> {
        self.cell(idx).date()
    }
}

/// 解析后的表格
#[derive(Debug, Clone)]
pub struct ImportSheet {
    columns: HashMap<String, usize>,
    pub rows: Vec<SheetRow>,
}

impl ImportSheet {
    fn new(headers: Vec<String>, rows: Vec<SheetRow>) -> Self {
        let mut columns = HashMap::new();
        for (idx, header) in headers.into_iter().enumerate() {
            let key = normalize_header(&header);
            if !key.is_empty() {
                columns.entry(key).or_insert(idx);
            }
        }
        Self { columns, rows }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// 检查必需列是否存在
    pub fn require_columns(&self, names: &[&str]) -> Result<(), ImportParseError> {
        for name in names {
            if !self.columns.contains_key(*name) {
                return Err(ImportParseError::MissingColumn((*name).to_string()));
            }
        }
        Ok(())
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// 按扩展名选择解析方式
pub fn parse_upload(upload: &Upload) -> Result<ImportSheet, ImportParseError> {
    let name = upload.file_name.to_lowercase();
    if name.ends_with(".xlsx") {
        parse_xlsx(&upload.bytes)
    } else if name.ends_with(".csv") || name.is_empty() {
        parse_csv(&upload.bytes)
    } else {
        Err(ImportParseError::UnsupportedFormat(upload.file_name.clone()))
    }
}

pub fn parse_csv(data: &[u8]) -> Result<ImportSheet, ImportParseError> {
    // 去掉 Excel 导出 CSV 时带上的 BOM
    let data = data.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(data);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(data));

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| ImportParseError::ParseFailed(format!("读取表头失败: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportParseError::EmptyFile);
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let row_num = idx as i64 + 2;
        let record = result
            .map_err(|e| ImportParseError::ParseFailed(format!("第 {row_num} 行解析失败: {e}")))?;

        let cells: Vec<Cell> = record
            .iter()
            .map(|v| {
                if v.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(v.to_string())
                }
            })
            .collect();
        if cells.iter().all(|c| *c == Cell::Empty) {
            continue;
        }
        rows.push(SheetRow { row_num, cells });
    }

    Ok(ImportSheet::new(headers, rows))
}

pub fn parse_xlsx(data: &[u8]) -> Result<ImportSheet, ImportParseError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))
        .map_err(|e| ImportParseError::ParseFailed(format!("打开 XLSX 失败: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportParseError::ParseFailed("工作簿中没有工作表".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportParseError::ParseFailed(format!("读取工作表失败: {e}")))?;

    // 工作表可能不从 A1 开始
    let first_row = range.start().map(|(row, _)| row as i64).unwrap_or(0);

    let mut rows_iter = range.rows().enumerate();
    let (_, header_row) = rows_iter.next().ok_or(ImportParseError::EmptyFile)?;
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();

    let mut rows = Vec::new();
    for (idx, row) in rows_iter {
        let cells: Vec<Cell> = row.iter().map(Cell::from).collect();
        if cells.iter().all(|c| c.text().is_none()) {
            continue;
        }
        rows.push(SheetRow {
            row_num: first_row + idx as i64 + 1,
            cells,
        });
    }

    Ok(ImportSheet::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_headers_are_case_insensitive() {
        let csv = "Name,EMAIL,Date Of Birth\nAna,ana@school.test,2012-05-01\n,,\nBen,ben@school.test,\n";
        let sheet = parse_csv(csv.as_bytes()).unwrap();
        assert!(sheet.require_columns(&["name", "email"]).is_ok());
        assert_eq!(sheet.column("date_of_birth"), Some(2));
        // 空行被忽略，行号保持文件中的位置
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].row_num, 4);
        assert_eq!(
            sheet.rows[0].date(sheet.column("date_of_birth")).unwrap(),
            NaiveDate::from_ymd_opt(2012, 5, 1)
        );
        assert_eq!(sheet.rows[1].date(sheet.column("date_of_birth")).unwrap(), None);
    }

    #[test]
    fn test_missing_column() {
        let sheet = parse_csv(b"name,phone\nAna,123456\n").unwrap();
        let err = sheet.require_columns(&["name", "email"]).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ImportFileMissingColumn);
        assert!(err.message().contains("email"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let sheet = parse_csv("\u{feff}name,email\nAna,ana@school.test\n".as_bytes()).unwrap();
        assert_eq!(sheet.column("name"), Some(0));
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(Cell::Number(812345678.0).text().as_deref(), Some("812345678"));
        assert_eq!(Cell::Number(2.5).text().as_deref(), Some("2.5"));
        assert_eq!(Cell::Text("  ".to_string()).text(), None);
        assert_eq!(
            Cell::Number(45658.0).date().unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert!(Cell::Number(60.0).date().is_err());
        assert!(Cell::Text("soon".to_string()).date().is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let upload = Upload {
            file_name: "students.pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        };
        assert!(matches!(
            parse_upload(&upload),
            Err(ImportParseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_xlsx_round_trip_with_generated_template() {
        let bytes = crate::services::imports::template::xlsx_bytes(
            &["name", "email", "enrolled_on"],
            &["Ana", "ana@school.test", "2024-09-01"],
            "students",
        )
        .unwrap();
        let sheet = parse_xlsx(&bytes).unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].row_num, 2);
        assert_eq!(
            sheet.rows[0].text(sheet.column("email")).as_deref(),
            Some("ana@school.test")
        );
    }
}
