// ==========================================
// 人力资源管理系统 - 文件解析器实现
// ==========================================
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 阶段 0: 文件读取与解析
// 支持: CSV (.csv) / Excel (.xlsx)
// ==========================================
// 约定:
// - 首个非空行为表头,列名做 小写+下划线 归一
// - 空行跳过;不足两个非空行时产出空行集
// - 字段数量一致性不在此校验(下游校验器按列名取值,缺列视同空串)
// ==========================================

use crate::domain::import::ImportRow;
use crate::importer::error::ImportError;
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 列名归一: 去 BOM / TRIM / 小写 / 空白与连字符 → 下划线
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut last_underscore = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() || ch == '-' {
            if !last_underscore && !out.is_empty() {
                out.push('_');
                last_underscore = true;
            }
        } else {
            out.push(ch.to_ascii_lowercase());
            last_underscore = ch == '_';
        }
    }
    out.trim_end_matches('_').to_string()
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为有序行集（列名已归一）
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(Vec<ImportRow>): 行集(展示行号 = 数据下标 + 2)
    /// - Err: 文件读取错误、格式错误
    fn parse_to_rows(&self, file_path: &Path) -> Result<Vec<ImportRow>, ImportError>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 解析原始分隔文本(逗号分隔,双引号转义)
    ///
    /// # 参数
    /// - text: UTF-8 文本,首个非空行为表头
    ///
    /// # 返回
    /// - Ok(Vec<ImportRow>): 行集;不足两个非空行时为空
    pub fn decode_text(text: &str) -> Result<Vec<ImportRow>, ImportError> {
        // has_headers(false): 表头行自行识别(需跳过前导空行并做列名归一)
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;

            // 跳过完全空白的行
            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            match &headers {
                None => {
                    headers = Some(record.iter().map(normalize_header).collect());
                }
                Some(header_names) => {
                    let mut fields = HashMap::new();
                    for (col_idx, value) in record.iter().enumerate() {
                        if let Some(header) = header_names.get(col_idx) {
                            fields.insert(header.clone(), value.trim().to_string());
                        }
                    }
                    // 展示行号 = 数据下标 + 2(表头占一行,显示从 1 开始)
                    rows.push(ImportRow {
                        row_number: rows.len() + 2,
                        fields,
                    });
                }
            }
        }

        Ok(rows)
    }
}

impl FileParser for CsvParser {
    fn parse_to_rows(&self, file_path: &Path) -> Result<Vec<ImportRow>, ImportError> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = file_path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let text = fs::read_to_string(file_path)?;
        Self::decode_text(&text)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_rows(&self, file_path: &Path) -> Result<Vec<ImportRow>, ImportError> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "xlsx" {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }

        // 打开 Excel 文件
        let mut workbook: Xlsx<_> = open_workbook(file_path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
        }

        let sheet_name = sheet_names[0].clone();
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 提取表头(首个非空行)
        let mut cell_rows = range.rows().filter(|row| {
            row.iter().any(|cell| !cell.to_string().trim().is_empty())
        });

        let header_row = match cell_rows.next() {
            Some(row) => row,
            None => return Ok(Vec::new()),
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect();

        // 读取数据行
        let mut rows = Vec::new();
        for data_row in cell_rows {
            let mut fields = HashMap::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }
            rows.push(ImportRow {
                row_number: rows.len() + 2,
                fields,
            });
        }

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> Result<Vec<ImportRow>, ImportError> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_rows(path),
            "xlsx" => ExcelParser.parse_to_rows(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_decode_text_basic() {
        let rows = CsvParser::decode_text("code,name\nC1,Acme\nC2,\"Beta, Inc\"\n").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("code"), "C1");
        assert_eq!(rows[0].get("name"), "Acme");
        // 引号内的分隔符不拆分字段
        assert_eq!(rows[1].get("name"), "Beta, Inc");
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].row_number, 3);
    }

    #[test]
    fn test_decode_text_header_normalization() {
        let rows = CsvParser::decode_text("Employee No,First Name\nE1,Ada\n").unwrap();
        assert_eq!(rows[0].get("employee_no"), "E1");
        assert_eq!(rows[0].get("first_name"), "Ada");
    }

    #[test]
    fn test_decode_text_skips_blank_lines() {
        let rows = CsvParser::decode_text("\ncode,name\n\nC1,Acme\n,\nC2,Beta\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("code"), "C1");
        assert_eq!(rows[1].get("code"), "C2");
    }

    #[test]
    fn test_decode_text_header_only() {
        // 不足两个非空行 → 空行集
        assert!(CsvParser::decode_text("code,name\n").unwrap().is_empty());
        assert!(CsvParser::decode_text("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_text_missing_trailing_columns() {
        let rows = CsvParser::decode_text("code,name,country\nC1,Acme\n").unwrap();
        assert_eq!(rows[0].get("code"), "C1");
        // 缺列按空串取值
        assert_eq!(rows[0].get("country"), "");
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp_file, "code,name").unwrap();
        writeln!(temp_file, "HR001,People Ops").unwrap();

        let rows = CsvParser.parse_to_rows(temp_file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("code"), "HR001");
    }

    #[test]
    fn test_normalize_header_variants() {
        assert_eq!(normalize_header("  Marital Status "), "marital_status");
        assert_eq!(normalize_header("reports-to"), "reports_to");
        assert_eq!(normalize_header("\u{feff}Code"), "code");
    }

    #[test]
    fn test_roundtrip_with_quotes() {
        // 编码(csv::Writer) → 解码 应还原原值
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["code", "note"]).unwrap();
        writer.write_record(["C1", "say \"hi\", twice"]).unwrap();
        writer.write_record(["C2", "plain"]).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let rows = CsvParser::decode_text(&text).unwrap();
        assert_eq!(rows[0].get("note"), "say \"hi\", twice");
        assert_eq!(rows[1].get("note"), "plain");
    }
}
