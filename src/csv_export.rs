use crate::error::{Error, Result};
use crate::table::Table;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// 表をヘッダー付きCSVにエンコードする
///
/// `with_bom` が真なら先頭にUTF-8 BOMを付ける (表計算ソフトでの文字化け対策)。
pub fn table_to_csv(table: &Table, with_bom: bool) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if with_bom {
        buffer.extend_from_slice(UTF8_BOM);
    }

    let mut writer = csv::Writer::from_writer(buffer);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use chrono::NaiveDate;

    fn sample_table() -> Table {
        let mut table = Table::new(vec![
            "issues_key".to_string(),
            "issues_name".to_string(),
            "worklog_start_date".to_string(),
            "worklog_time_spent_hr".to_string(),
            "Worklog Type".to_string(),
        ]);
        table.push_row(vec![
            Cell::Text("OPS-1".to_string()),
            Cell::Text("Fix \"quoted\", comma".to_string()),
            Cell::Date(NaiveDate::from_ymd_opt(2025, 9, 2).unwrap()),
            Cell::Hours(2.0),
            Cell::Null,
        ]);
        table
    }

    #[test]
    fn test_table_to_csv() {
        let bytes = table_to_csv(&sample_table(), false).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "issues_key,issues_name,worklog_start_date,worklog_time_spent_hr,Worklog Type\n\
             OPS-1,\"Fix \"\"quoted\"\", comma\",2025-09-02,2.0,\n"
        );
    }

    #[test]
    fn test_table_to_csv_with_bom() {
        let bytes = table_to_csv(&sample_table(), true).unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("issues_key"));
        assert_eq!(reader.records().count(), 1);
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let table = Table::new(vec!["a".to_string(), "Parent_Key".to_string()]);

        let text = String::from_utf8(table_to_csv(&table, false).unwrap()).unwrap();

        assert_eq!(text, "a,Parent_Key\n");
    }
}
