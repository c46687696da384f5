//! レポート出力用の表形式データ

use chrono::NaiveDate;
use std::fmt;

pub const PARENT_KEY_COLUMN: &str = "Parent_Key";
pub const WORKLOG_TYPE_COLUMN: &str = "Worklog Type";
pub const WORKLOG_START_DATE_COLUMN: &str = "worklog_start_date";

/// 常に末尾に並べる列 (この順)
pub const TRAILING_COLUMNS: [&str; 2] = [PARENT_KEY_COLUMN, WORKLOG_TYPE_COLUMN];

/// 分類ラベル以外の出力列 (出力順)
pub const FIXED_COLUMNS: [&str; 13] = [
    "project_name",
    "project_key",
    "project_category",
    "issues_name",
    "issues_key",
    "issues_team",
    "issues_status",
    "worklog_owner",
    "worklog_owner_id",
    WORKLOG_START_DATE_COLUMN,
    "worklog_time_spent_hr",
    PARENT_KEY_COLUMN,
    WORKLOG_TYPE_COLUMN,
];

/// 課題フィールド由来の列の接頭辞。改名前の一時列もこれで始まる
pub const ISSUE_COLUMN_PREFIX: &str = "issues_";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Date(NaiveDate),
    Hours(f64),
}

impl Cell {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Null)
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map(|s| Cell::Text(s.to_string())).unwrap_or(Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            // 整数値でも小数点以下1桁は出す (2.0, 0.25)
            Cell::Hours(hours) if hours.fract() == 0.0 && hours.is_finite() => write!(f, "{:.1}", hours),
            Cell::Hours(hours) => write!(f, "{}", hours),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }
}

/// 列名を置き換える。対象にない列はそのまま
pub fn rename_columns(mut table: Table, renames: &[(String, String)]) -> Table {
    for column in table.columns.iter_mut() {
        if let Some((_, to)) = renames.iter().find(|(from, _)| from == column) {
            *column = to.clone();
        }
    }
    table
}

/// `TRAILING_COLUMNS` 以外の列を元の順で並べ、その後に `Parent_Key`, `Worklog Type` を置く
///
/// 末尾列が表に存在しない場合は欠損値の列として追加する。
pub fn order_columns(table: Table) -> Table {
    let leading: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !TRAILING_COLUMNS.contains(&name.as_str()))
        .map(|(i, _)| i)
        .collect();

    let columns: Vec<String> = leading
        .iter()
        .map(|&i| table.columns[i].clone())
        .chain(TRAILING_COLUMNS.iter().map(|name| name.to_string()))
        .collect();

    let order: Vec<Option<usize>> = leading
        .into_iter()
        .map(Some)
        .chain(TRAILING_COLUMNS.iter().map(|name| table.column_index(name)))
        .collect();

    let rows = table
        .rows
        .into_iter()
        .map(|mut row| {
            order
                .iter()
                .map(|i| match i {
                    Some(i) => std::mem::replace(&mut row[*i], Cell::Null),
                    None => Cell::Null,
                })
                .collect()
        })
        .collect();

    Table { columns, rows }
}
