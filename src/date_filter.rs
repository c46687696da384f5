use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::{Table, WORKLOG_START_DATE_COLUMN};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// レポート対象期間 `[start, end)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// `YYYY-MM-DD` 形式の文字列から作成
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date("start_date", start)?, parse_date("end_date", end)?)
    }

    /// 任意入力の期間。どちらかが欠けていればエラー
    pub fn from_optional(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Self::parse(start, end),
            (None, _) => Err(Error::InvalidInput("start_date is required".to_string())),
            (_, None) => Err(Error::InvalidInput("end_date is required".to_string())),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(Error::InvalidInput(format!(
                "start_date {} must be before end_date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// 出力オブジェクト名 (`jiraReport_<start>_<end>.csv`)
    pub fn report_object_name(&self) -> String {
        format!(
            "jiraReport_{}_{}.csv",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        Error::InvalidInput(format!("{} must be YYYY-MM-DD, got {:?}", field, value))
    })
}

/// 作業ログ開始日が `[lower_bound, upper_bound)` に入る行だけを残す
///
/// 行の順序は保ち、開始日が欠損している行は除く。
pub fn filter_by_date(table: &Table, lower_bound: NaiveDate, upper_bound: NaiveDate) -> Table {
    let Some(index) = table.column_index(WORKLOG_START_DATE_COLUMN) else {
        return Table::new(table.columns.clone());
    };

    let rows = table
        .rows
        .iter()
        .filter(|row| {
            row[index]
                .as_date()
                .is_some_and(|date| date >= lower_bound && date < upper_bound)
        })
        .cloned()
        .collect();

    Table {
        columns: table.columns.clone(),
        rows,
    }
}
