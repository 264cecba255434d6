//! CSV export
//!
//! 导出当前筛选 + 排序后的完整结果 (不只是当前页)。
//! 每个单元格都加双引号，内部引号加倍，行以 `\r\n` 结尾。

use std::path::Path;

use shared::{AppError, AppResult, Listable};

use super::ListQuery;

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = cells.map(quote).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

/// Render `records` with a header row taken from the entity's columns
pub fn to_csv<'a, R: Listable + 'a>(records: impl IntoIterator<Item = &'a R>) -> String {
    let columns = R::columns();
    let mut out = row(columns.iter().map(|c| c.header));
    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| {
                record
                    .field(c.key)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        out.push_str(&row(cells.iter().map(String::as_str)));
    }
    out
}

/// Export everything `query` selects, ignoring its page
pub fn export<'a, R: Listable + 'a>(
    query: &ListQuery,
    records: impl IntoIterator<Item = &'a R>,
) -> String {
    to_csv(query.select(records))
}

/// Write an export to `path`, returning the number of data rows
pub fn write_file<'a, R: Listable + 'a>(
    path: &Path,
    query: &ListQuery,
    records: impl IntoIterator<Item = &'a R>,
) -> AppResult<usize> {
    let rows = query.select(records);
    let count = rows.len();
    std::fs::write(path, to_csv(rows)).map_err(|e| {
        AppError::storage(format!("Failed to write {}: {e}", path.display()))
    })?;
    tracing::info!(path = %path.display(), rows = count, "exported CSV");
    Ok(count)
}
