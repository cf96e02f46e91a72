//! Write the accumulated results to an .xlsx workbook.

use rust_xlsxwriter::Workbook;
use std::path::Path;

use crate::error::Result;
use crate::scan::EmailResult;

const HEADER: [&str; 3] = ["Email Name", "Time Sent", "Not Found"];

/// One worksheet named "Results": header at row 1, one row per result from
/// row 2, in input order. An existing file at `output_path` is overwritten.
pub fn save_results(results: &[EmailResult], output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Results")?;

    for (col, title) in HEADER.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }

    for (i, result) in results.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &result.email_name)?;
        worksheet.write_string(row, 1, &result.time_sent)?;
        worksheet.write_string(row, 2, result.not_found_label())?;
    }

    workbook.save(output_path)?;
    println!("Results saved to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx, open_workbook};
    use std::path::PathBuf;

    fn result(name: &str, time: &str, not_found: bool) -> EmailResult {
        EmailResult {
            email_name: name.to_string(),
            time_sent: time.to_string(),
            not_found,
        }
    }

    fn read_rows(path: &PathBuf) -> Vec<Vec<String>> {
        let mut wb: Xlsx<_> = open_workbook(path).unwrap();
        let range = wb.worksheet_range("Results").unwrap();
        range
            .rows()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn writes_header_and_one_row_per_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Results.xlsx");
        let results = vec![
            result("Invoice 1", "2024-03-02T10:00:00Z", true),
            result("Invoice 2", "2024-03-02T11:00:00Z", false),
        ];
        save_results(&results, &path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Email Name", "Time Sent", "Not Found"]);
        assert_eq!(rows[1], vec!["Invoice 1", "2024-03-02T10:00:00Z", "Yes"]);
        assert_eq!(rows[2], vec!["Invoice 2", "2024-03-02T11:00:00Z", "No"]);
    }

    #[test]
    fn empty_results_yield_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Results.xlsx");
        save_results(&[], &path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec!["Email Name", "Time Sent", "Not Found"]);
    }

    #[test]
    fn saving_again_overwrites_the_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Results.xlsx");
        save_results(&[result("old", "t", false), result("old2", "t", false)], &path).unwrap();
        save_results(&[result("new", "t", true)], &path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["new", "t", "Yes"]);
    }

    #[test]
    fn same_input_twice_yields_identical_rows() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.xlsx");
        let b = dir.path().join("b.xlsx");
        let results = vec![result("x", "t", true)];
        save_results(&results, &a).unwrap();
        save_results(&results, &b).unwrap();
        assert_eq!(read_rows(&a), read_rows(&b));
    }
}
