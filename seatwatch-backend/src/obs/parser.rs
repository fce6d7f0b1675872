//! HTML parsing for the public course schedule pages.

use scraper::{ElementRef, Html, Selector};
use seatwatch_common::SeatStatus;

use crate::source::QueryError;

/// Program selector on the schedule landing page
const PROGRAM_OPTION_SELECTOR: &str = "select#dersBransKoduId > option";
const PROGRAM_PLACEHOLDER: &str = "Ders Kodu Seçiniz";

const SCHEDULE_TABLE_SELECTOR: &str = "table#dersProgramContainer";

/// A schedule row must have at least this many cells to carry seat counts
const MIN_ROW_CELLS: usize = 11;

// Column layout of the schedule table
const COL_CRN: usize = 0;
const COL_COURSE_CODE: usize = 1;
const COL_COURSE_NAME: usize = 2;
const COL_DAY: usize = 6;
const COL_TIME: usize = 7;
const COL_CAPACITY: usize = 9;
const COL_ENROLLED: usize = 10;

fn selector(css: &str) -> Result<Selector, QueryError> {
    Selector::parse(css).map_err(|e| QueryError::ParseFailure(format!("invalid selector {}: {:?}", css, e)))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-numeric counts (blank cells, "-") read as zero
fn parse_count(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

/// Extract `(code, provider_id)` pairs from the program dropdown.
///
/// Returns `None` when the page has no program dropdown at all.
pub fn parse_program_options(html: &str) -> Result<Option<Vec<(String, String)>>, QueryError> {
    let document = Html::parse_document(html);
    let option_sel = selector(PROGRAM_OPTION_SELECTOR)?;
    let select_sel = selector("select#dersBransKoduId")?;

    if document.select(&select_sel).next().is_none() {
        return Ok(None);
    }

    let mut programs = Vec::new();
    for option in document.select(&option_sel) {
        let value = option.value().attr("value").unwrap_or("").trim();
        let text = cell_text(option);

        if value.is_empty() || text.is_empty() || text == PROGRAM_PLACEHOLDER || text.chars().count() < 3 {
            continue;
        }
        programs.push((text, value.to_string()));
    }

    Ok(Some(programs))
}

/// Find `section` in a program's schedule page and read its seat counts
pub fn parse_seat_table(html: &str, section: &str) -> Result<SeatStatus, QueryError> {
    let document = Html::parse_document(html);
    let table_sel = selector(SCHEDULE_TABLE_SELECTOR)?;
    let any_table_sel = selector("table")?;
    let tbody_sel = selector("tbody")?;
    let row_sel = selector("tr")?;
    let td_sel = selector("td")?;

    let table = match document.select(&table_sel).next() {
        Some(table) => table,
        None => {
            let table = document
                .select(&any_table_sel)
                .next()
                .ok_or_else(|| QueryError::ParseFailure("no schedule table in page".to_string()))?;
            tracing::warn!("Schedule table has no id, using the first table in the page");
            table
        }
    };

    let tbody = table
        .select(&tbody_sel)
        .next()
        .ok_or_else(|| QueryError::ParseFailure("schedule table has no body".to_string()))?;

    let mut rows = 0usize;
    for row in tbody.select(&row_sel) {
        let cells: Vec<String> = row.select(&td_sel).map(cell_text).collect();
        if cells.len() < MIN_ROW_CELLS {
            continue;
        }
        rows += 1;

        if cells[COL_CRN] != section {
            continue;
        }

        let status = SeatStatus {
            found: true,
            course_code: cells[COL_COURSE_CODE].clone(),
            course_name: cells[COL_COURSE_NAME].clone(),
            day: cells[COL_DAY].clone(),
            time_slot: cells[COL_TIME].clone(),
            capacity: parse_count(&cells[COL_CAPACITY]),
            enrolled: parse_count(&cells[COL_ENROLLED]),
        };
        tracing::debug!(
            "Found {} ({}): capacity {}, enrolled {}",
            section,
            status.course_code,
            status.capacity,
            status.enrolled
        );
        return Ok(status);
    }

    tracing::debug!("Section {} not among {} schedule rows", section, rows);
    Ok(SeatStatus::not_found())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(crn: &str, code: &str, capacity: &str, enrolled: &str) -> String {
        format!(
            "<tr><td>{crn}</td><td>{code}</td><td>Intro to {code}</td><td>Eng</td><td>-</td>\
             <td>MED A</td><td>Pazartesi</td><td>0830/1129</td><td>D101</td>\
             <td>{capacity}</td><td>{enrolled}</td><td></td></tr>"
        )
    }

    fn page(table_attrs: &str, rows: &[String]) -> String {
        format!(
            "<html><body><table {table_attrs}><thead><tr><th>CRN</th></tr></thead>\
             <tbody>{}</tbody></table></body></html>",
            rows.concat()
        )
    }

    #[test]
    fn test_parse_seat_table_finds_section() {
        let html = page(
            r#"id="dersProgramContainer""#,
            &[row("11111", "END 101", "30", "30"), row("22222", "END 102", "40", "12")],
        );

        let status = parse_seat_table(&html, "22222").unwrap();
        assert!(status.found);
        assert_eq!(status.course_code, "END 102");
        assert_eq!(status.course_name, "Intro to END 102");
        assert_eq!(status.day, "Pazartesi");
        assert_eq!(status.time_slot, "0830/1129");
        assert_eq!((status.capacity, status.enrolled), (40, 12));
        assert_eq!(status.open_seats(), 28);
    }

    #[test]
    fn test_parse_seat_table_missing_section() {
        let html = page(r#"id="dersProgramContainer""#, &[row("11111", "END 101", "30", "30")]);
        assert_eq!(parse_seat_table(&html, "99999").unwrap(), SeatStatus::not_found());
    }

    #[test]
    fn test_parse_seat_table_non_numeric_counts() {
        let html = page(r#"id="dersProgramContainer""#, &[row("11111", "END 101", "-", "")]);
        let status = parse_seat_table(&html, "11111").unwrap();
        assert!(status.found);
        assert_eq!((status.capacity, status.enrolled), (0, 0));
    }

    #[test]
    fn test_parse_seat_table_skips_short_rows() {
        let html = page(
            r#"id="dersProgramContainer""#,
            &["<tr><td>11111</td><td>short</td></tr>".to_string(), row("11111", "END 101", "5", "1")],
        );
        let status = parse_seat_table(&html, "11111").unwrap();
        assert_eq!(status.course_code, "END 101");
    }

    #[test]
    fn test_parse_seat_table_falls_back_to_first_table() {
        let html = page(r#"class="schedule""#, &[row("11111", "END 101", "5", "1")]);
        assert!(parse_seat_table(&html, "11111").unwrap().found);
    }

    #[test]
    fn test_parse_seat_table_errors() {
        assert!(matches!(
            parse_seat_table("<html><body><p>maintenance</p></body></html>", "1"),
            Err(QueryError::ParseFailure(_))
        ));
        assert!(matches!(
            parse_seat_table("<html><body><table></table></body></html>", "1"),
            Err(QueryError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_parse_program_options() {
        let html = r#"<html><body><select id="dersBransKoduId">
            <option value="">Ders Kodu Seçiniz</option>
            <option value="15">END</option>
            <option value="34"> TUR </option>
            <option value="9">XY</option>
            <option value="">MAT</option>
        </select></body></html>"#;

        let programs = parse_program_options(html).unwrap().unwrap();
        assert_eq!(
            programs,
            vec![("END".to_string(), "15".to_string()), ("TUR".to_string(), "34".to_string())]
        );
    }

    #[test]
    fn test_parse_program_options_without_dropdown() {
        assert_eq!(parse_program_options("<html><body></body></html>").unwrap(), None);
    }
}
