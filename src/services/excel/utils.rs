use std::collections::HashSet;
use chrono::{NaiveDate, NaiveDateTime};
use calamine::Data;

/// Unix epoch expressed as an Excel serial day number.
const EXCEL_UNIX_EPOCH: f64 = 25569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Date,
    Boolean,
    Text,
}

/// Header text for column `idx`, deduplicated against headers already taken.
///
/// Blank headers become `Unnamed: <idx>`; repeats get `.1`, `.2`, ... suffixes.
pub fn header_name(cell: &Data, idx: usize, existing_names: &mut HashSet<String>) -> String {
    let base_name = match cell {
        Data::Empty => format!("Unnamed: {}", idx),
        Data::String(s) if s.trim().is_empty() => format!("Unnamed: {}", idx),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    };

    let mut name = base_name.clone();
    let mut counter = 1;
    while !existing_names.insert(name.clone()) {
        name = format!("{}.{}", base_name, counter);
        counter += 1;
    }

    name
}

pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%d/%m/%Y %H:%M:%S",
    ];
    let date_formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d-%m-%Y",
    ];

    datetime_formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn is_date_string(s: &str) -> bool {
    parse_date_string(s).is_some()
}

/// Milliseconds since the Unix epoch for a date-like cell.
pub fn cell_timestamp_millis(value: &Data) -> Option<i64> {
    match value {
        Data::DateTime(d) => Some(((d.as_f64() - EXCEL_UNIX_EPOCH) * MILLIS_PER_DAY).round() as i64),
        Data::DateTimeIso(s) | Data::String(s) => {
            parse_date_string(s).map(|dt| dt.and_utc().timestamp_millis())
        }
        _ => None,
    }
}

pub fn cell_number(value: &Data) -> Option<f64> {
    match value {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => None,
    }
}

pub fn detect_column_type(values: &[Data]) -> ColumnKind {
    let mut numeric_count = 0;
    let mut integral_count = 0;
    let mut date_count = 0;
    let mut bool_count = 0;
    let mut total_count = 0;

    for value in values.iter().filter(|v| !matches!(v, Data::Empty)) {
        total_count += 1;
        match value {
            Data::Int(_) => {
                numeric_count += 1;
                integral_count += 1;
            }
            Data::Float(f) => {
                numeric_count += 1;
                if f.fract() == 0.0 {
                    integral_count += 1;
                }
            }
            Data::DateTime(_) | Data::DateTimeIso(_) => date_count += 1,
            Data::String(s) if is_date_string(s) => date_count += 1,
            Data::Bool(_) => bool_count += 1,
            _ => {}
        }
    }

    if total_count == 0 {
        return ColumnKind::Text;
    }

    // A typed column must hold every non-empty cell; anything mixed stays text
    if numeric_count == total_count {
        if integral_count == values.len() {
            ColumnKind::Integer
        } else {
            ColumnKind::Float
        }
    } else if date_count == total_count {
        ColumnKind::Date
    } else if bool_count == total_count {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_are_deduplicated() {
        let mut seen = HashSet::new();
        let a = header_name(&Data::String("price".into()), 0, &mut seen);
        let b = header_name(&Data::String("price".into()), 1, &mut seen);
        let c = header_name(&Data::Empty, 2, &mut seen);
        let d = header_name(&Data::Float(2024.0), 3, &mut seen);
        assert_eq!((a.as_str(), b.as_str(), c.as_str(), d.as_str()), ("price", "price.1", "Unnamed: 2", "2024"));
    }

    #[test]
    fn test_detects_integer_only_without_gaps() {
        let ints = vec![Data::Int(1), Data::Float(2.0), Data::Int(3)];
        assert_eq!(detect_column_type(&ints), ColumnKind::Integer);

        let with_gap = vec![Data::Int(1), Data::Empty, Data::Int(3)];
        assert_eq!(detect_column_type(&with_gap), ColumnKind::Float);
    }

    #[test]
    fn test_detects_dates_booleans_and_text() {
        let dates = vec![Data::String("2024-01-31".into()), Data::String("2024-02-01".into())];
        assert_eq!(detect_column_type(&dates), ColumnKind::Date);

        let flags = vec![Data::Bool(true), Data::Bool(false), Data::Empty];
        assert_eq!(detect_column_type(&flags), ColumnKind::Boolean);

        let mixed = vec![Data::String("a".into()), Data::Int(1)];
        assert_eq!(detect_column_type(&mixed), ColumnKind::Text);

        assert_eq!(detect_column_type(&[Data::Empty, Data::Empty]), ColumnKind::Text);
    }

    #[test]
    fn test_one_text_cell_keeps_column_text() {
        let mostly_numbers = vec![
            Data::Int(1),
            Data::Int(2),
            Data::Int(3),
            Data::Int(4),
            Data::String("x".into()),
        ];
        assert_eq!(detect_column_type(&mostly_numbers), ColumnKind::Text);

        let mostly_dates = vec![
            Data::String("2024-01-31".into()),
            Data::String("2024-02-01".into()),
            Data::String("soon".into()),
        ];
        assert_eq!(detect_column_type(&mostly_dates), ColumnKind::Text);
    }

    #[test]
    fn test_date_strings_parse_to_epoch_millis() {
        assert_eq!(cell_timestamp_millis(&Data::String("1970-01-02".into())), Some(86_400_000));
        assert_eq!(cell_timestamp_millis(&Data::String("not a date".into())), None);
    }
}
