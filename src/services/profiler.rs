use polars::prelude::DataType;
use crate::models::{ColumnMap, Dataset, Profile};

/// Readable name of an inferred column type. Stable for identical input.
pub fn dtype_name(dtype: &DataType) -> String {
    match dtype {
        DataType::Boolean => "bool".to_string(),
        DataType::Int32 => "int32".to_string(),
        DataType::Int64 => "int64".to_string(),
        DataType::UInt32 => "uint32".to_string(),
        DataType::UInt64 => "uint64".to_string(),
        DataType::Float32 => "float32".to_string(),
        DataType::Float64 => "float64".to_string(),
        DataType::String => "str".to_string(),
        DataType::Date => "date".to_string(),
        DataType::Datetime(_, _) => "datetime".to_string(),
        DataType::Duration(_) => "duration".to_string(),
        DataType::Null => "null".to_string(),
        other => other.to_string(),
    }
}

pub fn profile(dataset: &Dataset) -> Profile {
    let columns = dataset.columns();
    Profile {
        rows: dataset.row_count(),
        cols: dataset.column_count(),
        columns: dataset.column_names(),
        dtypes: ColumnMap(
            columns
                .iter()
                .map(|series| (series.name().to_string(), dtype_name(series.dtype())))
                .collect(),
        ),
        null_counts: ColumnMap(
            columns
                .iter()
                .map(|series| (series.name().to_string(), series.null_count()))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::loader::load;
    use bytes::Bytes;
    use polars::prelude::*;

    #[test]
    fn test_profile_people_csv() {
        let dataset = load(Bytes::from("age,city\n31,Lisbon\n,Porto\n45,Braga\n"), Some("people.csv")).unwrap();
        let prof = profile(&dataset);

        assert_eq!(prof.rows, 3);
        assert_eq!(prof.cols, 2);
        assert_eq!(prof.columns, vec!["age", "city"]);
        assert_eq!(prof.dtypes.get("age").map(String::as_str), Some("int64"));
        assert_eq!(prof.dtypes.get("city").map(String::as_str), Some("str"));
        assert_eq!(prof.null_counts.get("age"), Some(&1));
        assert_eq!(prof.null_counts.get("city"), Some(&0));
    }

    #[test]
    fn test_null_counts_sum_to_missing_cells() {
        let dataset = load(
            Bytes::from("a,b,c\n1,,x\n,,\n3,2.5,\n"),
            Some("gaps.csv"),
        )
        .unwrap();
        let prof = profile(&dataset);
        assert_eq!(prof.null_counts.values().sum::<usize>(), dataset.missing_cells());
        assert_eq!(dataset.column("a").unwrap().null_count(), 1);
    }

    #[test]
    fn test_profile_of_empty_dataset() {
        let prof = profile(&Dataset::new("empty", DataFrame::default()));
        assert_eq!((prof.rows, prof.cols), (0, 0));
        assert!(prof.columns.is_empty());
        assert!(prof.dtypes.is_empty());
        assert!(prof.null_counts.is_empty());
    }

    #[test]
    fn test_profile_is_deterministic() {
        let content = "x,y,label\n1.5,2.0,a\n2.5,,b\n";
        let first = profile(&load(Bytes::from(content), Some("one.csv")).unwrap());
        let second = profile(&load(Bytes::from(content), Some("two.csv")).unwrap());
        assert_eq!(first, second);
    }
}
