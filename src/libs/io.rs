use crate::libs::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Write;

/// Deserialize a JSON document from a file, `stdin`, or a gzipped file.
///
/// ```
/// let strains: Vec<String> = gnhm::read_json("tests/heatmap/strains.json").unwrap();
/// assert_eq!(strains.len(), 6);
/// ```
pub fn read_json<T: DeserializeOwned>(input: &str) -> Result<T> {
    let reader = intspan::reader(input);
    let value = serde_json::from_reader(reader)?;

    Ok(value)
}

/// Pretty-print `value` as JSON to a file or `stdout`.
pub fn write_json<T: Serialize>(output: &str, value: &T) -> Result<()> {
    let mut writer = intspan::writer(output);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

/// Format an optional number for tab-separated output, `NA` for missing.
pub fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "NA".to_string(),
    }
}

// Chromosome names show up both as `"X"` and as bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    Number(i64),
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        match label {
            Label::Text(s) => s,
            Label::Number(n) => n.to_string(),
        }
    }
}

pub(crate) fn de_label<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Label::deserialize(deserializer)?.into())
}

pub(crate) fn de_opt_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Label>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.json");
        let path = path.to_string_lossy().to_string();

        write_json(&path, &vec![2usize, 0, 1]).unwrap();
        let order: Vec<usize> = read_json(&path).unwrap();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(5.0)), "5");
        assert_eq!(fmt_opt(Some(7.25)), "7.25");
        assert_eq!(fmt_opt(None), "NA");
    }
}
