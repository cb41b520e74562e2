/// Result tables: admin attribute columns joined with named metric columns,
/// one row per zone, exported as CSV.
use std::fs;
use std::path::Path;

use crate::boundaries::AdminBoundaries;
use crate::error::{HazexError, Result};

#[derive(Debug, Clone)]
pub struct ResultTable {
    admin_columns: Vec<String>,
    /// Admin attribute values per row, aligned with `admin_columns`.
    rows: Vec<Vec<String>>,
    metric_names: Vec<String>,
    /// Metric values per column, aligned with `rows`.
    metrics: Vec<Vec<Option<f64>>>,
}

impl ResultTable {
    /// A table with the boundary file's admin columns and one row per zone,
    /// no metrics yet (the original drops the geometry column here).
    pub fn from_boundaries(boundaries: &AdminBoundaries) -> Self {
        Self {
            admin_columns: boundaries.columns.clone(),
            rows: boundaries.attributes.clone(),
            metric_names: Vec::new(),
            metrics: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a metric column. The value count must equal the row count.
    pub fn push_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(HazexError::ColumnLength {
                column: name.to_string(),
                got: values.len(),
                expected: self.rows.len(),
            });
        }
        self.metric_names.push(name.to_string());
        self.metrics.push(values);
        Ok(())
    }

    pub fn metric(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.metric_names.iter().position(|n| n == name)?;
        Some(&self.metrics[idx])
    }

    pub fn headers(&self) -> Vec<&str> {
        self.admin_columns
            .iter()
            .chain(self.metric_names.iter())
            .map(String::as_str)
            .collect()
    }

    /// Sort rows by (adm1_src, adm2_src) when an adm2_src column exists,
    /// keeping metric columns aligned. Tables without adm2_src keep file
    /// order. The sort is stable.
    pub fn sort_rows(&mut self) {
        let adm2 = match self.admin_columns.iter().position(|c| c == "adm2_src") {
            Some(i) => i,
            None => return,
        };
        let adm1 = self.admin_columns.iter().position(|c| c == "adm1_src");

        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| {
            let key = |r: usize| {
                let row = &self.rows[r];
                (adm1.map(|i| row[i].as_str()).unwrap_or(""), row[adm2].as_str())
            };
            key(a).cmp(&key(b))
        });

        let rows = order.iter().map(|&i| self.rows[i].clone()).collect();
        self.rows = rows;
        for column in &mut self.metrics {
            let sorted: Vec<Option<f64>> = order.iter().map(|&i| column[i]).collect();
            *column = sorted;
        }
    }

    fn write_to<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut w = csv::Writer::from_writer(writer);
        w.write_record(self.headers())?;
        for (i, row) in self.rows.iter().enumerate() {
            let mut record: Vec<String> = row.clone();
            for column in &self.metrics {
                record.push(match column[i] {
                    Some(v) => format_metric(v),
                    None => String::new(),
                });
            }
            w.write_record(&record)?;
        }
        w.flush().map_err(|e| HazexError::io("<csv writer>", e))?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| HazexError::io(parent, e))?;
            }
        }
        let file = fs::File::create(path).map_err(|e| HazexError::io(path, e))?;
        self.write_to(file)
    }

    /// The CSV rendering as a String, for stdout and the HTTP download.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        // csv output is valid UTF-8 by construction.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Metric formatting for CSV cells: integral values without a trailing
/// fraction, everything else via the shortest f64 representation.
fn format_metric(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundaries::AdminBoundaries;

    fn table_adm2(rows: &[(&str, &str)]) -> ResultTable {
        let boundaries = AdminBoundaries {
            columns: vec!["adm1_src".into(), "adm2_src".into()],
            attributes: rows
                .iter()
                .map(|(a1, a2)| vec![a1.to_string(), a2.to_string()])
                .collect(),
            zones: Vec::new(),
        };
        ResultTable::from_boundaries(&boundaries)
    }

    #[test]
    fn push_column_checks_length() {
        let mut t = table_adm2(&[("A", "1"), ("A", "2")]);
        assert!(t.push_column("x", vec![Some(1.0)]).is_err());
        assert!(t.push_column("x", vec![Some(1.0), None]).is_ok());
    }

    #[test]
    fn sort_orders_by_adm1_then_adm2() {
        let mut t = table_adm2(&[("B", "1"), ("A", "2"), ("A", "1")]);
        t.push_column("v", vec![Some(10.0), Some(20.0), Some(30.0)]).unwrap();
        t.sort_rows();
        let csv = t.to_csv_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "adm1_src,adm2_src,v");
        assert_eq!(lines[1], "A,1,30");
        assert_eq!(lines[2], "A,2,20");
        assert_eq!(lines[3], "B,1,10");
    }

    #[test]
    fn sort_skipped_without_adm2() {
        let boundaries = AdminBoundaries {
            columns: vec!["adm1_src".into()],
            attributes: vec![vec!["B".into()], vec!["A".into()]],
            zones: Vec::new(),
        };
        let mut t = ResultTable::from_boundaries(&boundaries);
        t.sort_rows();
        let csv = t.to_csv_string().unwrap();
        assert_eq!(csv.lines().nth(1), Some("B"));
    }

    #[test]
    fn none_renders_as_empty_field() {
        let mut t = table_adm2(&[("A", "1")]);
        t.push_column("pop_exp", vec![None]).unwrap();
        t.push_column("exp_ratio", vec![Some(0.25)]).unwrap();
        let csv = t.to_csv_string().unwrap();
        assert_eq!(csv.lines().nth(1), Some("A,1,,0.25"));
    }

    #[test]
    fn metric_lookup_by_name() {
        let mut t = table_adm2(&[("A", "1")]);
        t.push_column("max_speed", vec![Some(42.0)]).unwrap();
        assert_eq!(t.metric("max_speed").unwrap()[0], Some(42.0));
        assert!(t.metric("missing").is_none());
    }
}
