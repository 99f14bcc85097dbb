use std::path::Path;

use chrono::NaiveDate;
use tracing::warn;

use crate::dao::{TaskRecord, TaskRelationRecord};
use crate::error::{Error, Result};
use crate::model::Anchor;

/// Result of a CSV bulk import: task baselines plus the dependency edges
/// named by the parent columns.
#[derive(Debug)]
pub struct CsvImport {
    pub tasks: Vec<TaskRecord>,
    pub relations: Vec<TaskRelationRecord>,
    pub skipped: usize,
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

fn parse_anchor(s: &str) -> Anchor {
    match s.trim().to_lowercase().as_str() {
        "beginning" | "begin" | "start" => Anchor::Beginning,
        // Finish-to-start is the common dependency kind; default to End.
        _ => Anchor::End,
    }
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

/// Map a normalized header to our column index:
///   0 = project, 1 = task, 2 = start, 3 = duration, 4 = parent,
///   5 = lag, 6 = anchor
fn header_to_col(normalized: &str) -> Option<usize> {
    match normalized {
        "project" | "projectid" | "proj" => Some(0),

        "task" | "taskid" | "id" | "name" | "label" => Some(1),

        "start" | "startdate" | "estimatedstart" | "begin" | "begindate" => Some(2),

        "duration" | "days" | "estimatedduration" | "length" => Some(3),

        "parent" | "parenttask" | "after" | "dependson" => Some(4),

        "lag" | "offset" | "delaydays" => Some(5),

        "anchor" | "from" | "previouslocation" => Some(6),

        _ => None,
    }
}

/// Import a project schedule from a CSV file.
///
/// Auto-detects the delimiter (comma, semicolon, tab) and matches column
/// headers flexibly (e.g. "Task Id", "Start Date", "Depends On"). Each row is
/// one task; an optional parent column adds a dependency edge whose lag and
/// anchor come from the matching columns. Rows without a project column fall
/// back to `fallback_project`.
pub fn import_csv(path: &Path, fallback_project: &str) -> Result<CsvImport> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Import(format!("failed to read {}: {}", path.display(), e)))?;
    import_records(&content, fallback_project)
}

/// Parse CSV content already in memory. See [`import_csv`].
pub fn import_records(content: &str, fallback_project: &str) -> Result<CsvImport> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<usize>> = headers
        .iter()
        .map(|h| header_to_col(&normalize_header(h)))
        .collect();

    let has_task = col_map.iter().any(|c| *c == Some(1));
    let has_start = col_map.iter().any(|c| *c == Some(2));
    let has_duration = col_map.iter().any(|c| *c == Some(3));
    if !has_task || !has_start || !has_duration {
        let found: Vec<&str> = headers.iter().collect();
        return Err(Error::Import(format!(
            "CSV is missing required columns. Found headers: {:?}. \
             Need columns for: task id, start date, duration.",
            found
        )));
    }

    let mut tasks: Vec<TaskRecord> = Vec::new();
    let mut relations: Vec<TaskRelationRecord> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping CSV row {}: {}", i + 2, e);
                skipped += 1;
                continue;
            }
        };

        let mut project_val = None;
        let mut task_val = None;
        let mut start_val = None;
        let mut duration_val = None;
        let mut parent_val: Option<String> = None;
        let mut lag_val: Option<String> = None;
        let mut anchor_val: Option<String> = None;

        for (col_idx, field) in record.iter().enumerate() {
            if col_idx < col_map.len() {
                match col_map[col_idx] {
                    Some(0) => project_val = Some(field.trim().to_string()),
                    Some(1) => task_val = Some(field.trim().to_string()),
                    Some(2) => start_val = Some(field.trim().to_string()),
                    Some(3) => duration_val = Some(field.trim().to_string()),
                    Some(4) => parent_val = Some(field.trim().to_string()),
                    Some(5) => lag_val = Some(field.trim().to_string()),
                    Some(6) => anchor_val = Some(field.trim().to_string()),
                    _ => {}
                }
            }
        }

        let task_id = match task_val {
            Some(t) if !t.is_empty() => t,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let estimated_start = match start_val.as_deref().and_then(parse_date) {
            Some(d) => d,
            None => {
                warn!(
                    "skipping row {}: invalid start date '{}'",
                    i + 2,
                    start_val.as_deref().unwrap_or("")
                );
                skipped += 1;
                continue;
            }
        };

        let estimated_duration = match duration_val.as_deref().map(str::trim) {
            Some(v) => match v.parse::<i64>() {
                Ok(n) if n >= 0 => n,
                _ => {
                    warn!("skipping row {}: invalid duration '{}'", i + 2, v);
                    skipped += 1;
                    continue;
                }
            },
            None => {
                skipped += 1;
                continue;
            }
        };

        let project_id = project_val
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| fallback_project.to_string());

        if let Some(parent) = parent_val.filter(|p| !p.is_empty()) {
            let lag = lag_val
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| v.parse::<i64>())
                .transpose()
                .map_err(|e| Error::Import(format!("row {}: invalid lag: {}", i + 2, e)))?
                .unwrap_or(0);
            relations.push(TaskRelationRecord {
                project_id: project_id.clone(),
                parent,
                child: task_id.clone(),
                lag,
                anchor: parse_anchor(anchor_val.as_deref().unwrap_or("")),
            });
        }

        tasks.push(TaskRecord {
            project_id,
            id: task_id,
            estimated_start,
            estimated_duration,
            modifiers: Vec::new(),
        });
    }

    if tasks.is_empty() && skipped > 0 {
        return Err(Error::Import(format!(
            "no valid tasks found in CSV ({} rows skipped)",
            skipped
        )));
    }
    if tasks.is_empty() {
        return Err(Error::Import("CSV file is empty or has no data rows".to_string()));
    }

    Ok(CsvImport {
        tasks,
        relations,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_tasks_and_relations() {
        let csv = "\
project,task,start,duration,parent,lag,anchor
p1,task1,2016-08-15,31,,,
p1,task2,2016-09-15,60,task1,0,end
p1,task3,2016-09-20,5,task2,2,beginning
";
        let import = import_records(csv, "fallback").unwrap();
        assert_eq!(import.tasks.len(), 3);
        assert_eq!(import.relations.len(), 2);
        assert_eq!(import.skipped, 0);

        let rel = &import.relations[0];
        assert_eq!(rel.parent, "task1");
        assert_eq!(rel.child, "task2");
        assert!(matches!(rel.anchor, Anchor::End));
        assert!(matches!(import.relations[1].anchor, Anchor::Beginning));
        assert_eq!(import.relations[1].lag, 2);
    }

    #[test]
    fn semicolon_delimiter_and_loose_headers() {
        let csv = "\
Task Id;Start Date;Duration;Depends On
task1;15/08/2016;31;
task2;15/09/2016;60;task1
";
        let import = import_records(csv, "p1").unwrap();
        assert_eq!(import.tasks.len(), 2);
        assert_eq!(import.tasks[0].project_id, "p1");
        assert_eq!(
            import.tasks[0].estimated_start,
            NaiveDate::from_ymd_opt(2016, 8, 15).unwrap()
        );
        assert_eq!(import.relations.len(), 1);
    }

    #[test]
    fn bad_rows_are_counted_not_fatal() {
        let csv = "\
task,start,duration
task1,2016-08-15,31
task2,not-a-date,10
task3,2016-08-20,oops
";
        let import = import_records(csv, "p1").unwrap();
        assert_eq!(import.tasks.len(), 1);
        assert_eq!(import.skipped, 2);
    }

    #[test]
    fn missing_required_columns_fail() {
        let csv = "task,notes\ntask1,hello\n";
        assert!(matches!(
            import_records(csv, "p1"),
            Err(Error::Import(_))
        ));
    }
}
