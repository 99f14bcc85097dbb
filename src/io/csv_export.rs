use std::path::Path;

use crate::error::Result;
use crate::model::ProjectGraph;

/// Export a computed schedule to a semicolon-delimited CSV file.
///
/// Columns: Task ; Start ; End ; Duration ; Milestone. Rows are sorted by
/// start date, then task id, so successive exports of the same graph are
/// byte-identical. Returns the number of tasks written.
pub fn export_csv(graph: &ProjectGraph, path: &Path) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(["Task", "Start", "End", "Duration", "Milestone"])?;

    let mut tasks: Vec<_> = graph.tasks().collect();
    tasks.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    for task in &tasks {
        wtr.write_record([
            task.id.as_str(),
            &task.start.format("%Y-%m-%d").to_string(),
            &task.end().format("%Y-%m-%d").to_string(),
            &task.duration.to_string(),
            if task.is_milestone() { "yes" } else { "no" },
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(tasks.len())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn writes_sorted_schedule_rows() {
        let mut graph = ProjectGraph::new("p1");
        graph.add_task("task2", NaiveDate::from_ymd_opt(2016, 9, 15).unwrap(), 60);
        graph.add_task("task1", NaiveDate::from_ymd_opt(2016, 8, 15).unwrap(), 31);
        graph.add_task("milestone", NaiveDate::from_ymd_opt(2016, 8, 1).unwrap(), 0);

        let path = std::env::temp_dir().join(format!("taskgraph-{}.csv", Uuid::new_v4()));
        let written = export_csv(&graph, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(written, 3);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Task;Start;End;Duration;Milestone");
        assert_eq!(lines[1], "milestone;2016-08-01;2016-08-01;0;yes");
        assert_eq!(lines[2], "task1;2016-08-15;2016-09-15;31;no");
        assert_eq!(lines[3], "task2;2016-09-15;2016-11-14;60;no");
    }
}
