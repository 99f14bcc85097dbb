use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use taskgraph::dao::MemoryStore;
use taskgraph::io::csv_import;
use taskgraph::GraphRegistry;

#[tokio::main]
async fn main() -> taskgraph::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => {
            eprintln!("usage: taskgraph <schedule.csv>");
            std::process::exit(2);
        }
    };

    let fallback_project = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("imported")
        .to_string();

    let import = csv_import::import_csv(&path, &fallback_project)?;
    if import.skipped > 0 {
        eprintln!("warning: {} rows skipped", import.skipped);
    }

    let store = MemoryStore::new();
    for task in import.tasks {
        store.insert_task(task);
    }
    for relation in import.relations {
        store.insert_task_relation(relation);
    }

    // Load runs the batch cycle check and computes every project.
    let registry = GraphRegistry::load(&store).await?;

    for project in registry.projects() {
        println!("project {}", project.id());
        let mut tasks: Vec<_> = project.tasks().collect();
        tasks.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        for task in tasks {
            println!(
                "  {:<20} {} -> {} ({} days{})",
                task.id,
                task.start.format("%Y-%m-%d"),
                task.end().format("%Y-%m-%d"),
                task.duration,
                if task.is_milestone() { ", milestone" } else { "" },
            );
        }
        let mut delays: Vec<_> = project.delays().collect();
        delays.sort_by(|a, b| a.id.cmp(&b.id));
        for delay in delays {
            println!(
                "  delay {:<14} {} margin {} days",
                delay.id,
                delay.date.format("%Y-%m-%d"),
                delay.margin,
            );
        }
    }

    Ok(())
}
