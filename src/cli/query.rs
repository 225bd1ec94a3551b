//! Query commands (deps, dependents, ready, blocked, status)

use anyhow::Result;

use super::app::Workspace;
use super::output::{join_ids, print_features, Output};
use crate::resolver::Resolver;

/// Show what a feature depends on
pub fn deps(workspace: &Workspace, output: &Output, id: &str, all: bool) -> Result<()> {
    let registry = workspace.load_registry()?;
    let resolver = Resolver::new(&registry);

    let ids = if all {
        resolver.all_dependencies(id)?
    } else {
        resolver.direct_dependencies(id)?
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "transitive": all,
            "dependencies": ids,
        }));
    } else if ids.is_empty() {
        println!("{} has no dependencies.", id);
    } else {
        println!("{} depends on ({}):", id, ids.len());
        print_features(&registry, &ids);
    }

    Ok(())
}

/// Show what depends on a feature
pub fn dependents(workspace: &Workspace, output: &Output, id: &str, all: bool) -> Result<()> {
    let registry = workspace.load_registry()?;
    let resolver = Resolver::new(&registry);

    let ids = if all {
        resolver.all_dependents(id)?
    } else {
        resolver.dependents(id)?
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "transitive": all,
            "dependents": ids,
        }));
    } else if ids.is_empty() {
        println!("Nothing depends on {}.", id);
    } else {
        println!("Depending on {} ({}):", id, ids.len());
        print_features(&registry, &ids);
    }

    Ok(())
}

/// Show features ready to start
pub fn ready(workspace: &Workspace, output: &Output) -> Result<()> {
    let registry = workspace.load_registry()?;
    let ready = Resolver::new(&registry).ready_features();
    tracing::debug!(count = ready.len(), "ready features");

    if output.is_json() {
        let items: Vec<_> = ready
            .iter()
            .filter_map(|id| registry.get(id))
            .map(|f| {
                serde_json::json!({
                    "id": f.id,
                    "name": f.name,
                    "status": f.status,
                })
            })
            .collect();
        output.data(&items);
    } else if ready.is_empty() {
        println!("No features ready to start.");
    } else {
        println!("Ready features ({}):", ready.len());
        print_features(&registry, &ready);
    }

    Ok(())
}

/// Show features waiting on dependencies
pub fn blocked(workspace: &Workspace, output: &Output) -> Result<()> {
    let registry = workspace.load_registry()?;
    let blocked = Resolver::new(&registry).blocked_features();
    tracing::debug!(count = blocked.len(), "blocked features");

    if output.is_json() {
        output.data(&blocked);
    } else if blocked.is_empty() {
        println!("No blocked features.");
    } else {
        println!("Blocked features ({}):", blocked.len());
        println!("{:<10} {:<30} BLOCKED BY", "ID", "NAME");
        println!("{}", "-".repeat(70));
        for entry in &blocked {
            let name = registry
                .get(&entry.id)
                .map(|f| f.name.as_str())
                .unwrap_or_default();
            println!(
                "{:<10} {:<30} {}",
                entry.id.to_string(),
                name,
                join_ids(&entry.blocked_by)
            );
        }
    }

    Ok(())
}

/// Show registry progress
pub fn status(workspace: &Workspace, output: &Output) -> Result<()> {
    let registry = workspace.load_registry()?;
    let resolver = Resolver::new(&registry);
    let progress = registry.progress();
    let ready_count = resolver.ready_features().len();
    let blocked_count = resolver.blocked_features().len();

    if output.is_json() {
        output.data(&serde_json::json!({
            "project_id": registry.project_id(),
            "version": registry.version(),
            "last_updated": registry.last_updated(),
            "overall_progress": progress,
            "ready": ready_count,
            "blocked": blocked_count,
        }));
    } else {
        println!("Registry Status");
        println!("{}", "=".repeat(40));
        if let Some(project_id) = registry.project_id() {
            println!("Project: {}", project_id);
        }
        if let Some(updated) = registry.last_updated() {
            println!("Updated: {}", updated.format("%Y-%m-%d %H:%M UTC"));
        }
        println!();
        println!(
            "Features: {} total ({}% complete)",
            progress.total_features, progress.completion_percentage
        );
        println!("  [ ] Planned:     {}", progress.planned);
        println!("  [~] In Progress: {}", progress.in_progress);
        println!("  [?] Testing:     {}", progress.testing);
        println!("  [?] Review:      {}", progress.review);
        println!("  [x] Completed:   {}", progress.completed);
        println!();
        println!("  Ready to start:  {}", ready_count);
        println!("  Blocked:         {}", blocked_count);
    }

    Ok(())
}
