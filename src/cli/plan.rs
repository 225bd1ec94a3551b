//! Planning commands (check, validate, order, plan)

use anyhow::{bail, Result};

use super::app::Workspace;
use super::output::{join_ids, print_features, Output};
use crate::domain::FeatureId;
use crate::resolver::{format_cycle, full_order, ResolveError, ResolveOptions, Resolver};

/// Check the whole registry
pub fn check(workspace: &Workspace, output: &Output) -> Result<()> {
    let registry = workspace.load_registry()?;
    let resolver = Resolver::new(&registry);
    let report = resolver.check();

    if output.is_json() {
        output.data(&report);
    } else {
        println!(
            "Registry: {} ({} features)",
            workspace.registry_path.display(),
            report.feature_count
        );

        if let Some(cycle) = &report.cycle {
            println!("  Cycle:            {}", format_cycle(cycle));
        }
        for missing in &report.missing_references {
            println!(
                "  Missing:          {} depends on {}",
                missing.feature, missing.missing
            );
        }
        for invalid in &report.invalid_references {
            println!(
                "  Invalid:          {} depends on '{}'",
                invalid.feature, invalid.reference
            );
        }
        for rejected in &report.rejected_ids {
            println!("  Rejected record:  '{}'", rejected);
        }
        if report.healthy {
            println!("OK: no problems found");
        }
    }

    if !report.healthy {
        bail!("Registry check failed");
    }
    Ok(())
}

/// Validate the dependencies of `ids`
pub fn validate(workspace: &Workspace, output: &Output, ids: &[String]) -> Result<()> {
    let registry = workspace.load_registry()?;
    let report = Resolver::new(&registry).validate_dependencies(ids);

    if output.is_json() {
        output.data(&report);
    } else {
        println!(
            "Validation: {}",
            if report.valid { "passed" } else { "failed" }
        );
        print_list("Satisfied", &report.satisfied_dependencies);
        print_list("Incomplete", &report.incomplete_dependencies);
        print_list("Missing", &report.missing_dependencies);
        if !report.invalid_identifiers.is_empty() {
            println!("  {:<12} {}", "Invalid:", report.invalid_identifiers.join(", "));
        }
    }

    if let Some(message) = &report.error_message {
        bail!("{}", message);
    }
    Ok(())
}

/// Print the execution order for `ids`, or for the whole registry
pub fn order(workspace: &Workspace, output: &Output, ids: &[String]) -> Result<()> {
    let registry = workspace.load_registry()?;
    let resolver = Resolver::new(&registry);

    let result = if ids.is_empty() {
        full_order(resolver.graph())
    } else {
        resolver.execution_order(ids)
    };
    let order = match result {
        Ok(order) => order,
        Err(e) => return Err(report_failure(output, e)),
    };

    if output.is_json() {
        output.data(&serde_json::json!({ "order": order }));
    } else if order.is_empty() {
        println!("Nothing to order.");
    } else {
        println!("Execution order ({}):", order.len());
        print_features(&registry, &order);
    }

    Ok(())
}

/// Build an execution plan for `ids`
pub fn plan(
    workspace: &Workspace,
    output: &Output,
    ids: &[String],
    options: ResolveOptions,
) -> Result<()> {
    let registry = workspace.load_registry()?;
    let plan = match Resolver::new(&registry).resolve(ids, options) {
        Ok(plan) => plan,
        Err(e) => return Err(report_failure(output, e)),
    };

    if output.is_json() {
        output.data(&plan);
        return Ok(());
    }

    println!("Execution plan ({} features):", plan.order.len());
    println!("{:<4} {:<10} {:<14} {:<12} NAME", "#", "ID", "STATUS", "ROLE");
    println!("{}", "-".repeat(70));
    for (step, id) in plan.order.iter().enumerate() {
        let role = if plan.included_dependencies.contains(id) {
            "dependency"
        } else {
            "requested"
        };
        let (status, name) = registry
            .get(id)
            .map(|f| (f.status.as_str(), f.name.as_str()))
            .unwrap_or(("(missing)", ""));
        println!(
            "{:<4} {:<10} {:<14} {:<12} {}",
            step + 1,
            id.to_string(),
            status,
            role,
            name
        );
    }

    if !plan.warnings.is_empty() {
        println!();
        for warning in &plan.warnings {
            println!("Warning: {}", warning);
        }
    }

    Ok(())
}

/// Emits the structured details of a resolver failure, then hands the error back
fn report_failure(output: &Output, error: ResolveError) -> anyhow::Error {
    if output.is_json() {
        output.data(&serde_json::json!({
            "success": false,
            "error": error.to_string(),
            "cycle": error.cycle(),
            "validation": error.report(),
        }));
    }
    error.into()
}

fn print_list(label: &str, ids: &[FeatureId]) {
    if !ids.is_empty() {
        println!("  {:<12} {}", format!("{}:", label), join_ids(ids));
    }
}
