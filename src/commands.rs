//! Subcommand implementations.

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::process::ExitCode;

use takeoff_core::estimate::{EstimateTotals, build_estimate_cached};
use takeoff_core::storage::{
    find_template, load_project, load_templates, parse_columns, write_estimates_csv,
};
use takeoff_core::{BomCache, MarkupKind, TakeoffError, Template};
use takeoff_engine::engine::{
    BomResult, Context, NOT_AVAILABLE, Severity, Variable, evaluate_detailed, format_currency,
    format_quantity, format_result, lint_bom, normalize, parse_dimension, resolve_bom,
    to_base_quantity,
};

use crate::config::Config;
use crate::{EvalArgs, ExportArgs, LintArgs, PriceArgs};

fn library_path(arg: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    arg.or_else(|| config.templates.clone())
        .context("no template library given and none configured (set `templates` in config.toml)")
}

fn warn_unresolved(subject: &str, names: &[String]) {
    for name in names {
        eprintln!("warning: {}: [{}] is not defined and reads as 0", subject, name);
    }
}

pub fn eval(args: EvalArgs) -> Result<ExitCode> {
    let mut ctx = Context::new();
    if let Some(qty) = args.qty {
        ctx.set_qty(qty);
    }
    for (name, value) in &args.vars {
        ctx.insert(name.as_str(), *value);
    }

    match evaluate_detailed(&args.formula, &ctx) {
        Ok(evaluation) => {
            warn_unresolved("formula", &evaluation.unresolved);
            println!("{}", format_result(Some(evaluation.value)));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{}", NOT_AVAILABLE);
            eprintln!("error: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Set a template variable by raw or normalized name, adding it if missing.
fn override_variable(template: &mut Template, name: &str, value: f64) {
    let ident = normalize(name);
    let vars = &mut template.properties.variables;
    match vars
        .iter_mut()
        .find(|v| v.name == name || (!ident.is_empty() && normalize(&v.name) == ident))
    {
        Some(var) => var.value = value,
        None => vars.push(Variable::new(name, value)),
    }
}

fn print_bom(template: &Template, unit: &str, measured: f64, result: &BomResult) {
    let props = &template.properties;
    println!("{}", template.display_name());
    println!("  Measured   {}", format_quantity(measured, unit));
    println!(
        "  Quantity   {} @ {} = {}",
        format_quantity(result.display_quantity, unit),
        format_currency(props.unit_cost),
        format_currency(result.item_total)
    );
    warn_unresolved("formula", &result.unresolved);

    if !result.sub_items.is_empty() {
        println!("  Sub-items");
        for sub in &result.sub_items {
            let quantity = if sub.computed {
                format_quantity(sub.quantity, &sub.unit)
            } else {
                eprintln!("warning: {}: formula could not be evaluated", sub.name);
                NOT_AVAILABLE.to_string()
            };
            println!(
                "    {:<28} {:>14} @ {:>10} = {:>12}",
                sub.name,
                quantity,
                format_currency(sub.unit_price),
                format_currency(sub.total)
            );
            warn_unresolved(&sub.name, &sub.unresolved);
        }
        println!("  Sub-total  {}", format_currency(result.sub_items_total));
    }
    println!("  Total      {}", format_currency(result.grand_total));
}

pub fn price(args: PriceArgs, config: &Config) -> Result<ExitCode> {
    let path = library_path(args.library, config)?;
    let templates = load_templates(&path)
        .with_context(|| format!("failed to load templates from {}", path.display()))?;
    let mut template = find_template(&templates, &args.template)?.clone();

    if let Some(unit) = args.unit {
        template.properties.unit = unit;
    }
    for (name, value) in &args.vars {
        override_variable(&mut template, name, *value);
    }

    let kind = args
        .kind
        .or_else(|| template.tool_type.measure_kind())
        .ok_or_else(|| TakeoffError::NotMeasurable {
            name: template.display_name().to_string(),
            tool_type: template.tool_type.to_string(),
        })?;
    let ppf = args.scale.unwrap_or(config.pixels_per_foot);

    let measured = match (args.value, args.measured.as_deref()) {
        (Some(raw), _) => to_base_quantity(raw, &template.properties.unit, ppf, kind),
        (None, Some(text)) => parse_dimension(text)
            .with_context(|| format!("not a dimension: {:?}", text))?,
        (None, None) => anyhow::bail!("either --value or --measured is required"),
    };

    let result = resolve_bom(&template.to_bom_input(measured));
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let unit = if template.tool_type == MarkupKind::Count {
            "ea"
        } else {
            template.properties.unit.as_str()
        };
        print_bom(&template, unit, measured, &result);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn lint(args: LintArgs, config: &Config) -> Result<ExitCode> {
    let path = library_path(args.library, config)?;
    let templates = load_templates(&path)
        .with_context(|| format!("failed to load templates from {}", path.display()))?;
    let selected: Vec<&Template> = match args.template.as_deref() {
        Some(name) => vec![find_template(&templates, name)?],
        None => templates.iter().collect(),
    };

    let mut problems = 0usize;
    let mut errors = 0usize;
    for template in &selected {
        for diagnostic in lint_bom(&template.to_bom_input(1.0)) {
            problems += 1;
            if diagnostic.severity == Severity::Error {
                errors += 1;
            }
            println!("{}: {}", template.display_name(), diagnostic);
        }
    }
    println!("{} template(s) checked, {} problem(s)", selected.len(), problems);

    Ok(if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

pub fn export(args: ExportArgs, config: &Config) -> Result<ExitCode> {
    let project = load_project(&args.project)
        .with_context(|| format!("failed to load project from {}", args.project.display()))?;
    let columns = if args.columns.is_empty() {
        config.csv_columns.clone()
    } else {
        parse_columns(&args.columns)?
    };
    let ppf = args.scale.unwrap_or(config.pixels_per_foot);

    let cache = BomCache::new();
    let items = build_estimate_cached(&project, Some(ppf), &cache);
    tracing::debug!(hits = cache.hits(), misses = cache.misses(), "bom cache");

    write_estimates_csv(&args.output, &items, &columns)?;

    let totals = EstimateTotals::from_items(&items);
    println!(
        "Exported {} item(s) to {} ({})",
        totals.items,
        args.output.display(),
        format_currency(totals.grand_total)
    );
    for (group, total) in &totals.groups {
        println!("  {:<24} {:>4} {:>14}", group, total.items, format_currency(total.grand_total));
    }
    Ok(ExitCode::SUCCESS)
}
