use anyhow::{bail, Context};
use clap::Parser;
use rayon::prelude::*;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;
use uritmpl::cli::{CheckArgs, Cli, Command};
use uritmpl::discover::discover_suites;
use uritmpl::fixture::parse_file;
use uritmpl::output::Output;
use uritmpl::runner::{run_suite, ProgressEvent, SuiteResult};
use uritmpl::{Bindings, Template};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_color = !cli.no_color && atty::is(atty::Stream::Stdout);

    match cli.command {
        Command::Expand {
            template,
            vars,
            var,
            url,
        } => expand(&template, vars.as_deref(), &var, url),
        Command::Extract { template, url } => extract(&template, &url),
        Command::Check(args) => check(args, use_color),
    }
}

fn parse_bindings(vars: Option<&str>, var: &[String]) -> anyhow::Result<Bindings> {
    if let Some(json) = vars {
        let json: serde_json::Value = serde_json::from_str(json).context("--vars is not valid JSON")?;
        if !json.is_object() {
            bail!("--vars must be a JSON object");
        }
        return Ok(Bindings::from_json(&json)?);
    }

    let mut bindings = Bindings::new();
    for assignment in var {
        let Some((name, value)) = assignment.split_once('=') else {
            bail!("expected NAME=VALUE, got '{}'", assignment);
        };
        bindings.set(name, value)?;
    }
    Ok(bindings)
}

fn expand(template: &str, vars: Option<&str>, var: &[String], url: bool) -> anyhow::Result<()> {
    let template = Template::parse(template)?;
    let bindings = parse_bindings(vars, var)?;

    if url {
        println!("{}", template.expand_url(&bindings)?);
    } else {
        println!("{}", template.expand(&bindings));
    }
    Ok(())
}

fn extract(template: &str, url: &str) -> anyhow::Result<()> {
    let template = Template::parse(template)?;
    let bindings = template.extract(url)?;
    println!("{}", serde_json::to_string_pretty(&bindings.to_json())?);
    Ok(())
}

fn check(args: CheckArgs, use_color: bool) -> anyhow::Result<()> {
    let mut output = Output::new(use_color);

    let root = args.root.canonicalize().unwrap_or(args.root.clone());

    if args.list {
        list_cases(&root, args.pattern.as_deref(), &mut output)?;
        return Ok(());
    }

    let suites = discover_suites(&root)?;

    if suites.is_empty() {
        eprintln!("No fixture files found");
        std::process::exit(1);
    }

    let start_time = Instant::now();

    let (progress_tx, progress_rx) = mpsc::channel::<ProgressEvent>();
    let verbose = args.verbose;

    let progress_handle = thread::spawn(move || {
        let mut output = Output::new(use_color);
        for event in progress_rx {
            let _ = output.print_progress(&event, verbose);
        }
        let _ = output.finish_progress();
    });

    let pattern = args.pattern.as_deref();
    let results: Vec<SuiteResult> = if args.sequential || suites.len() == 1 {
        suites
            .iter()
            .map(|suite| run_suite(suite, pattern, Some(&progress_tx)))
            .collect()
    } else {
        suites
            .par_iter()
            .map(|suite| {
                let tx = progress_tx.clone();
                run_suite(suite, pattern, Some(&tx))
            })
            .collect()
    };

    drop(progress_tx);
    if progress_handle.join().is_err() {
        bail!("progress reporter panicked");
    }

    let elapsed = start_time.elapsed();
    output.print_results(&results, elapsed)?;

    let all_passed = results.iter().all(|r| r.passed());
    std::process::exit(if all_passed { 0 } else { 1 });
}

fn list_cases(root: &Path, pattern: Option<&str>, output: &mut Output) -> anyhow::Result<()> {
    let mut listed = Vec::new();
    for suite in discover_suites(root)? {
        let mut groups = parse_file(&suite.path)
            .with_context(|| format!("failed to read {}", suite.path.display()))?;

        if let Some(pat) = pattern {
            for group in &mut groups {
                if !group.name.contains(pat) {
                    group.cases.retain(|c| c.template.contains(pat));
                }
            }
            groups.retain(|g| !g.cases.is_empty());
        }

        if !groups.is_empty() || pattern.is_none() {
            listed.push((suite, groups));
        }
    }

    output.print_list(&listed)?;
    Ok(())
}
