//! feasibility-runner: headless capacity feasibility runner.
//!
//! Usage:
//!   feasibility-runner --db planner.db --seed-demo 42
//!   feasibility-runner --db planner.db --tenant <id> --proposal <id> --compare
//!   feasibility-runner --snapshot snapshot.json --mode min_overallocation --json
//!   feasibility-runner --db planner.db --tenant <id> --ipc-mode

use anyhow::{anyhow, Result};
use capacity_core::{
    config::PlannerConfig,
    demo,
    engine::{FeasibilityRequest, PlannerEngine},
    mode::OptimizationMode,
    reporter::{FeasibilityReporter, FeasibilityResult},
    snapshot::CapacitySnapshot,
    store::PlannerStore,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Analyse(FeasibilityRequest),
    ListProposals {
        #[serde(default)]
        tenant_id: Option<String>,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct ProposalLine {
    proposal_id: String,
    name: String,
    status: &'static str,
    optimization_mode: OptimizationMode,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let json = has_flag(&args, "--json");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    let config = match PlannerConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; using built-in defaults");
            PlannerConfig::default_test()
        }
    };

    if let Some(path) = flag_value(&args, "--snapshot") {
        return run_snapshot_file(&args, path, &config, json);
    }

    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let store = PlannerStore::open(db)?;
    store.migrate()?;

    let mut tenant = flag_value(&args, "--tenant").map(str::to_string);
    if let Some(seed) = flag_value(&args, "--seed-demo") {
        let seed: u64 = seed
            .parse()
            .map_err(|e| anyhow!("--seed-demo expects an integer seed: {e}"))?;
        let seeded = demo::seed_demo_tenant(&store, seed)?;
        if !ipc_mode && !json {
            println!("Seeded demo tenant {}", seeded.tenant_id);
        }
        if tenant.is_none() {
            tenant = Some(seeded.tenant_id);
        }
    }

    let engine = PlannerEngine::new(store, config);

    if ipc_mode {
        return run_ipc_loop(&engine, tenant.as_deref());
    }

    let tenant = tenant.ok_or_else(|| anyhow!("--tenant is required (or use --seed-demo)"))?;
    let Some(proposal) = flag_value(&args, "--proposal") else {
        print_proposals(&engine, &tenant, json)?;
        return Ok(());
    };

    let request = FeasibilityRequest {
        tenant_id: tenant,
        proposal_id: proposal.to_string(),
        office_ids: flag_value(&args, "--offices").map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        }),
        mode: parse_mode(&args)?,
        allow_overallocation: has_flag(&args, "--allow-overallocation").then_some(true),
        overallocation_cap_percent: parse_cap(&args)?,
        include_comparisons: has_flag(&args, "--compare"),
    };
    let result = engine.analyse(&request)?;
    emit(&result, json)
}

fn run_snapshot_file(args: &[String], path: &str, config: &PlannerConfig, json: bool) -> Result<()> {
    let content =
        std::fs::read_to_string(path).map_err(|e| anyhow!("Cannot read {path}: {e}"))?;
    let snapshot: CapacitySnapshot =
        serde_json::from_str(&content).map_err(|e| anyhow!("Cannot parse {path}: {e}"))?;

    let mut params = config.default_params();
    if let Some(mode) = parse_mode(args)? {
        params = params.with_mode(mode);
    }
    if has_flag(args, "--allow-overallocation") {
        params.allow_overallocation = true;
    }
    if let Some(cap) = parse_cap(args)? {
        params.overallocation_cap_percent = cap;
    }

    let result = FeasibilityReporter::new(config).report(&snapshot, params, has_flag(args, "--compare"))?;
    emit(&result, json)
}

fn run_ipc_loop(engine: &PlannerEngine, default_tenant: Option<&str>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, e)?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Analyse(request) => match engine.analyse(&request) {
                Ok(result) => writeln!(stdout, "{}", serde_json::to_string(&result)?)?,
                Err(e) => write_error(&mut stdout, e)?,
            },
            IpcCommand::ListProposals { tenant_id } => {
                let Some(tenant) = tenant_id.as_deref().or(default_tenant) else {
                    write_error(&mut stdout, "list_proposals needs a tenant_id")?;
                    continue;
                };
                match proposal_lines(engine, tenant) {
                    Ok(lines) => writeln!(stdout, "{}", serde_json::to_string(&lines)?)?,
                    Err(e) => write_error(&mut stdout, e)?,
                }
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, e: impl std::fmt::Display) -> Result<()> {
    let err_json = serde_json::json!({ "error": e.to_string() });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn proposal_lines(engine: &PlannerEngine, tenant: &str) -> Result<Vec<ProposalLine>> {
    Ok(engine
        .proposals(tenant)?
        .into_iter()
        .map(|p| ProposalLine {
            proposal_id: p.id,
            name: p.name,
            status: p.status.as_str(),
            optimization_mode: p.optimization_mode,
        })
        .collect())
}

fn print_proposals(engine: &PlannerEngine, tenant: &str, json: bool) -> Result<()> {
    let lines = proposal_lines(engine, tenant)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }
    println!("=== PROPOSALS ({tenant}) ===");
    if lines.is_empty() {
        println!("  (none)");
    }
    for p in &lines {
        println!(
            "  {} | {:<24} | {:<9} | {}",
            p.proposal_id, p.name, p.status, p.optimization_mode
        );
    }
    Ok(())
}

fn emit(result: &FeasibilityResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_summary(result);
    }
    Ok(())
}

fn print_summary(result: &FeasibilityResult) {
    println!("=== FEASIBILITY SUMMARY ===");
    println!("  proposal:       {}", result.proposal_id);
    println!("  mode:           {} ({})", result.mode.label(), result.mode);
    println!(
        "  overallocation: {}",
        if result.allow_overallocation {
            format!("allowed up to {}%", result.overallocation_cap_percent)
        } else {
            "not allowed".to_string()
        }
    );
    println!("  offices:        {}", result.office_names.join(", "));
    println!("  staff in scope: {}", result.staff_in_scope);
    println!("  required:       {}h", result.total_required);
    println!("  achievable:     {}h", result.total_achievable);
    println!("  feasibility:    {:.1}% ({})", result.feasibility_percent, result.verdict.label());
    println!("  staff used:     {}", result.staff_used_count);
    println!("  overallocated:  {}h", result.total_overallocated_hours);

    println!();
    println!("=== WEEKS ===");
    for w in &result.weeks {
        println!(
            "  {} | days {} | req {:>6.1}h | ach {:>6.1}h | free {:>6.1}h | staff {:>2} | over {:>5.1}h",
            w.week_start,
            w.working_days,
            w.required_hours,
            w.achievable_hours,
            w.total_free_capacity,
            w.staff_used_count,
            w.overallocated_hours
        );
    }

    if !result.recommended_staff.is_empty() {
        println!();
        println!("=== RECOMMENDED STAFF ===");
        for s in &result.recommended_staff {
            println!(
                "  {:<22} | {:<18} | {:<16} | {:>6.1}h over {} weeks",
                s.label,
                s.job_title.as_deref().unwrap_or("-"),
                s.office_name.as_deref().unwrap_or("-"),
                s.total_hours,
                s.weeks_used
            );
        }
    }

    if let Some(rows) = &result.comparisons {
        println!();
        println!("=== MODE COMPARISON ===");
        for c in rows {
            println!(
                "  {:<24} | {:>5.1}% | {:>7.1}h | staff {:>2} | over {:>5.1}h",
                c.label, c.feasibility_percent, c.total_achievable, c.staff_used_count, c.total_overallocated_hours
            );
        }
    }

    println!();
    println!("{}", result.insight);
}

fn parse_mode(args: &[String]) -> Result<Option<OptimizationMode>> {
    flag_value(args, "--mode")
        .map(|m| m.parse::<OptimizationMode>().map_err(Into::into))
        .transpose()
}

fn parse_cap(args: &[String]) -> Result<Option<u32>> {
    flag_value(args, "--cap")
        .map(|c| c.parse::<u32>().map_err(|e| anyhow!("--cap expects a percentage: {e}")))
        .transpose()
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
