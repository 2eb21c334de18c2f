use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use perfeval_kernel::scenario::run_demo_scenario;
use perfeval_kernel::state_machine::{FORWARD, REJECT};
use perfeval_kernel::test_harness::{run_simulator, SimulatorConfig, TestHarness};
use perfeval_kernel::EngineConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("perfeval")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Year-end performance evaluation approval workflow")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run the workflow simulator")
                .arg(
                    Arg::new("operations")
                        .long("ops")
                        .default_value("10000")
                        .value_parser(value_parser!(u64))
                        .help("Number of operations to simulate"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("departments")
                        .long("departments")
                        .default_value("8")
                        .value_parser(value_parser!(usize))
                        .help("Departments taking part"),
                )
                .arg(
                    Arg::new("stop-on-violation")
                        .long("stop-on-violation")
                        .action(ArgAction::SetTrue)
                        .help("Stop simulation on first violation"),
                ),
        )
        .subcommand(
            Command::new("stress")
                .about("Run a stress test over many departments")
                .arg(
                    Arg::new("departments")
                        .long("departments")
                        .default_value("200")
                        .value_parser(value_parser!(usize))
                        .help("Number of departments"),
                )
                .arg(
                    Arg::new("iterations")
                        .long("iterations")
                        .default_value("50000")
                        .value_parser(value_parser!(usize))
                        .help("Number of operations"),
                ),
        )
        .subcommand(
            Command::new("scenario")
                .about("Run the scripted demo round and print its progress report")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Engine configuration (TOML)"),
                ),
        )
        .subcommand(Command::new("transitions").about("Print the approval state machine"))
        .subcommand(
            Command::new("validate-config")
                .about("Load and validate an engine configuration file")
                .arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the TOML file"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json"));

    match matches.subcommand() {
        Some(("simulate", args)) => simulate(args),
        Some(("stress", args)) => stress(args),
        Some(("scenario", args)) => scenario(args),
        Some(("transitions", _)) => {
            transitions();
            Ok(())
        }
        Some(("validate-config", args)) => validate_config(args),
        _ => Ok(()),
    }
}

fn simulate(args: &ArgMatches) -> Result<()> {
    let config = SimulatorConfig {
        seed: *args.get_one::<u64>("seed").context("seed")?,
        total_operations: *args.get_one::<u64>("operations").context("ops")?,
        departments: *args.get_one::<usize>("departments").context("departments")?,
        stop_on_first_violation: args.get_flag("stop-on-violation"),
        ..Default::default()
    };

    let report = run_simulator(config);
    println!("{}", report.generate_text());

    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn stress(args: &ArgMatches) -> Result<()> {
    let departments = *args.get_one::<usize>("departments").context("departments")?;
    let iterations = *args.get_one::<usize>("iterations").context("iterations")?;

    let report = TestHarness::run_stress_test(departments, iterations);

    println!("Stress Test Report:");
    println!("  Departments: {}", report.departments);
    println!("  Iterations: {}", report.iterations);
    println!("  Violations: {}", report.violations);
    println!("  Rejections: {}", report.rejections);
    println!(
        "  Completed: {} ({}%)",
        report.completed_departments, report.completion_percentage
    );
    println!("  Success: {}", report.success);

    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}

fn scenario(args: &ArgMatches) -> Result<()> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let outcome = run_demo_scenario(config).context("demo scenario failed")?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn transitions() {
    println!("Approvals:");
    for rule in FORWARD {
        println!("  {:<18} --{:<15}--> {}", rule.from, rule.role, rule.to);
    }
    println!("Rejections:");
    for rule in REJECT {
        println!("  {:<18} --{:<15}--> {}", rule.from, rule.role, rule.to);
    }
    println!("Submission:");
    println!("  draft              --department member--> submitted");
}

fn validate_config(args: &ArgMatches) -> Result<()> {
    let path = args.get_one::<PathBuf>("path").context("path")?;
    let config = EngineConfig::load(path).with_context(|| format!("invalid config {}", path.display()))?;
    println!("{} is valid", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
