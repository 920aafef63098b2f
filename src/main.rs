use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use drone_pid_sim::config::{parse_param, SimConfig};
use drone_pid_sim::io::{self, ResponseSummary};
use drone_pid_sim::sim::{self, Pacing, SimEvent, Simulator, StepParams};

/// Cargo drone vertical-axis PID simulator
#[derive(Parser, Debug)]
#[command(name = "drone-pid-sim")]
#[command(about = "Discrete-time PID control of a drag-damped vertical drone plant", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the closed loop and report the response
    Run(RunArgs),
    /// Print the default configuration as TOML
    Defaults,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of steps to simulate
    #[arg(short = 'n', long)]
    steps: Option<usize>,

    #[arg(long)]
    dt: Option<String>,
    #[arg(long)]
    setpoint: Option<String>,
    #[arg(long)]
    kp: Option<String>,
    #[arg(long)]
    ki: Option<String>,
    #[arg(long)]
    kd: Option<String>,
    #[arg(long)]
    mass: Option<String>,
    #[arg(long)]
    drag: Option<String>,
    #[arg(long)]
    output_limit: Option<String>,
    /// Anti-windup clamp on the integral term
    #[arg(long)]
    integral_limit: Option<String>,

    /// Pace steps to wall-clock dt
    #[arg(long)]
    realtime: bool,

    /// Export recorded samples as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the response summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl RunArgs {
    /// Start from the config file (or defaults) and apply flag overrides.
    fn resolve(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => SimConfig::default(),
        };

        let overrides: [(&'static str, &Option<String>, &mut f64); 8] = [
            ("dt", &self.dt, &mut config.dt),
            ("setpoint", &self.setpoint, &mut config.setpoint),
            ("kp", &self.kp, &mut config.kp),
            ("ki", &self.ki, &mut config.ki),
            ("kd", &self.kd, &mut config.kd),
            ("mass", &self.mass, &mut config.mass),
            ("drag", &self.drag, &mut config.drag),
            ("output_limit", &self.output_limit, &mut config.output_limit),
        ];
        for (name, text, slot) in overrides {
            if let Some(text) = text {
                *slot = parse_param(name, text)?;
            }
        }
        if let Some(text) = &self.integral_limit {
            config.integral_limit = Some(parse_param("integral_limit", text)?);
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("drone_pid_sim=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Defaults => {
            print!("{}", SimConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = args.resolve()?;
    let params = config.step_params();

    let mut simulator = Simulator::new(config.dt)?;
    simulator.set_integral_limit(config.integral_limit);

    let pacing = if args.realtime { Pacing::RealTime } else { Pacing::AsFastAsPossible };
    let mut detectors = sim::default_detectors();
    let events = sim::run(&mut simulator, &params, config.steps, pacing, &mut detectors)?;

    print_report(&config, &params, &simulator, &events);

    if let Some(path) = &args.csv {
        io::write_history_file(path, simulator.history())
            .with_context(|| format!("writing CSV to {}", path.display()))?;
        println!("  Simulation exported to: {}", path.display());
    }
    if let Some(path) = &args.summary {
        if let Some(summary) = ResponseSummary::from_history(simulator.history(), &params) {
            io::write_summary_file(path, config.dt, &params, &summary)
                .with_context(|| format!("writing summary to {}", path.display()))?;
            println!("  Summary written to: {}", path.display());
        }
    }
    println!();
    Ok(())
}

fn print_report(config: &SimConfig, params: &StepParams, simulator: &Simulator, events: &[SimEvent]) {
    let history = simulator.history();

    println!();
    println!("====================================================================");
    println!("  CARGO DRONE PID SIMULATION");
    println!("====================================================================");
    println!();
    println!("  Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Kp: {:>8.3}   Ki: {:>8.3}   Kd: {:>8.3}   Setpoint: {:>8.2} m",
        config.kp, config.ki, config.kd, config.setpoint
    );
    println!(
        "  Mass: {:>6.2} kg   Drag: {:>6.3}   Thrust limit: {:>6.1} N   dt: {} s",
        config.mass, config.drag, config.output_limit, config.dt
    );
    match simulator.integral_limit() {
        Some(limit) => println!("  Anti-windup: integral clamped to ±{limit}"),
        None => println!("  Anti-windup: off"),
    }
    println!();

    if !events.is_empty() {
        println!("  Events");
        println!("  ──────────────────────────────────────────────────────────────────");
        for e in events.iter().take(20) {
            println!("  t={:>8.2}s   y={:>9.3}m   {:?}", e.time, e.sample.position, e.kind);
        }
        if events.len() > 20 {
            println!("  ... {} more", events.len() - 20);
        }
        println!();
    }

    println!("  Response");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>8}  {:>10}  {:>10}  {:>9}  {:>10}",
        "t (s)", "y (m)", "v (m/s)", "u (N)", "error (m)"
    );
    println!("  {}", "─".repeat(55));
    let sample_interval = (history.len() / 30).max(1);
    for (i, s) in history.iter().enumerate() {
        if i % sample_interval != 0 && i != history.len() - 1 {
            continue;
        }
        println!(
            "  {:>8.2}  {:>10.3}  {:>10.3}  {:>9.3}  {:>10.4}",
            s.time, s.position, s.velocity, s.output, s.error
        );
    }
    println!();

    if let Some(summary) = ResponseSummary::from_history(history, params) {
        let fmt = |v: Option<f64>, unit: &str| v.map_or("n/a".to_string(), |x| format!("{x:.2} {unit}"));
        println!("  Summary");
        println!("  ──────────────────────────────────────────────────────────────────");
        println!(
            "  Peak:          {:>10.3} m at t={:.2} s",
            summary.peak_position, summary.peak_time
        );
        println!("  Overshoot:     {:>10}", fmt(summary.overshoot_pct, "%"));
        println!("  Rise time:     {:>10}", fmt(summary.rise_time, "s"));
        println!("  Settling time: {:>10}", fmt(summary.settling_time, "s"));
        println!("  Final error:   {:>10.4} m", summary.final_error);
        println!(
            "  Saturated:     {:>10} of {} steps",
            summary.saturated_samples, summary.samples
        );
    }
    println!();
    println!("  Simulation: {} steps, dt={} s", simulator.steps(), simulator.dt());
    println!("====================================================================");
}
