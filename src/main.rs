use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;
use tracing::{info, warn};

use watermaze_rust::simulation::config::{
    HeuristicConfig, PolicyConfig, QLearningConfig, SimulationConfig,
};
use watermaze_rust::simulation::{
    run_batch, run_relocation_experiment, run_removal_probe, Session,
};
use watermaze_rust::ui::{board::board_lines, render::draw_ui, Command as ShellCommand, ShellState};

#[derive(Parser, Debug)]
#[command(
    name = "watermaze",
    version,
    about = "Morris water-maze simulation with heuristic and Q-learning mice"
)]
struct Cli {
    /// JSON configuration file; flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Learning model driving the mouse.
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyKind>,

    /// Heuristic memory quality, percent in [0, 100].
    #[arg(long, global = true)]
    memory_quality: Option<f64>,

    /// Q-learning initial temperature in [50, 100].
    #[arg(long, global = true)]
    initial_temperature: Option<f64>,

    /// Q-learning temperature decay per trial in [0, 1].
    #[arg(long, global = true)]
    temperature_decay: Option<f64>,

    /// Q-learning discount factor in [0, 1].
    #[arg(long, global = true)]
    discount_factor: Option<f64>,

    /// Q-learning learning rate in [0, 1].
    #[arg(long, global = true)]
    learning_rate: Option<f64>,

    #[arg(long, global = true)]
    rows: Option<usize>,

    #[arg(long, global = true)]
    cols: Option<usize>,

    /// Start each trial in a random corner instead of rotating.
    #[arg(long, global = true)]
    random_start: bool,

    /// Hide the platform in a random corner instead of the centre.
    #[arg(long, global = true)]
    corner_platform: bool,

    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print reports as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    Heuristic,
    QLearning,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Average moves per trial over independent iterations.
    Batch {
        #[arg(long, default_value_t = 30)]
        trials: usize,
        #[arg(long, default_value_t = 100)]
        iterations: usize,
    },
    /// Train, move the platform to another corner, train again.
    Relocate {
        /// Trials before and after the move.
        #[arg(long, default_value_t = 15)]
        trials: usize,
        #[arg(long, default_value_t = 100)]
        iterations: usize,
    },
    /// Train, remove the platform and count quadrant visits.
    Probe {
        #[arg(long, default_value_t = 15)]
        trials: usize,
        #[arg(long, default_value_t = 100)]
        iterations: usize,
        /// Moves the mouse swims in the probe trial.
        #[arg(long, default_value_t = 30)]
        moves: usize,
    },
    /// Train quietly, then print every board of one more trial.
    Show {
        #[arg(long, default_value_t = 0)]
        train: usize,
        /// Pause between boards in milliseconds.
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },
    /// Interactive step-through dashboard.
    Watch,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    info!(policy = config.policy.name(), seed = config.seed_or_default(), "configuration ready");

    match cli.command {
        Command::Batch { trials, iterations } => {
            let report = run_batch(&config, trials, iterations)?;
            emit(&report, cli.json)?;
        }
        Command::Relocate { trials, iterations } => {
            let report = run_relocation_experiment(&config, trials, iterations)?;
            emit(&report, cli.json)?;
        }
        Command::Probe {
            trials,
            iterations,
            moves,
        } => {
            let report = run_removal_probe(&config, trials, iterations, moves)?;
            emit(&report, cli.json)?;
        }
        Command::Show { train, delay_ms } => show_trial(&config, train, delay_ms)?,
        Command::Watch => watch(Session::new(&config)?)?,
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn build_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    match (cli.policy, config.policy) {
        (Some(PolicyKind::Heuristic), PolicyConfig::QLearning(_)) => {
            config.policy = PolicyConfig::Heuristic(HeuristicConfig::default());
        }
        (Some(PolicyKind::QLearning), PolicyConfig::Heuristic(_)) => {
            config.policy = PolicyConfig::QLearning(QLearningConfig::default());
        }
        _ => {}
    }

    match &mut config.policy {
        PolicyConfig::Heuristic(h) => {
            if let Some(memory) = cli.memory_quality {
                h.memory_quality = memory;
            }
            if cli.initial_temperature.is_some()
                || cli.temperature_decay.is_some()
                || cli.discount_factor.is_some()
                || cli.learning_rate.is_some()
            {
                warn!("Q-learning parameters are ignored by the heuristic mouse");
            }
        }
        PolicyConfig::QLearning(q) => {
            if let Some(t) = cli.initial_temperature {
                q.initial_temperature = t;
            }
            if let Some(d) = cli.temperature_decay {
                q.temperature_decay = d;
            }
            if let Some(g) = cli.discount_factor {
                q.discount_factor = g;
            }
            if let Some(a) = cli.learning_rate {
                q.learning_rate = a;
            }
            if cli.memory_quality.is_some() {
                warn!("memory quality is ignored by the Q-learning mouse");
            }
        }
    }

    if let Some(rows) = cli.rows {
        config.arena.rows = rows;
    }
    if let Some(cols) = cli.cols {
        config.arena.cols = cols;
    }
    config.arena.random_start |= cli.random_start;
    if cli.corner_platform {
        config.arena.platform_centered = false;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn emit<T: Serialize + std::fmt::Display>(report: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn show_trial(config: &SimulationConfig, train: usize, delay_ms: u64) -> Result<()> {
    let mut session = Session::new(config)?;
    for _ in 0..train {
        session.run_trial()?;
    }
    if !session.start_trial() {
        anyhow::bail!("could not start a trial");
    }
    print!("{}", session.snapshot());
    let delay = Duration::from_millis(delay_ms);
    for frame in session.run_full_trial() {
        println!();
        print!("{}", frame?);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    println!(
        "found the platform in {} moves ({})",
        session.arena().moves_in_trial(),
        session.policy().describe()
    );
    Ok(())
}

fn watch(session: Session) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, ShellState::new(session));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut shell: ShellState,
) -> Result<()> {
    let idle_poll = Duration::from_millis(50);
    let mut last_tick = Instant::now();
    loop {
        if shell.is_simulating() && last_tick.elapsed() >= shell.frame_delay() {
            shell.tick()?;
            last_tick = Instant::now();
        }

        terminal.draw(|f| {
            let board = board_lines(&shell.session().snapshot());
            draw_ui(f, board, &shell.hud(), shell.status());
        })?;

        let timeout = if shell.is_simulating() {
            shell
                .frame_delay()
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO)
        } else {
            idle_poll
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let KeyCode::Char(c) = key.code else { continue };
                if let Some(command) = ShellCommand::from_key(c) {
                    if !shell.apply(command)? {
                        return Ok(());
                    }
                    last_tick = Instant::now();
                }
            }
        }
    }
}
