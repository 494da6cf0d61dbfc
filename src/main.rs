//! Liveguard CLI
//!
//! Usage:
//!   liveguard                                   # Interactive operator console
//!   liveguard --events '[{"type":"start"}, ...]' # Scripted run
//!   liveguard --serve                           # HTTP API server
//!   liveguard --events '...' --json             # JSON output

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use liveguard::core::{parse_command, run_server, Command, SessionConfig, SimulatedCapture, VerificationSession};
use liveguard::types::{MediaError, SessionOutput, VerificationEvent, VerificationStep};
use liveguard::{BEHAVIORAL_DEBOUNCE_MS, GESTURE_MAX_MS, GESTURE_MIN_MS, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "liveguard",
    version = VERSION,
    about = "Liveguard - Caller liveness checks and trust score",
    long_about = "Liveguard walks an operator through five liveness checks for a\n\
                  phone or video caller and aggregates them into a trust score.\n\n\
                  Steps:\n  \
                  GESTURE     - Caller mimics a prompted gesture (30)\n  \
                  LATENCY     - Sound spike matches the gesture timing (20)\n  \
                  AUDIO_FFT   - Voice classified human or synthetic (30)\n  \
                  BEHAVIORAL  - Red flags deduct up to 10\n  \
                  KNOWLEDGE   - Personal question (10)\n\n\
                  Verdicts:\n  \
                  TRUSTED     - score >= 80%\n  \
                  UNCLEAR     - score >= 50%\n  \
                  HIGH_RISK   - below 50%"
)]
struct Args {
    /// JSON array of events to run (scripted mode)
    #[arg(short, long)]
    events: Option<String>,

    /// Interactive operator console (default)
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show step and outcome breakdown
    #[arg(long)]
    verbose: bool,

    /// Quiet period after the last behavioral flag edit (ms)
    #[arg(long, default_value_t = BEHAVIORAL_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// Fastest accepted gesture response (ms)
    #[arg(long, default_value_t = GESTURE_MIN_MS)]
    gesture_min_ms: u64,

    /// Slowest accepted gesture response (ms)
    #[arg(long, default_value_t = GESTURE_MAX_MS)]
    gesture_max_ms: u64,

    /// Simulate a camera/microphone denial
    #[arg(long)]
    deny_media: bool,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            gesture_min_ms: self.gesture_min_ms,
            gesture_max_ms: self.gesture_max_ms,
        }
    }

    fn new_session(&self) -> VerificationSession {
        let capture = if self.deny_media {
            SimulatedCapture::denied(MediaError::Denied("NotAllowedError".to_string()))
        } else {
            SimulatedCapture::granted()
        };
        VerificationSession::with_capture(self.session_config(), Box::new(capture))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.serve {
        run_serve(&args).await;
    } else if let Some(ref events) = args.events {
        run_script(events, &args);
    } else if args.interactive {
        run_interactive(&args);
    } else {
        // Default to the operator console if no mode is given
        run_interactive(&args);
    }
}

/// Run a scripted event sequence and print the final output
fn run_script(events: &str, args: &Args) {
    let events: Vec<VerificationEvent> = match serde_json::from_str(events) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Invalid events JSON: {}", e);
            std::process::exit(2);
        }
    };

    let mut session = args.new_session();
    // Scripted runs use a virtual clock so debounced advances are deterministic
    let mut now = Instant::now();
    let mut rejected = 0;

    for event in events {
        if !matches!(event, VerificationEvent::BehavioralFlagChanged { .. }) {
            flush_pending_advance(&mut session, &mut now);
        }
        match session.apply_at(event, now) {
            Ok(output) if args.verbose => print_output(&output, args),
            Ok(_) => {}
            Err(e) => {
                rejected += 1;
                eprintln!("{}: {}", event.name(), e);
            }
        }
    }
    flush_pending_advance(&mut session, &mut now);

    let output = session.output();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        print_output(&output, args);
        print_verdict(&output, args.no_color);
    }

    if rejected > 0 {
        std::process::exit(1);
    }
}

/// Advance the virtual clock past a pending behavioral deadline
fn flush_pending_advance(session: &mut VerificationSession, now: &mut Instant) {
    if let Some(deadline) = session.advance_deadline() {
        *now = (*now).max(deadline);
        session.tick_at(*now);
    }
}

/// Run interactive operator console
fn run_interactive(args: &Args) {
    let mut session = args.new_session();

    print_header(args.no_color);
    println!("Type 'help' for commands, 'start' to begin. Type 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if let Some(output) = session.tick() {
            print_output(&output, args);
        }

        print!("{}", format_prompt(&session, args.no_color));
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Edits made while the prompt was open may have let the quiet period pass
        if let Some(output) = session.tick() {
            print_output(&output, args);
        }

        let result = match parse_command(line) {
            Ok(Command::Quit) => {
                println!("\nSession ended. Events: {}", session.event_count());
                break;
            }
            Ok(Command::Help) => {
                print_help();
                continue;
            }
            Ok(Command::Status) => Ok(session.output()),
            Ok(Command::CompleteGesture) => session.complete_gesture(),
            Ok(Command::Event(event)) => session.apply(event),
            Err(e) => {
                println!("{}", paint(&format!("⚠ {}", e), "\x1b[33m", args.no_color));
                continue;
            }
        };

        match result {
            Ok(output) => {
                print_output(&output, args);
                if output.step == VerificationStep::Complete {
                    print_verdict(&output, args.no_color);
                }
            }
            Err(e) => println!("{}", paint(&format!("⚠ {}", e), "\x1b[31m", args.no_color)),
        }
    }
}

/// Print one output in the selected format
fn print_output(output: &SessionOutput, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(output).unwrap_or_default());
    } else if args.verbose {
        print_verbose(output, args.no_color);
    } else if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
        println!(
            "{}  └─ {}{}",
            output.status.severity.color_code(),
            output.status.text,
            VerificationStep::color_reset()
        );
        if let Some(ref prompt) = output.gesture_prompt {
            println!("  Gesture: {}", prompt);
        }
    }
}

/// Print the verdict box
fn print_verdict(output: &SessionOutput, no_color: bool) {
    let color = output.verdict_severity.color_code();
    let emoji = if no_color { "" } else { output.verdict.emoji() };
    println!();
    println!(
        "{}",
        paint(
            &format!("{} Trust Score {}% - {}", emoji, output.percentage, output.verdict_message),
            color,
            no_color
        )
    );
}

fn paint(text: &str, color: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("{}{}{}", color, text, VerificationStep::color_reset())
    }
}

/// Print header
fn print_header(no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Liveguard v{} - Operator Console", VERSION);
        println!("========================================");
    } else {
        println!("\x1b[1m╔══════════════════════════════════════════╗\x1b[0m");
        println!("\x1b[1m║   Liveguard v{} - Operator Console     ║\x1b[0m", VERSION);
        println!("\x1b[1m╚══════════════════════════════════════════╝\x1b[0m");
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  start                                   acquire camera/mic, begin");
    println!("  gesture <ms> | gesture done             record gesture response time");
    println!("  gesture-fail                            mark gesture failed");
    println!("  latency match|mismatch                  record sound timing");
    println!("  audio human|synthetic                   record voice classification");
    println!("  flag urgency|avoiding|money-otp on|off  mark behavioral flag");
    println!("  knowledge correct|wrong|avoided         record knowledge answer");
    println!("  status | reset | quit");
}

/// Format prompt
fn format_prompt(session: &VerificationSession, no_color: bool) -> String {
    let step = session.step();
    let pending = if session.advance_pending() { " …" } else { "" };
    let score = session.trust().percentage;

    if no_color {
        format!("[{} | {}%{}] > ", step, score, pending)
    } else {
        format!(
            "{}{} [{} | {}%{}]{} > ",
            step.color_code(),
            step.emoji(),
            step,
            score,
            pending,
            VerificationStep::color_reset()
        )
    }
}

/// Print verbose output
fn print_verbose(output: &SessionOutput, no_color: bool) {
    let color = if no_color { "" } else { output.step.color_code() };
    let reset = if no_color { "" } else { VerificationStep::color_reset() };
    let o = &output.outcomes;

    println!("{}┌──────────────────────────────────────┐{}", color, reset);
    println!("{}│ Step: {} | Score: {}% ({}){}", color, output.step, output.percentage, output.verdict, reset);
    println!("{}├──────────────────────────────────────┤{}", color, reset);
    println!("{}│   gesture:     {:<12} {:?}{}", color, output.statuses.gesture, o.gesture_passed, reset);
    println!("{}│   latency:     {:<12} {:?}{}", color, output.statuses.latency, o.latency_matched, reset);
    println!("{}│   audio_fft:   {:<12} {:?}{}", color, output.statuses.audio_fft, o.audio_human, reset);
    println!(
        "{}│   behavioral:  {:<12} u={} a={} m={}{}",
        color,
        output.statuses.behavioral,
        o.behavioral_flags.urgency,
        o.behavioral_flags.avoiding,
        o.behavioral_flags.money_otp,
        reset
    );
    println!("{}│   knowledge:   {:<12} {:?}{}", color, output.statuses.knowledge, o.knowledge_result, reset);
    println!("{}├──────────────────────────────────────┤{}", color, reset);
    println!("{}│ Status: {} ({}){}", color, output.status.text, output.status.severity, reset);
    if let Some(ref instruction) = output.instruction {
        println!("{}│ Next: {}{}", color, instruction, reset);
    }
    println!("{}│ Reason: {}{}", color, output.reason.code(), reset);
    println!("{}└──────────────────────────────────────┘{}", color, reset);
}

/// Run HTTP API server
async fn run_serve(args: &Args) {
    println!();
    println!("╔══════════════════════════════════════════╗");
    println!("║  Liveguard API Server                    ║");
    println!("║  Version: {}                          ║", VERSION);
    println!("╚══════════════════════════════════════════╝");
    println!();

    if let Err(e) = run_server(&args.addr, args.session_config()).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
