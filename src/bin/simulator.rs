use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::error;

use fieldsim::console;
use fieldsim::context::SimContext;
use fieldsim::gateway::CommandGateway;
use fieldsim::rng::SimRng;
use fieldsim::runner::{spawn_periodic, Shutdown};
use fieldsim::server;
use fieldsim::simulators::{BreakerSimulator, MotorSimulator};

/// Industrial field-device simulator: 5 motors (units 1-5) and 5 circuit
/// breakers (unit 16) served as Modbus TCP holding registers.
#[derive(Debug, Parser)]
#[command(name = "fieldsim", version, about)]
struct Args {
    /// Bind address for the register server
    #[arg(long, default_value = server::DEFAULT_BIND)]
    bind: String,

    /// Simulator tick interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// RNG seed for reproducible runs (defaults to clock entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the interactive operator console
    #[arg(long)]
    no_console: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let context = Arc::new(SimContext::new());
    let gateway = CommandGateway::new(Arc::clone(&context));
    let shutdown = Shutdown::new();
    let period = Duration::from_millis(args.interval_ms);

    let seed = args.seed.unwrap_or_else(SimRng::entropy_seed);
    let motor_task = spawn_periodic(
        MotorSimulator::new(Arc::clone(&context), SimRng::new(seed)),
        period,
        shutdown.subscribe(),
    );
    // Decorrelate the two simulator streams
    let breaker_seed = seed.rotate_left(17) ^ 0x9E37_79B9_7F4A_7C15;
    let breaker_task = spawn_periodic(
        BreakerSimulator::new(Arc::clone(&context), SimRng::new(breaker_seed)),
        period,
        shutdown.subscribe(),
    );

    // Server failure (bad bind, port in use) kills this task only; the
    // simulators keep updating the banks regardless.
    let server_context = Arc::clone(&context);
    let server_shutdown = shutdown.subscribe();
    let server_bind = args.bind.clone();
    let server_task = tokio::spawn(async move {
        if let Err(e) = server::serve(server_context, &server_bind, server_shutdown).await {
            error!(error = %e, "register server failed");
        }
    });

    println!("⚡ fieldsim — 5 motors (units 1-5), 5 breakers (unit 16)");
    println!("   register server on {}", args.bind);

    if args.no_console {
        tokio::signal::ctrl_c().await?;
    } else {
        tokio::select! {
            result = console::run(Arc::clone(&context), gateway) => result?,
            result = tokio::signal::ctrl_c() => result?,
        }
    }
    shutdown.trigger();

    let _ = tokio::join!(motor_task, breaker_task, server_task);
    println!("fieldsim stopped");
    Ok(())
}
