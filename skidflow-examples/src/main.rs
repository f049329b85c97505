use std::error::Error;
use std::path::Path;

use skidflow::Package;
use skidflow_std::*;
use tracing::info;

const SOAK_TICKS: u64 = 10_000;

/// Drives `config` with random traffic and checks every transfer.
fn soak(config: SkidConfig, seed: u64) -> Result<(), Box<dyn Error>> {
    let mut buffer = config.build()?;
    let mut traffic = Traffic::random(config.width, seed, 75, 60);
    let mut scoreboard = Scoreboard::new(config.low_power);
    let mut checker = ProtocolChecker::new();
    let mut stalls = 0u64;

    for _ in 0..SOAK_TICKS {
        let input = traffic.next_input();
        let output = buffer.step(&input);

        checker.observe(input.reset, &output.downstream, &input.downstream)?;
        scoreboard.observe(&input, &output)?;
        traffic.observe(&input, &output);

        if input.upstream.valid && !output.upstream.ready {
            stalls += 1;
        }
    }

    info!(
        low_power = config.low_power,
        registered_output = config.registered_output,
        accepted = scoreboard.accepted(),
        delivered = scoreboard.delivered(),
        stalls,
        "soak passed"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut package = Package::default();
    for (seed, (low_power, registered_output)) in
        [(false, false), (false, true), (true, false), (true, true)].into_iter().enumerate()
    {
        let config = SkidConfig::default().low_power(low_power).registered_output(registered_output).width(32);
        soak(config, seed as u64 + 1)?;

        let name = format!(
            "skid_buffer{}{}",
            if registered_output { "_reg" } else { "_comb" },
            if low_power { "_lp" } else { "" }
        );
        package.add(config.gen_vir_module(&name));
    }

    package.gen_vir(Path::new("./build"))?;
    info!(modules = package.modules.len(), "wrote verilog to ./build");
    Ok(())
}
