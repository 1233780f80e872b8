use netspeed::{Config, SpeedMonitor};
use std::thread;
use std::time::Duration;

fn main() -> netspeed::Result<()> {
    env_logger::init();

    let config = Config::default().with_interval(1);
    println!(
        "Sampling {} every {}s, ignoring {:?}",
        config.source_path.display(),
        config.refresh_interval_secs,
        config.ignored_interface_prefixes
    );

    let mut monitor = SpeedMonitor::from_config(config);
    monitor.on_update(|text| println!("{text}"))?;

    // Start monitoring
    monitor.start()?;

    // Monitor for 30 seconds
    thread::sleep(Duration::from_secs(30));

    // Stop monitoring
    monitor.stop();

    Ok(())
}
