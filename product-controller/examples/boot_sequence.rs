//! Walks a controller through boot, source registration, playback and
//! inactivity power-off, printing each status along the way.
//!
//! Run with `EDDIE_LOG_MODE=debug` for the full transition trace.

use std::time::Duration;

use product_controller::{
    ControllerConfig, LoggingCommandSink, ProductController, SlotId, SourceSlot, TimerDurations,
};
use product_state::logging::{init_logging, init_logging_from_env, LoggingMode};
use product_state::{KeyAction, NetworkType, ProductMessage};

fn print_status(
    step: &str,
    controller: &ProductController,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = controller.status()?;
    println!("{} -> {}", step, status.state);
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match std::env::var("EDDIE_LOG_MODE") {
        Ok(_) => init_logging_from_env()?,
        Err(_) => init_logging(LoggingMode::Development)?,
    }

    let config = ControllerConfig::new().with_timers(TimerDurations {
        no_network_configured: Duration::from_secs(1),
        ..TimerDurations::uniform(Duration::from_secs(2))
    });
    let controller = ProductController::start(config, LoggingCommandSink)?;
    print_status("1. Started", &controller)?;

    controller.register_source_slots(vec![
        SourceSlot::new(1, "Bluetooth", true),
        SourceSlot::new(2, "Optical", false),
    ])?;
    controller.post(ProductMessage::LpmStatus { connected: true })?;
    controller.post(ProductMessage::CapsStatus { initialized: true })?;
    controller.post(ProductMessage::AudioPathStatus { connected: true })?;
    print_status("2. Hardware ready, waiting for source slots", &controller)?;

    let slots = controller.source_slots();
    slots.acknowledge_created(SlotId::new(2));
    slots.acknowledge_created(SlotId::new(1));
    print_status("3. Source slots created", &controller)?;

    controller.post(ProductMessage::NetworkStatus {
        configured: true,
        connected: true,
        network_type: NetworkType::Wireless,
    })?;
    controller.post(ProductMessage::WirelessStatus {
        configured: true,
        frequency_khz: 5_180_000,
    })?;
    controller.post(ProductMessage::VolumeStatus {
        level: 30,
        muted: false,
    })?;
    print_status("4. Network up", &controller)?;

    let router = controller.key_router();
    router.route_key(KeyAction::Preset2)?;
    router.route_key(KeyAction::VolumeUp)?;
    print_status("5. Preset pressed", &controller)?;

    println!("Waiting for the playing inactivity timer...");
    std::thread::sleep(Duration::from_millis(2500));
    print_status("6. After inactivity", &controller)?;

    controller.shutdown();
    println!("Done");
    Ok(())
}
