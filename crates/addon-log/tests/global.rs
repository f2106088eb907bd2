use std::sync::Arc;

use addon_log::{
    global, log_at, log_error, log_info, log_warn, Channel, DebugMode, Logger, LoggerConfig,
    MemoryConsole, MemorySettings, MessageLevel, SharedObject,
};
use serde_json::json;

// The global logger is process-wide, so everything runs in one test.
#[tokio::test]
async fn macros_route_through_installed_logger() {
    let console = MemoryConsole::new();
    let settings = MemorySettings::new();
    settings.set("debugMode", json!(false)).await.unwrap();

    let logger = Logger::new(LoggerConfig::default(), Arc::new(console.clone()))
        .with_settings(Arc::new(settings));
    addon_log::install(logger).unwrap();

    let second = Logger::new(LoggerConfig::default(), Arc::new(MemoryConsole::new()));
    assert!(addon_log::install(second).is_err());

    let object = SharedObject::from_iter([("integers", 123)]);
    log_info!("unset shows info", &object);
    object.set("integers", 456);

    global::initialize().await;
    assert_eq!(global().debug_mode(), DebugMode::Disabled);

    log_info!("hidden");
    log_warn!("careful");
    log_error!("broken", 500);
    log_at!(MessageLevel::Warn, "via log_at");

    global::set_debug_mode(Some(true));
    log_info!("shown again");

    let records = console.records();
    assert_eq!(records.len(), 5);
    assert_eq!(records[0].args[1].to_json(), json!({"integers": 123}));
    assert_eq!(console.records_on(Channel::Warn).len(), 2);
    assert_eq!(console.records_on(Channel::Error).len(), 1);
    assert_eq!(records[4].args[0].to_string(), "shown again");
}
