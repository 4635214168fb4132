use camera::{CameraSession, CameraSettings, Detector, HandDetection, HandDetector};
use logging::{LogLevel, Logger};

fn main() {
    println!("Camera demo - Starting...");

    let settings = load_settings();
    let logger = initialize_logger(&settings);

    logger.info("Camera demo starting...");
    run_demo(&settings, &logger);
    logger.info("Camera demo finished");
}

/// Loads settings from the first CLI argument, the usual search locations,
/// or falls back to defaults
fn load_settings() -> CameraSettings {
    let loaded = match std::env::args().nth(1) {
        Some(path) => CameraSettings::load_from_file(&path).map(|s| (s, path)),
        None => CameraSettings::find_and_load("camera.json")
            .map(|s| (s, "camera.json".to_string())),
    };

    match loaded {
        Ok((settings, path)) => {
            println!("Configuration loaded from: {}", path);
            settings
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!("Using default values...");
            CameraSettings::default()
        }
    }
}

/// Builds the logger described by the logging section
fn initialize_logger(settings: &CameraSettings) -> Logger {
    let config = &settings.logging;
    let level = config.log_level.parse().unwrap_or_else(|e| {
        eprintln!("{}, using info", e);
        LogLevel::Info
    });

    if !config.enable_file {
        return Logger::console(level).for_component("Main");
    }

    match Logger::new(config.log_file_path.clone().into(), level) {
        Ok(logger) => {
            println!(
                "Logging initialized: {} (level: {})",
                config.log_file_path, level
            );
            logger
                .with_console_echo(config.enable_console)
                .for_component("Main")
        }
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            eprintln!("Cannot continue without logging system.");
            std::process::exit(1);
        }
    }
}

/// Two cameras sharing one device: video in both request forms, detection,
/// an explicit turn_on on the second camera, then joins
fn run_demo(settings: &CameraSettings, logger: &Logger) {
    let camera1 = CameraSession::from_settings(settings, logger.clone());
    let camera2 = CameraSession::from_settings(settings, logger.clone());

    if let Err(e) = camera1.start_video((1920, 1080, 30)) {
        logger.error(&format!("camera 1 video failed: {}", e));
    }
    let outcome = camera1.wait_for_detection();
    logger.info(&format!("camera 1 detection: {:?}", outcome));
    println!("camera 1 is alive? {}", camera1.is_video_alive());
    camera1.turn_off();

    if let Err(e) = camera2.turn_on() {
        eprintln!("CameraError caught in main: {}", e);
    }

    if let Err(e) = camera2.start_video((1280, 720)) {
        logger.error(&format!("camera 2 video failed: {}", e));
    }
    let outcome = camera2.wait_for_detection();
    logger.info(&format!("camera 2 detection: {:?}", outcome));
    println!("camera 2 is alive? {}", camera2.is_video_alive());
    camera2.turn_off();

    let hand = HandDetection::new(
        &settings.detection.hand_model,
        &settings.detection.hand_gesture,
        logger.for_component("Hand"),
    );
    hand.detect();
    println!("Coordinates X: {}", hand.coordinates_x());
    println!("Coordinates Y: {}", hand.coordinates_y());

    for (name, camera) in [("camera 1", &camera1), ("camera 2", &camera2)] {
        if let Err(e) = camera.join_video() {
            logger.error(&format!("{} join failed: {}", name, e));
        }
    }

    println!("camera 1 is alive? {}", camera1.is_video_alive());
    println!("camera 2 is alive? {}", camera2.is_video_alive());
}
