//! # PS5 DualSense Gamepad Input
//!
//! Reads a DualSense controller through the Linux evdev interface and turns
//! stick movement into [`AxisState`] snapshots.
//!
//! ## Controller Detection
//!
//! The DualSense controller is identified by:
//! - Vendor ID: 0x054c (Sony)
//! - Product ID: 0x0ce6 (DualSense, both wired and Bluetooth)
//!
//! ## Mapping
//!
//! | Control | evdev Code | Drives |
//! |---------|------------|--------|
//! | Right Stick X | ABS_Z | horizontal (-1 left, +1 right) |
//! | Right Stick Y | ABS_RZ | vertical (+1 stick up) |
//! | Left Stick Y | ABS_Y | throttle (0 down, 1 center, 2 up) |
//! | PS | BTN_MODE | shutdown request (disarm) |

use evdev::{AbsoluteAxisType, Device, InputEvent, InputEventKind, Key};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

use super::calibration::AxisCalibration;
use super::AxisPublisher;
use crate::error::{HelicLinkError, Result};
use crate::protocol::AxisState;
use crate::session::ShutdownHandle;

/// PS5 DualSense vendor ID (Sony)
const DUALSENSE_VENDOR_ID: u16 = 0x054c;

/// PS5 DualSense product ID (wired and Bluetooth)
const DUALSENSE_PRODUCT_ID: u16 = 0x0ce6;

/// Raw stick center value
pub const AXIS_CENTER: i32 = 128;

/// Raw stick half travel
const AXIS_HALF_RANGE: f32 = 127.0;

/// PS5 DualSense controller handle
pub struct DualSenseController {
    device: Device,
    device_path: String,
}

impl std::fmt::Debug for DualSenseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualSenseController")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl DualSenseController {
    /// Detect and open the first available PS5 DualSense controller
    ///
    /// Scans `/dev/input/event*` in sorted order and matches vendor/product
    /// IDs.
    ///
    /// # Errors
    ///
    /// - `ControllerNotFound`: no DualSense controller found
    /// - `Controller`: `/dev/input` cannot be read
    pub fn open() -> Result<Self> {
        let input_dir = Path::new("/dev/input");

        if !input_dir.exists() {
            return Err(HelicLinkError::Controller(
                "/dev/input directory not found".to_string(),
            ));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(input_dir)
            .map_err(|e| HelicLinkError::Controller(format!("Failed to read /dev/input: {}", e)))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.file_name()
                    .map_or(false, |name| name.to_string_lossy().starts_with("event"))
            })
            .collect();

        // Deterministic choice when several controllers are connected
        paths.sort();

        for path in paths {
            match Device::open(&path) {
                Ok(device) => {
                    let id = device.input_id();
                    debug!(
                        "Found input device: {} (vendor: 0x{:04x}, product: 0x{:04x})",
                        path.display(),
                        id.vendor(),
                        id.product()
                    );

                    if id.vendor() == DUALSENSE_VENDOR_ID && id.product() == DUALSENSE_PRODUCT_ID {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found PS5 DualSense controller at: {}", device_path);
                        return Ok(Self {
                            device,
                            device_path,
                        });
                    }
                }
                Err(e) => debug!("Could not open {}: {}", path.display(), e),
            }
        }

        Err(HelicLinkError::ControllerNotFound)
    }

    /// Open a controller at a known device path
    ///
    /// # Errors
    ///
    /// Returns `Controller` error if the device cannot be opened.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|e| {
            HelicLinkError::Controller(format!("Failed to open {}: {}", path.display(), e))
        })?;

        info!("Opened controller at: {}", path.display());
        Ok(Self {
            device,
            device_path: path.to_string_lossy().to_string(),
        })
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Controller name as reported by evdev
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Block until events are available and return them
    ///
    /// # Errors
    ///
    /// Returns `Controller` error if the controller was disconnected.
    pub fn fetch_events(&mut self) -> Result<Vec<InputEvent>> {
        self.device
            .fetch_events()
            .map(|events| events.collect())
            .map_err(|e| HelicLinkError::Controller(format!("Failed to fetch events: {}", e)))
    }
}

/// What the reader should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadAction {
    /// Nothing beyond a possible stick update
    None,
    /// PS button pressed
    Shutdown,
}

/// Converts raw evdev events into axis snapshots
#[derive(Debug, Clone)]
pub struct GamepadMapper {
    right_x: i32,
    right_y: i32,
    left_y: i32,
    calibration: AxisCalibration,
}

impl Default for GamepadMapper {
    fn default() -> Self {
        Self::new(AxisCalibration::default())
    }
}

impl GamepadMapper {
    pub fn new(calibration: AxisCalibration) -> Self {
        Self {
            right_x: AXIS_CENTER,
            right_y: AXIS_CENTER,
            left_y: AXIS_CENTER,
            calibration,
        }
    }

    /// Update raw stick state from one event
    pub fn process_event(&mut self, event: &InputEvent) -> GamepadAction {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => {
                match axis {
                    AbsoluteAxisType::ABS_Z => self.right_x = event.value(),
                    AbsoluteAxisType::ABS_RZ => self.right_y = event.value(),
                    AbsoluteAxisType::ABS_Y => self.left_y = event.value(),
                    _ => {}
                }
                GamepadAction::None
            }
            InputEventKind::Key(Key::BTN_MODE) if event.value() != 0 => GamepadAction::Shutdown,
            _ => GamepadAction::None,
        }
    }

    /// Current sticks as a calibrated snapshot
    pub fn axis_state(&self) -> AxisState {
        let cal = &self.calibration;
        AxisState {
            horizontal: cal.horizontal.apply(normalize(self.right_x)),
            // evdev Y grows downward
            vertical: cal.vertical.apply(-normalize(self.right_y)),
            throttle: 1.0 + cal.throttle.apply(-normalize(self.left_y)),
        }
    }
}

/// Raw 0-255 stick value to -1.0..=1.0
fn normalize(raw: i32) -> f32 {
    ((raw - AXIS_CENTER) as f32 / AXIS_HALF_RANGE).clamp(-1.0, 1.0)
}

/// Read the controller on a dedicated thread
///
/// Every batch of events publishes a fresh snapshot. The PS button requests
/// shutdown. Losing the controller also requests shutdown so the drone is
/// disarmed rather than left on its last stick values.
pub fn spawn_reader(
    mut controller: DualSenseController,
    mut mapper: GamepadMapper,
    publisher: AxisPublisher,
    shutdown: ShutdownHandle,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("gamepad".to_string())
        .spawn(move || {
            while !shutdown.is_requested() {
                let events = match controller.fetch_events() {
                    Ok(events) => events,
                    Err(e) => {
                        error!("{}; disarming", e);
                        shutdown.request_shutdown();
                        break;
                    }
                };

                for event in &events {
                    if mapper.process_event(event) == GamepadAction::Shutdown {
                        warn!("PS button pressed, disarming");
                        shutdown.request_shutdown();
                    }
                }
                publisher.publish(mapper.axis_state());
            }
            debug!("Gamepad reader stopped");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::calibration::Calibration;
    use evdev::EventType;

    fn axis_event(axis: AbsoluteAxisType, value: i32) -> InputEvent {
        InputEvent::new(EventType::ABSOLUTE, axis.0, value)
    }

    fn key_event(key: Key, pressed: bool) -> InputEvent {
        InputEvent::new(EventType::KEY, key.code(), i32::from(pressed))
    }

    fn linear_mapper() -> GamepadMapper {
        GamepadMapper::new(AxisCalibration {
            horizontal: Calibration::linear(),
            vertical: Calibration::linear(),
            throttle: Calibration::linear(),
        })
    }

    #[test]
    fn test_dualsense_ids() {
        assert_eq!(DUALSENSE_VENDOR_ID, 0x054c);
        assert_eq!(DUALSENSE_PRODUCT_ID, 0x0ce6);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(128), 0.0);
        assert_eq!(normalize(255), 1.0);
        assert_eq!(normalize(1), -1.0);
        assert_eq!(normalize(0), -1.0);
    }

    #[test]
    fn test_centered_sticks_hover_throttle() {
        let state = linear_mapper().axis_state();
        assert_eq!(state.horizontal, 0.0);
        assert_eq!(state.vertical, 0.0);
        assert_eq!(state.throttle, 1.0);
    }

    #[test]
    fn test_right_stick_drives_axes() {
        let mut mapper = linear_mapper();
        mapper.process_event(&axis_event(AbsoluteAxisType::ABS_Z, 255));
        mapper.process_event(&axis_event(AbsoluteAxisType::ABS_RZ, 1));

        let state = mapper.axis_state();
        assert_eq!(state.horizontal, 1.0);
        assert_eq!(state.vertical, 1.0);
    }

    #[test]
    fn test_left_stick_drives_throttle() {
        let mut mapper = linear_mapper();

        mapper.process_event(&axis_event(AbsoluteAxisType::ABS_Y, 1));
        assert_eq!(mapper.axis_state().throttle, 2.0);

        mapper.process_event(&axis_event(AbsoluteAxisType::ABS_Y, 255));
        assert_eq!(mapper.axis_state().throttle, 0.0);
    }

    #[test]
    fn test_unmapped_axes_ignored() {
        let mut mapper = linear_mapper();
        let action = mapper.process_event(&axis_event(AbsoluteAxisType::ABS_X, 0));
        assert_eq!(action, GamepadAction::None);
        assert_eq!(mapper.axis_state(), linear_mapper().axis_state());
    }

    #[test]
    fn test_ps_button_requests_shutdown() {
        let mut mapper = linear_mapper();
        assert_eq!(
            mapper.process_event(&key_event(Key::BTN_MODE, true)),
            GamepadAction::Shutdown
        );
        assert_eq!(
            mapper.process_event(&key_event(Key::BTN_MODE, false)),
            GamepadAction::None
        );
        assert_eq!(
            mapper.process_event(&key_event(Key::BTN_SOUTH, true)),
            GamepadAction::None
        );
    }

    #[test]
    fn test_deadzone_applied() {
        let mut mapper = GamepadMapper::default();
        mapper.process_event(&axis_event(AbsoluteAxisType::ABS_Z, 130));
        assert_eq!(mapper.axis_state().horizontal, 0.0);
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_with_real_hardware() {
        let controller = DualSenseController::open().expect("Controller not found");
        assert!(controller.device_path().starts_with("/dev/input/event"));
        assert!(controller.name().is_some());
    }
}
