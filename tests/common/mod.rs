#![allow(dead_code)]

use compass_heading::{ScreenRotation, SensorDelay, SensorKind, SensorPlatform, SensorSample};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Phone-like platform with a configurable sensor set
pub struct TestPlatform {
    sensors: Vec<SensorKind>,
    registered: AtomicUsize,
    rotation: AtomicU8,
    log: Mutex<Vec<String>>,
}

impl TestPlatform {
    pub fn new(sensors: &[SensorKind]) -> Self {
        Self {
            sensors: sensors.to_vec(),
            registered: AtomicUsize::new(0),
            rotation: AtomicU8::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn all_sensors() -> Self {
        Self::new(&SensorKind::ALL)
    }

    pub fn rotate_screen(&self, rotation: ScreenRotation) {
        let index = match rotation {
            ScreenRotation::Deg0 => 0,
            ScreenRotation::Deg90 => 1,
            ScreenRotation::Deg180 => 2,
            ScreenRotation::Deg270 => 3,
        };
        self.rotation.store(index, Ordering::SeqCst);
    }

    pub fn registered_count(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl SensorPlatform for TestPlatform {
    fn has_sensor(&self, kind: SensorKind) -> bool {
        self.sensors.contains(&kind)
    }

    fn register_listener(&self, kind: SensorKind, _delay: SensorDelay) {
        self.log.lock().unwrap().push(format!("register {:?}", kind));
        self.registered.fetch_add(1, Ordering::SeqCst);
    }

    fn unregister_listeners(&self) {
        self.log.lock().unwrap().push("unregister".to_string());
        self.registered.store(0, Ordering::SeqCst);
    }

    fn screen_rotation(&self) -> ScreenRotation {
        match self.rotation.load(Ordering::SeqCst) {
            1 => ScreenRotation::Deg90,
            2 => ScreenRotation::Deg180,
            3 => ScreenRotation::Deg270,
            _ => ScreenRotation::Deg0,
        }
    }
}

/// Rotation vector for a device lying flat with its top edge towards `azimuth_deg`
pub fn flat_heading(azimuth_deg: f32) -> SensorSample {
    let half = -azimuth_deg.to_radians() / 2.0;
    SensorSample::new(
        SensorKind::RotationVector,
        0,
        &[0.0, 0.0, half.sin(), half.cos(), 0.0],
    )
}

/// Rotation vector for a device tilted about its X axis by `pitch_deg` then
/// about its Y axis by `roll_deg`, top edge towards north
pub fn tilted(pitch_deg: f32, roll_deg: f32) -> SensorSample {
    let (sx, cx) = (-pitch_deg.to_radians() / 2.0).sin_cos();
    let (sy, cy) = (roll_deg.to_radians() / 2.0).sin_cos();
    // q = qx * qy
    let w = cx * cy;
    let x = sx * cy;
    let y = cx * sy;
    let z = sx * sy;
    SensorSample::new(SensorKind::RotationVector, 0, &[x, y, z, w])
}

pub fn accelerometer(values: [f32; 3]) -> SensorSample {
    SensorSample::new(SensorKind::Accelerometer, 0, &values)
}

pub fn magnetometer(values: [f32; 3]) -> SensorSample {
    SensorSample::new(SensorKind::Magnetometer, 0, &values)
}

/// Smallest absolute difference between two headings in degrees
pub fn angular_difference(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}
