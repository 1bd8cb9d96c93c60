use compass_heading::platform::mock::MockPlatform;
use compass_heading::{
    CardinalDirection, DEG_TO_RAD, Estimator, EstimatorSettings, ScreenRotation, SensorDelay, SensorKind,
    SensorSample, Sensitivity, round_degrees,
};

fn main() {
    let platform = MockPlatform::full();
    let settings = EstimatorSettings {
        sensor_delay: SensorDelay::Game,
        ..Default::default()
    };
    let (compass, headings) = match Estimator::with_channel(platform, settings) {
        Ok(pair) => pair,
        Err(error) => {
            eprintln!("Compass unavailable: {}", error);
            return;
        }
    };

    compass.start(Sensitivity::new(1.0, 360.0, 360.0));
    let sample_period_ns = u64::from(compass.settings().sensor_delay.period_us()) * 1_000;

    for i in 0..72u64 {
        // Replace this with readings delivered by the device's sensor dispatch
        let heading = (i * 5) as f32;
        let half = -heading * DEG_TO_RAD / 2.0;
        let sample = SensorSample::new(
            SensorKind::RotationVector,
            i * sample_period_ns,
            &[0.0, 0.0, half.sin(), half.cos(), 0.0],
        );

        if i == 36 {
            let rotation = ScreenRotation::Deg90;
            compass.platform().set_screen_rotation(rotation);
            println!("Screen rotated to {}°", rotation.degrees());
        }
        compass.on_sample(&sample);

        for estimate in headings.try_iter() {
            println!(
                "Azimuth: {:6}° {:>2}, Pitch: {}, Roll: {}",
                round_degrees(estimate.azimuth),
                CardinalDirection::from_azimuth(estimate.azimuth),
                round_degrees(estimate.pitch),
                round_degrees(estimate.roll)
            );
        }
    }

    compass.stop();
}
