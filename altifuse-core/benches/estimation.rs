//! Hot-path benchmarks: compensation, filter updates and one pipeline cycle

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use altifuse_core::{
    compensate, AltitudePipeline, BaroGpsFusion, CalibrationCoefficients, KalmanFilter, RawSample,
    fusion::barometric_smoothing,
};

const CALIBRATION: [u8; 24] = [
    112, 107, 67, 103, 24, 252, 125, 142, 67, 214, 208, 11,
    39, 11, 140, 0, 249, 255, 140, 60, 248, 198, 112, 23,
];

fn benchmark_compensation(c: &mut Criterion) {
    let coefficients = CalibrationCoefficients::load(&CALIBRATION).unwrap();
    let raw = RawSample::new(415_148, 519_888).unwrap();

    c.bench_function("calibration_load", |b| {
        b.iter(|| CalibrationCoefficients::load(black_box(&CALIBRATION)))
    });

    c.bench_function("compensate", |b| {
        b.iter(|| compensate(black_box(&coefficients), black_box(&raw)))
    });
}

fn benchmark_filters(c: &mut Criterion) {
    c.bench_function("kalman_update_1x1", |b| {
        let mut filter = KalmanFilter::new(barometric_smoothing());
        filter.update(&[100.0]).unwrap();
        b.iter(|| filter.update(black_box(&[100.1])))
    });

    c.bench_function("baro_gps_update", |b| {
        let mut fusion = BaroGpsFusion::default();
        fusion.update(Some(100.0), Some(100.0)).unwrap();
        b.iter(|| fusion.update(black_box(Some(100.1)), black_box(Some(99.0))))
    });

    c.bench_function("baro_gps_update_gps_missing", |b| {
        let mut fusion = BaroGpsFusion::default();
        fusion.update(Some(100.0), Some(100.0)).unwrap();
        b.iter(|| fusion.update(black_box(Some(100.1)), None))
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let coefficients = CalibrationCoefficients::load(&CALIBRATION).unwrap();
    let raw = RawSample::new(415_148, 519_888).unwrap();

    c.bench_function("pipeline_process", |b| {
        let mut pipeline = AltitudePipeline::new(coefficients);
        b.iter(|| pipeline.process(black_box(&raw)))
    });
}

criterion_group!(benches, benchmark_compensation, benchmark_filters, benchmark_pipeline);
criterion_main!(benches);
