//! Fusion Pipeline Benchmarks
//!
//! Benchmarks for the per-tick hot path and the startup-time calibration:
//! - Scan preprocessing (sector extraction, polar conversion)
//! - Frame undistortion (map build and remap)
//! - Projection and detection association
//! - Non-maximum suppression
//! - Extrinsic pose solving
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use drishti_fusion::{
    non_max_suppression, project_points, BoundingBox, CalibrationContext, CameraFrame,
    CameraIntrinsics, CorrespondenceSet, Detection, DistortionCoeffs, ExtrinsicPose,
    ExtrinsicSolver, FusionAssociator, ImagePoint, LaserScan, MountingConfig, Point2D, Point3D,
    ScanPreprocessor, UndistortMap,
};

// ============================================================================
// Test Fixtures
// ============================================================================

fn benchmark_intrinsics() -> CameraIntrinsics {
    CameraIntrinsics::from_row_major(
        [340.12, 0.0, 319.99, 0.0, 324.71, 239.57, 0.0, 0.0, 1.0],
        DistortionCoeffs::new(-0.28, 0.07, 0.0, 0.0, 0.0),
        640,
        480,
    )
    .expect("valid intrinsics")
}

fn identity_context() -> CalibrationContext {
    CalibrationContext::new(
        benchmark_intrinsics(),
        ExtrinsicPose::identity(),
        ExtrinsicPose::identity(),
    )
}

/// A full 505-beam scan of a wavy wall ahead of the scanner.
fn benchmark_scan() -> LaserScan {
    let ranges: Vec<f32> = (0..505)
        .map(|i| 2.0 + 0.5 * ((i as f32) * 0.05).sin())
        .collect();
    LaserScan::new(-std::f32::consts::FRAC_PI_2, std::f32::consts::PI / 504.0, ranges)
}

/// Scanner-frame points ahead of the camera after lifting.
fn benchmark_points(n: usize) -> Vec<Point2D> {
    (0..n)
        .map(|i| {
            let lateral = (i as f32 / n as f32 - 0.5) * 1.6;
            Point2D::new(-2.0 - 0.2 * (i as f32 * 0.1).sin(), lateral)
        })
        .collect()
}

/// A cluster of overlapping detection boxes across the frame.
fn benchmark_detections(n: usize) -> Vec<Detection> {
    (0..n)
        .map(|i| {
            let x = (i % 20) as f32 * 30.0;
            let y = (i / 20) as f32 * 40.0;
            Detection {
                class_id: 4,
                confidence: 0.5 + (i as f32 * 0.37).fract() * 0.5,
                rect: BoundingBox::new(x, y, 80.0, 96.0),
            }
        })
        .collect()
}

/// A planar calibration target projected through a known pose.
fn benchmark_correspondences(n: usize) -> CorrespondenceSet {
    let intrinsics = benchmark_intrinsics();
    let pose = ExtrinsicPose::new(
        nalgebra::Matrix3::identity(),
        nalgebra::Vector3::new(0.05, 0.06, -0.35),
    );

    let mut object = Vec::with_capacity(n);
    let mut image = Vec::with_capacity(n);
    for i in 0..n {
        let x = (i as f32 / n as f32 - 0.5) * 2.0;
        let y = if i % 2 == 0 { -0.1 } else { 0.0 };
        let p = Point3D::new(x, y, 1.8);
        let q = pose.transform(&p);
        let (u, v) = intrinsics.denormalize(q.x / q.z, q.y / q.z);
        object.push(p);
        image.push(ImagePoint::new(u, v));
    }
    CorrespondenceSet::new(image, object)
}

// ============================================================================
// Scan Processing Benchmarks
// ============================================================================

fn bench_scan_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_processing");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));

    let scan = benchmark_scan();
    let preprocessor = ScanPreprocessor::default();

    group.bench_function("preprocess/505", |b| {
        b.iter(|| preprocessor.process(black_box(&scan)))
    });

    group.finish();
}

// ============================================================================
// Undistortion Benchmarks
// ============================================================================

fn bench_undistortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("undistortion");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(3));
    group.warm_up_time(Duration::from_secs(1));

    let intrinsics = benchmark_intrinsics();

    // Startup cost, paid once.
    group.bench_function("build_map/640x480", |b| {
        b.iter(|| UndistortMap::build(black_box(&intrinsics)))
    });

    // Per-frame cost.
    let map = UndistortMap::build(&intrinsics);
    let frame = CameraFrame::black(640, 480);
    group.bench_function("remap/640x480", |b| b.iter(|| map.apply(black_box(&frame))));

    group.finish();
}

// ============================================================================
// Projection and Association Benchmarks
// ============================================================================

fn bench_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("fusion");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));

    let context = identity_context();
    let associator = FusionAssociator::new(MountingConfig::default());

    let lifted: Vec<Point3D> = benchmark_points(254)
        .iter()
        .map(|p| Point3D::new(p.y, -0.058, -p.x))
        .collect();
    group.bench_function("project_points/254", |b| {
        b.iter(|| project_points(black_box(&context), black_box(&lifted)))
    });

    let points = benchmark_points(254);
    let detections = benchmark_detections(8);
    group.bench_function("associate/254x8", |b| {
        b.iter(|| {
            associator.associate(
                black_box(&context),
                black_box(&points),
                black_box(&detections),
            )
        })
    });

    group.finish();
}

// ============================================================================
// NMS Benchmarks
// ============================================================================

fn bench_nms(c: &mut Criterion) {
    let mut group = c.benchmark_group("nms");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));

    let detections = benchmark_detections(200);
    group.bench_function("suppress/200", |b| {
        b.iter_batched(
            || detections.clone(),
            |dets| non_max_suppression(dets, 0.4),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ============================================================================
// Calibration Benchmarks
// ============================================================================

fn bench_calibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibration");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));

    let intrinsics = benchmark_intrinsics();
    let set = benchmark_correspondences(20);
    let solver = ExtrinsicSolver::default();

    group.bench_function("pnp_solve/20", |b| {
        b.iter(|| solver.solve(black_box(&intrinsics), black_box(&set)))
    });

    group.finish();
}

// ============================================================================
// Main
// ============================================================================

criterion_group!(
    benches,
    bench_scan_processing,
    bench_undistortion,
    bench_fusion,
    bench_nms,
    bench_calibration,
);

criterion_main!(benches);
