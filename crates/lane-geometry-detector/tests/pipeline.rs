use approx::assert_abs_diff_eq;
use image::{GrayImage, Luma, Rgb, RgbImage};
use lane_geometry_detector::{
    FitOutcome, FrameGeometry, GeometryParams, LaneDetectError, LaneDetector, LaneDetectorParams,
    LaneFit, LaneMemory, PerspectiveParams, SearchParams,
};

/// 320x240 camera, identity bird's-eye map over the 320x200 crop.
fn small_params() -> LaneDetectorParams {
    LaneDetectorParams {
        frame: FrameGeometry {
            width: 320,
            height: 240,
            crop_top: 40,
        },
        perspective: PerspectiveParams {
            src: [[40.0, 190.0], [40.0, 10.0], [280.0, 10.0], [280.0, 190.0]],
            dst: [[40.0, 190.0], [40.0, 10.0], [280.0, 10.0], [280.0, 190.0]],
            rectified_width: 320,
            rectified_height: 200,
            corridor_x_min: 0,
            corridor_x_max: 320,
            thicken_kernel: 11,
            thicken_iterations: 2,
        },
        search: SearchParams {
            num_windows: 10,
            window_half_width: 30,
            min_pixels: 50,
            midpoint_offset: 0,
        },
        geometry: GeometryParams {
            longitudinal_span_m: 20.0,
            longitudinal_span_px: 200.0,
            lane_width_m: 3.7,
            lane_width_px: 200.0,
            reference_row: 180,
            mounting_bias_m: 0.0,
            ..GeometryParams::default()
        },
        ..LaneDetectorParams::default()
    }
}

/// Dark road with two bright markings whose edges are one-pixel ramps.
fn striped_frame() -> RgbImage {
    RgbImage::from_fn(320, 240, |x, _| {
        let v = match x {
            92 | 107 | 212 | 227 => 180,
            93..=106 | 213..=226 => 220,
            _ => 40,
        };
        Rgb([v, v, v])
    })
}

#[test]
fn camera_frame_with_two_markings_fits_both_sides() {
    let detector = LaneDetector::new(small_params()).expect("detector");
    let (detection, memory) = detector
        .detect(&striped_frame(), LaneMemory::new())
        .expect("detect");

    let FitOutcome::Fitted(left) = detection.left else {
        panic!("left side fell back: {:?}", detection.left);
    };
    let FitOutcome::Fitted(right) = detection.right else {
        panic!("right side fell back: {:?}", detection.right);
    };
    assert_abs_diff_eq!(left.c, 99.5, epsilon = 12.0);
    assert_abs_diff_eq!(right.c, 219.5, epsilon = 12.0);
    assert!(detection.left_base_x < 160 && detection.right_base_x >= 160);

    let offset = detection.lateral_offset_m.expect("trusted offset");
    assert!(offset.abs() < 1.0, "offset {offset}");

    assert_eq!(memory.left_fit, left);
    assert_eq!(memory.right_fit, right);
    assert_eq!(memory.left_base_x, detection.left_base_x);
    assert!(detection.debug.is_none());
}

#[test]
fn debug_images_are_collected_on_request() {
    let mut params = small_params();
    params.collect_debug = true;
    let detector = LaneDetector::new(params).expect("detector");
    let (detection, _) = detector
        .detect(&striped_frame(), LaneMemory::new())
        .expect("detect");

    let debug = detection.debug.as_ref().expect("debug images");
    assert_eq!(debug.binary.dimensions(), (320, 200));
    assert_eq!(debug.rectified.dimensions(), (320, 200));
    // marking plateau is Otsu foreground, background is not
    assert_eq!(debug.binary.get_pixel(100, 50).0[0], 255);
    assert_eq!(debug.binary.get_pixel(20, 50).0[0], 0);
    assert!(debug.lane.get_pixel(100, 100).0[0] > 0);

    let overlay = detector.search_debug_image(&debug.rectified, &detection.search);
    assert_eq!(overlay.dimensions(), (320, 200));
    let road = detector.road_area_mask(&detection);
    assert_eq!(road.dimensions(), (320, 240));
    assert_eq!(road.get_pixel(160, 140).0[0], 255);
    assert_eq!(road.get_pixel(160, 20).0[0], 0);
}

#[test]
fn red_marking_is_brighter_than_grey_road() {
    // BT.601 maps pure red to 76, above the 60 road; Rec.709 would give 54
    let mut params = small_params();
    params.collect_debug = true;
    let detector = LaneDetector::new(params).expect("detector");
    let frame = RgbImage::from_fn(320, 240, |x, _| {
        if (93..=106).contains(&x) {
            Rgb([255, 0, 0])
        } else {
            Rgb([60, 60, 60])
        }
    });
    let (detection, _) = detector.detect(&frame, LaneMemory::new()).expect("detect");
    let debug = detection.debug.as_ref().expect("debug images");
    assert_eq!(debug.binary.get_pixel(100, 50).0[0], 255);
    assert_eq!(debug.binary.get_pixel(20, 50).0[0], 0);
    assert_eq!(debug.binary.get_pixel(200, 50).0[0], 0);
}

#[test]
fn blank_frame_leaves_memory_untouched() {
    let detector = LaneDetector::new(small_params()).expect("detector");
    let prior = LaneMemory {
        left_fit: LaneFit::new(0.0, 0.01, 95.0),
        right_fit: LaneFit::new(0.0, -0.01, 225.0),
        left_base_x: 96,
        right_base_x: 224,
    };
    let frame = RgbImage::new(320, 240);
    let (detection, next) = detector.detect(&frame, prior).expect("detect");
    assert_eq!(detection.left, FitOutcome::Fallback(prior.left_fit));
    assert_eq!(detection.right, FitOutcome::Fallback(prior.right_fit));
    assert_eq!(next, prior);

    let (_, again) = detector.detect(&frame, next).expect("detect");
    assert_eq!(again, prior);
}

#[test]
fn mismatched_frame_is_rejected() {
    let detector = LaneDetector::new(small_params()).expect("detector");
    let err = detector
        .detect(&RgbImage::new(320, 239), LaneMemory::new())
        .unwrap_err();
    assert!(matches!(err, LaneDetectError::FrameSize { got_height: 239, .. }));
}

#[test]
fn rectified_vertical_strokes_are_straight() {
    let params = LaneDetectorParams {
        frame: FrameGeometry {
            width: 1280,
            height: 1440,
            crop_top: 720,
        },
        perspective: PerspectiveParams {
            rectified_width: 1280,
            rectified_height: 720,
            corridor_x_min: 0,
            corridor_x_max: 1280,
            ..PerspectiveParams::default()
        },
        search: SearchParams {
            midpoint_offset: 0,
            ..SearchParams::default()
        },
        geometry: GeometryParams {
            reference_row: 700,
            ..GeometryParams::default()
        },
        ..LaneDetectorParams::default()
    };
    let detector = LaneDetector::new(params).expect("detector");

    let mask = GrayImage::from_fn(1280, 720, |x, _| {
        Luma([if (396..=404).contains(&x) || (796..=804).contains(&x) {
            255
        } else {
            0
        }])
    });
    let (detection, _) = detector.track_rectified(&mask, LaneMemory::new());

    let left = detection.left.fit();
    let right = detection.right.fit();
    assert!(!detection.any_fallback());
    assert_abs_diff_eq!(left.a, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(left.b, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(left.c, 400.0, epsilon = 1e-6);
    assert_abs_diff_eq!(right.c, 800.0, epsilon = 1e-6);
    assert!(detection.curvature.radius_m > 1e6);
    assert_eq!(detection.reliable_radius_m, None);
}
