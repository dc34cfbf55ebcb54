//! Stencil update tests
//!
//! Whole-engine checks of one or more ticks: diffusion of uniform fields,
//! the 3x3x3 height-gradient scenario, jet overrides and parallel dispatch.

use field3d::{
    BlendMode, Dispatch, FieldConfig, FieldEngine, FieldSample, Jet, PressureField, SeedPolicy,
    Vec3, VectorField,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Unit-cell pressure field with origin at zero.
fn pressure_field(dims: [usize; 3], seed: SeedPolicy) -> PressureField {
    let size = Vec3::new(dims[0] as f32, dims[1] as f32, dims[2] as f32);
    let config = FieldConfig::pressure(Vec3::ZERO, size, dims).with_seed(seed);
    PressureField::new(&config).unwrap()
}

/// Fill every cell with seeded random values.
fn randomize<S: FieldSample>(
    field: &mut FieldEngine<S>,
    rng: &mut StdRng,
    f: impl Fn(&mut StdRng) -> S,
) {
    field.state_mut().seed_with(|_, _| f(&mut *rng));
}

// =============================================================================
// DIFFUSION
// =============================================================================

/// Diffusing a uniform field changes nothing
#[test]
fn test_uniform_pressure_is_fixed_point() {
    let mut field = pressure_field([5, 4, 6], SeedPolicy::Constant(250.0));
    field.update(&[]).unwrap();

    for &value in field.state().cells() {
        assert!((value - 250.0).abs() < 1e-3, "Uniform field drifted to {}", value);
    }
}

/// Same for vectors, with either blend
#[test]
fn test_uniform_vector_is_fixed_point() {
    for blend in [BlendMode::Linear, BlendMode::Spherical] {
        let config = FieldConfig::vector(Vec3::ZERO, Vec3::splat(4.0), [4, 4, 4])
            .with_seed(SeedPolicy::Constant(0.7))
            .with_blend(blend);
        let mut field = VectorField::new(&config).unwrap();
        field.update(&[]).unwrap();

        for &v in field.state().cells() {
            assert!(
                v.abs_diff_eq(Vec3::splat(0.7), 1e-5),
                "{:?}: uniform vector drifted to {}",
                blend,
                v
            );
        }
    }
}

/// A 1x1x1 grid has no neighbours; the single cell keeps its value
#[test]
fn test_single_cell_grid() {
    let mut field = pressure_field([1, 1, 1], SeedPolicy::Constant(42.0));
    for _ in 0..3 {
        field.update(&[]).unwrap();
    }
    assert_eq!(field.state().get(0, 0, 0), 42.0);
}

/// 3x3x3 grid seeded with (2 - iy) * 250: the centre cell sees all 26
/// other cells (9 at 500, 8 at 250, 9 at 0), mean 250, so it stays 250.
#[test]
fn test_height_gradient_center_cell() {
    let mut field = pressure_field([3, 3, 3], SeedPolicy::HeightGradient { step: 250.0 });
    assert_eq!(field.state().get(1, 0, 1), 500.0);
    assert_eq!(field.state().get(1, 1, 1), 250.0);
    assert_eq!(field.state().get(1, 2, 1), 0.0);

    field.update(&[]).unwrap();

    let center = field.state().get(1, 1, 1);
    let expected = 0.5 * 250.0 + 0.5 * (9.0 * 500.0 + 8.0 * 250.0) / 26.0;
    assert!(
        (center - expected).abs() < 1e-3,
        "Center cell should be {}, got {}",
        expected,
        center
    );
}

/// Boundary cells average over fewer neighbours
#[test]
fn test_height_gradient_corner_cell() {
    let mut field = pressure_field([3, 3, 3], SeedPolicy::HeightGradient { step: 250.0 });
    field.update(&[]).unwrap();

    // Corner (0,0,0): 7 neighbours, 3 on the floor at 500 and 4 at 250
    let expected = 0.5 * 500.0 + 0.5 * (3.0 * 500.0 + 4.0 * 250.0) / 7.0;
    let corner = field.state().get(0, 0, 0);
    assert!((corner - expected).abs() < 1e-3, "Corner should be {}, got {}", expected, corner);
}

/// Repeated smoothing never leaves the initial value range
#[test]
fn test_diffusion_stays_bounded() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut field = pressure_field([6, 5, 4], SeedPolicy::Zero);
    randomize(&mut field, &mut rng, |r| r.gen_range(-10.0..10.0));

    let start = field.state().stats();
    for _ in 0..50 {
        field.update(&[]).unwrap();
    }
    let end = field.state().stats();

    assert!(end.max_magnitude <= start.max_magnitude + 1e-4);
    assert_eq!(end.non_finite, 0);
    // Converges toward a flat field
    let cells = field.state().cells();
    let highest = cells.iter().cloned().fold(f32::MIN, f32::max);
    let lowest = cells.iter().cloned().fold(f32::MAX, f32::min);
    let spread = highest - lowest;
    assert!(spread < 1.0, "Field should flatten out, spread = {}", spread);
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Serial and rayon dispatch produce identical buffers
#[test]
fn test_serial_and_parallel_agree() {
    let mut rng = StdRng::seed_from_u64(99);
    let base = FieldConfig::vector(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 2.0, 5.0), [7, 5, 9])
        .with_blend(BlendMode::Spherical);

    let mut serial = VectorField::new(&base.clone().with_dispatch(Dispatch::Serial)).unwrap();
    let mut parallel = VectorField::new(&base.with_dispatch(Dispatch::Parallel)).unwrap();

    randomize(&mut serial, &mut rng, |r| {
        Vec3::new(r.gen_range(-1.0..1.0), r.gen_range(-1.0..1.0), r.gen_range(-1.0..1.0))
    });
    let initial = serial.state().cells().to_vec();
    parallel.state_mut().seed_with(|layout, [ix, iy, iz]| initial[layout.cell_index(ix, iy, iz)]);

    let jets = [Jet::new(Vec3::new(0.5, 1.0, 4.0), 0.8, Vec3::Y)];
    for _ in 0..5 {
        serial.update(&jets).unwrap();
        parallel.update(&jets).unwrap();
    }

    assert_eq!(serial.state().cells(), parallel.state().cells());
}

// =============================================================================
// JETS
// =============================================================================

/// Every cell within the jet radius takes the jet value; the rest only diffuse
#[test]
fn test_jet_overwrites_cells_within_radius() {
    let mut field = pressure_field([7, 7, 7], SeedPolicy::Constant(1.0));
    let center = field.layout().cell_center(3, 3, 3);
    let radius = 1.5;
    let jets = [Jet::new(center, radius, 900.0f32)];

    field.update(&jets).unwrap();

    let layout = *field.layout();
    let mut inside = 0;
    for (idx, [ix, iy, iz]) in layout.cells() {
        let value = field.state().cells()[idx];
        if layout.cell_center(ix, iy, iz).distance(center) <= radius {
            inside += 1;
            assert_eq!(value, 900.0, "Cell {:?} inside the jet", [ix, iy, iz]);
        } else {
            assert!(
                (value - 1.0).abs() < 1e-5,
                "Cell {:?} outside the jet got {}",
                [ix, iy, iz],
                value
            );
        }
    }
    // 1 centre + 6 faces + 12 edges (distance sqrt 2)
    assert_eq!(inside, 19);
}

/// The override ignores the cell's previous value
#[test]
fn test_jet_override_ignores_prior_value() {
    let mut field = pressure_field([3, 3, 3], SeedPolicy::HeightGradient { step: 1000.0 });
    let jets = [Jet::new(Vec3::new(1.0, 0.0, 1.0), 0.0, -5.0f32)];
    field.update(&jets).unwrap();
    assert_eq!(field.state().get(1, 0, 1), -5.0);
}

/// A zero-radius jet placed on a sample point still hits that cell when the
/// grid origin and cell size are not whole numbers
#[test]
fn test_point_jet_on_fractional_grid() {
    let origin = Vec3::new(0.788, -0.083, -2.601);
    let config = FieldConfig::pressure(origin, Vec3::splat(0.8), [8, 8, 8]);
    let mut field = PressureField::new(&config).unwrap();
    let layout = *field.layout();

    for (idx, [ix, iy, iz]) in layout.cells() {
        let jets = [Jet::new(layout.cell_center(ix, iy, iz), 0.0, 7.0f32)];
        field.reset();
        field.update(&jets).unwrap();
        assert_eq!(field.state().cells()[idx], 7.0, "cell {:?} missed", [ix, iy, iz]);
    }
}

/// All jets are honoured, not just the first one
#[test]
fn test_multiple_jets_all_apply() {
    let config = FieldConfig::vector(Vec3::ZERO, Vec3::splat(8.0), [8, 8, 8]);
    let mut field = VectorField::new(&config).unwrap();

    let jets = [
        Jet::new(Vec3::new(1.0, 1.0, 1.0), 0.5, Vec3::X),
        Jet::new(Vec3::new(6.0, 6.0, 6.0), 0.5, Vec3::Z).inactive(),
        Jet::new(Vec3::new(6.0, 1.0, 3.0), 0.5, Vec3::Y * 2.0),
    ];
    field.update(&jets).unwrap();

    assert_eq!(field.state().get(1, 1, 1), Vec3::X);
    assert_eq!(field.state().get(6, 6, 6), Vec3::ZERO);
    assert_eq!(field.state().get(6, 1, 3), Vec3::Y * 2.0);
}

/// An inactive jet leaves the next tick free to diffuse its old footprint
#[test]
fn test_jet_switched_off_diffuses() {
    let mut field = pressure_field([5, 1, 1], SeedPolicy::Zero);
    let on = [Jet::new(Vec3::new(2.0, 0.0, 0.0), 0.1, 8.0f32)];
    field.update(&on).unwrap();
    assert_eq!(field.state().cells(), &[0.0, 0.0, 8.0, 0.0, 0.0]);

    let off = [on[0].inactive()];
    field.update(&off).unwrap();
    assert_eq!(field.state().cells(), &[0.0, 2.0, 4.0, 2.0, 0.0]);
}

// =============================================================================
// QUERIES
// =============================================================================

/// Far-away queries return zero and leave the field untouched
#[test]
fn test_far_query_returns_zero_without_mutation() {
    let field = pressure_field([3, 3, 3], SeedPolicy::HeightGradient { step: 250.0 });
    let before = field.state().cells().to_vec();

    assert_eq!(field.effector_at(Vec3::new(1e6, -1e6, 3.0)), 0.0);
    assert_eq!(field.sample_at_point(Vec3::new(-40.0, 1.0, 1.0)), 0.0);

    assert_eq!(field.state().cells(), &before[..]);
    assert_eq!(field.state().anomaly_count(), 2);
}

/// Cell centres read back their own cell
#[test]
fn test_point_query_at_cell_centres() {
    let config =
        FieldConfig::pressure(Vec3::new(-3.0, 1.0, 0.0), Vec3::new(2.0, 3.0, 1.0), [4, 3, 5]);
    let mut field = PressureField::new(&config).unwrap();
    field.state_mut().seed_with(|layout, [ix, iy, iz]| layout.cell_index(ix, iy, iz) as f32);

    let layout = *field.layout();
    for (idx, [ix, iy, iz]) in layout.cells() {
        assert_eq!(field.sample_at_point(layout.cell_center(ix, iy, iz)), idx as f32);
    }
    assert_eq!(field.state().anomaly_count(), 0);
}

/// Random coordinates round-trip through flatten/unflatten
#[test]
fn test_index_bijection_random_grids() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..20 {
        let dims = [rng.gen_range(1..9), rng.gen_range(1..9), rng.gen_range(1..9)];
        let layout = field3d::GridLayout::new(Vec3::ZERO, Vec3::ONE, dims).unwrap();
        for _ in 0..50 {
            let cell = [
                rng.gen_range(0..dims[0]),
                rng.gen_range(0..dims[1]),
                rng.gen_range(0..dims[2]),
            ];
            let idx = layout.cell_index(cell[0], cell[1], cell[2]);
            assert!(idx < layout.cell_count());
            assert_eq!(layout.cell_coords(idx), cell);
        }
    }
}
