//! Smoothing diagnostic on the 3x3x3 height-gradient pressure field.
//!
//! Prints the middle column every few ticks so convergence can be eyeballed.

use field3d::{FieldConfig, PressureField, SeedPolicy, Vec3};

fn print_column(field: &PressureField, tick: u64) {
    let state = field.state();
    let column: Vec<String> = (0..3).map(|iy| format!("{:8.3}", state.get(1, iy, 1))).collect();
    let stats = state.stats();
    println!(
        "Tick {:2}: column (1,y,1) = [{}]  min {:8.3} max {:8.3}",
        tick,
        column.join(", "),
        stats.min_magnitude,
        stats.max_magnitude
    );
}

fn main() {
    env_logger::init();

    println!("=== HEIGHT GRADIENT SMOOTHING ===\n");
    let config = FieldConfig::pressure(Vec3::ZERO, Vec3::splat(3.0), [3, 3, 3])
        .with_seed(SeedPolicy::HeightGradient { step: 250.0 });
    let mut field = match PressureField::new(&config) {
        Ok(field) => field,
        Err(e) => {
            eprintln!("Bad config: {}", e);
            return;
        }
    };

    for tick in 0..=20 {
        if tick % 4 == 0 {
            print_column(&field, field.frame());
        }
        if let Err(e) = field.update(&[]) {
            eprintln!("Update failed: {}", e);
            return;
        }
    }

    println!("\n=== OUT OF RANGE QUERY ===");
    let far = Vec3::new(100.0, 100.0, 100.0);
    println!("sample at {} = {}", far, field.sample_at_point(far));
    println!("boundary anomalies so far: {}", field.state().anomaly_count());
}
