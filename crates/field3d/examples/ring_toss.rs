//! Ring toss driver: rings pushed by a vector or pressure field with two jets.
//!
//! Usage: cargo run --example ring_toss [config.json]
//!
//! Run with RUST_LOG=info to see the periodic field debug lines.

use field3d::{AnyFieldEngine, FieldConfig, Jet, Ring, Vec3};

const DT: f32 = 1.0 / 50.0;
const TICKS: u32 = 500;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => FieldConfig::load_json(std::path::Path::new(path))?,
        None => FieldConfig::default(),
    };

    let mut engine = AnyFieldEngine::from_config(&config)?;
    let layout = *engine.layout();
    let min = layout.origin();
    let max = layout.origin() + layout.size();
    let floor_y = min.y;
    let mid = (min + max) * 0.5;

    println!("=== RING TOSS ({:?} field) ===", engine.kind());
    println!(
        "Grid: {}x{}x{}, cell size {}",
        layout.dims()[0],
        layout.dims()[1],
        layout.dims()[2],
        layout.cell_size()
    );

    let mut rings: Vec<Ring> = (0..4)
        .map(|i| {
            let x = min.x + (i as f32 + 0.5) * (max.x - min.x) / 4.0;
            Ring::circle(Vec3::new(x, mid.y, mid.z), 0.6, 8)
        })
        .collect();

    let left = Vec3::new(min.x + (max.x - min.x) * 0.25, floor_y, mid.z);
    let right = Vec3::new(min.x + (max.x - min.x) * 0.75, floor_y, mid.z);

    for tick in 0..TICKS {
        // Buttons: left held for the first second of every three, right for the second
        let phase = (tick as f32 * DT) % 3.0;
        let left_on = phase < 1.0;
        let right_on = (1.0..2.0).contains(&phase);

        // Tilting the toy
        if tick == TICKS / 2 {
            engine.set_gravity(Vec3::new(-4.0, -9.0, 0.0));
            println!("-- gravity tilted at tick {}", tick);
        }

        for ring in &mut rings {
            ring.clear_forces();
        }
        let total = engine.apply_ring_forces(&mut rings);

        match &mut engine {
            AnyFieldEngine::Vector(field) => {
                let jets = [
                    Jet { active: left_on, ..Jet::new(left, 1.5, Vec3::new(0.5, 3.0, 0.0)) },
                    Jet { active: right_on, ..Jet::new(right, 1.5, Vec3::new(-0.5, 3.0, 0.0)) },
                ];
                field.step(DT, &jets)?;
            }
            AnyFieldEngine::Pressure(field) => {
                let jets = [
                    Jet { active: left_on, ..Jet::new(left, 1.5, 500.0) },
                    Jet { active: right_on, ..Jet::new(right, 1.5, 500.0) },
                ];
                field.step(DT, &jets)?;
            }
        }

        if tick % 50 == 0 {
            let stats = engine.stats();
            println!(
                "Tick {:3}: jets L={} R={}  ring force ({:7.3}, {:7.3}, {:7.3})  |v| {:8.3}/{:8.3}",
                tick,
                left_on as u8,
                right_on as u8,
                total.x,
                total.y,
                total.z,
                stats.max_magnitude,
                stats.mean_magnitude
            );
        }
    }

    for (i, ring) in rings.iter().enumerate() {
        println!("Ring {}: last force {}, torque {}", i, ring.force, ring.torque);
    }
    println!("Finished {} frames", engine.frame());
    Ok(())
}
