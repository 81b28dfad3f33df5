//! # Golden Path Check
//!
//! Encodes a representative entity update, decodes it and checks every field.
//!
//! Tests the full path:
//! 1. Load codec config (optional path as first argument)
//! 2. Encode header, origin, angles, velocity normal, health and name
//! 3. Decode with a fresh reader and compare within each codec's resolution
//! 4. Re-encode after reset and compare bytes
//! 5. Undersized buffer must overflow, not panic
//!
//! Exit code 0 when every check passes, 1 otherwise.

use std::time::Instant;

use tracing_subscriber::EnvFilter;
use wirebits_codec::{
    init_masks, Angles, BitReader, BitWriter, CodecConfig, CoordPrecision, Vec3,
};
use wirebits_shared::{COORD_RESOLUTION, COORD_RESOLUTION_LOWPRECISION, NORMAL_RESOLUTION};

const ENTITY_ID_BITS: u32 = 11;
const HEALTH_BITS: u32 = 8;
const YAW_BITS: u32 = 16;

struct EntityUpdate {
    entity_id: u32,
    tick_delta: u32,
    origin: Vec3,
    angles: Angles,
    velocity_dir: Vec3,
    yaw: f32,
    health: i32,
    name: &'static str,
}

impl EntityUpdate {
    fn sample() -> Self {
        Self {
            entity_id: 1337,
            tick_delta: 3,
            origin: Vec3::new(1024.5, -2047.25, 64.0),
            angles: Angles::new(-12.5, 270.0, 0.0),
            velocity_dir: Vec3::new(0.6, 0.0, -0.8),
            yaw: 90.0,
            health: -7,
            name: "player_one",
        }
    }

    fn encode(&self, writer: &mut BitWriter<'_>) {
        writer.write_unsigned(self.entity_id, ENTITY_ID_BITS);
        writer.write_var_unsigned(self.tick_delta);
        writer.write_coord_mp(self.origin.x, CoordPrecision::Full);
        writer.write_coord_mp(self.origin.y, CoordPrecision::LowPrecision);
        writer.write_coord(self.origin.z);
        writer.write_angles(self.angles);
        writer.write_vec3_normal(self.velocity_dir);
        writer.write_angle(self.yaw, YAW_BITS);
        writer.write_signed(self.health, HEALTH_BITS);
        writer.write_string(self.name);
    }
}

struct GoldenPath {
    config: CodecConfig,
    results: Vec<(&'static str, bool, f64)>,
}

impl GoldenPath {
    fn new(config: CodecConfig) -> Self {
        Self {
            config,
            results: Vec::new(),
        }
    }

    fn check(&mut self, name: &'static str, f: impl FnOnce(&CodecConfig) -> bool) {
        let start = Instant::now();
        let passed = f(&self.config);
        let elapsed_us = start.elapsed().as_secs_f64() * 1_000_000.0;
        tracing::info!(check = name, passed, elapsed_us, "check finished");
        self.results.push((name, passed, elapsed_us));
    }

    fn run_all(&mut self) {
        self.check("roundtrip", roundtrip);
        self.check("reset_reproducible", reset_reproducible);
        self.check("overflow_detected", overflow_detected);
    }

    fn print_results(&self) {
        println!();
        for (name, passed, elapsed_us) in &self.results {
            let mark = if *passed { "PASS" } else { "FAIL" };
            println!("  [{mark}] {name:<24} {elapsed_us:>10.1} us");
        }
        println!();
    }

    fn all_passed(&self) -> bool {
        self.results.iter().all(|(_, passed, _)| *passed)
    }
}

fn close(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}

fn roundtrip(config: &CodecConfig) -> bool {
    let update = EntityUpdate::sample();
    let mut storage = config.packet_buffer();
    let mut writer =
        BitWriter::from_config(storage.as_bytes_mut(), config).with_debug_name("golden_write");
    update.encode(&mut writer);
    let Ok(len) = writer.finish() else {
        return false;
    };
    tracing::info!(bytes = len, "entity update encoded");

    let bytes = &storage.as_bytes()[..len];
    let mut reader = BitReader::from_config(bytes, config).with_debug_name("golden_read");

    let entity_ok = reader.read_unsigned(ENTITY_ID_BITS) == update.entity_id;
    let tick_ok = reader.read_var_unsigned() == update.tick_delta;
    let x_ok = close(reader.read_coord_mp(CoordPrecision::Full), update.origin.x, COORD_RESOLUTION);
    let y_ok = close(
        reader.read_coord_mp(CoordPrecision::LowPrecision),
        update.origin.y,
        COORD_RESOLUTION_LOWPRECISION,
    );
    let z_ok = close(reader.read_coord(), update.origin.z, COORD_RESOLUTION);
    let angles_ok = reader
        .read_angles()
        .to_vec3()
        .max_abs_diff(update.angles.to_vec3())
        <= COORD_RESOLUTION;
    let dir_ok = reader.read_vec3_normal().max_abs_diff(update.velocity_dir) <= 4.0 * NORMAL_RESOLUTION;
    let yaw_ok = close(reader.read_angle(YAW_BITS), update.yaw, 360.0 / 65536.0);
    let health_ok = reader.read_signed(HEALTH_BITS) == update.health;
    let name_ok = reader.read_owned_string(false) == update.name;

    entity_ok
        && tick_ok
        && x_ok
        && y_ok
        && z_ok
        && angles_ok
        && dir_ok
        && yaw_ok
        && health_ok
        && name_ok
        && reader.finish().is_ok()
}

fn reset_reproducible(config: &CodecConfig) -> bool {
    let update = EntityUpdate::sample();
    let mut first = config.packet_buffer();
    let mut second = config.packet_buffer();

    let mut writer = BitWriter::from_config(first.as_bytes_mut(), config);
    update.encode(&mut writer);
    let Ok(len) = writer.finish() else {
        return false;
    };

    let mut writer = BitWriter::from_config(second.as_bytes_mut(), config);
    writer.write_string("scratch data that reset must forget");
    writer.reset();
    update.encode(&mut writer);
    let Ok(len_again) = writer.finish() else {
        return false;
    };

    len == len_again && first.as_bytes()[..len] == second.as_bytes()[..len]
}

fn overflow_detected(_config: &CodecConfig) -> bool {
    let update = EntityUpdate::sample();
    let mut small = [0u8; 8];
    let mut writer = BitWriter::new(&mut small).with_debug_name("golden_undersized");
    update.encode(&mut writer);
    writer.is_overflowed() && writer.finish().is_err() && writer.num_bits_written() <= 64
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              WIREBITS - GOLDEN PATH CHECK                        ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  Flow: encode → decode → compare → reset → overflow              ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");

    let config = match std::env::args().nth(1) {
        Some(path) => match CodecConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(%err, path = %path, "failed to load codec config");
                std::process::exit(1);
            }
        },
        None => CodecConfig::default(),
    };

    init_masks();

    let mut golden = GoldenPath::new(config);
    golden.run_all();
    golden.print_results();

    if golden.all_passed() {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
