//! voxtree - build a voxel tree from a dataset and run queries against it
//!
//! Usage:
//!   voxtree --cube 64 --rays 512 --stats
//!   voxtree --raw scan.raw --dim 256 256 128 --sample-size 2 --threshold 900 --rays 1024

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use voxtree::core::logging;
use voxtree::math::Ray;
use voxtree::voxel::{read_raw_points, sample, RawFormat, SharedTree, TreePath, VoxTree};
use voxtree::{Point, TreeConfig};

fn print_help() {
    eprintln!("voxtree - Voxel tree builder and query tool");
    eprintln!();
    eprintln!("Usage: voxtree <SOURCE> [OPTIONS]");
    eprintln!();
    eprintln!("Sources:");
    eprintln!("    --raw <FILE> --dim <X> <Y> <Z>   Raw volumetric dataset");
    eprintln!("        --sample-size <N>           Bytes per sample, 1 to 4 (default: 1)");
    eprintln!("        --threshold <T>             Samples above T are solid (default: 0)");
    eprintln!("    --terrain <SIZE>                Noise heightfield of SIZE x SIZE columns");
    eprintln!("        --seed <SEED>               Noise seed (default: 12345)");
    eprintln!("        --height <H>                Maximum column height (default: SIZE / 4)");
    eprintln!("    --cube <K>                      Solid K x K x K cube");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --config <FILE>                 Tree config as JSON");
    eprintln!("    --rays <N>                      Cast an N x N fan of rays from above");
    eprintln!("    --ball <X> <Y> <Z> <R>          Test a ball for collision");
    eprintln!("    --stats                         Print tree statistics");
    eprintln!("    -h, --help                      Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    voxtree --terrain 256 --seed 7 --rays 512 --stats");
}

#[derive(Debug)]
enum Source {
    Raw { path: PathBuf, dim: [u32; 3], sample_size: u32, threshold: u32 },
    Terrain { size: u32, seed: u32, height: Option<u32> },
    Cube(u32),
}

#[derive(Debug)]
struct Args {
    source: Source,
    config: Option<PathBuf>,
    rays: Option<u32>,
    ball: Option<(Point, f32)>,
    stats: bool,
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T, String> {
    let value = next_value(args, i, flag)?;
    value.parse().map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut raw: Option<PathBuf> = None;
    let mut dim: Option<[u32; 3]> = None;
    let mut sample_size: u32 = 1;
    let mut threshold: u32 = 0;
    let mut terrain: Option<u32> = None;
    let mut seed: u32 = 12345;
    let mut height: Option<u32> = None;
    let mut cube: Option<u32> = None;
    let mut config: Option<PathBuf> = None;
    let mut rays: Option<u32> = None;
    let mut ball: Option<(Point, f32)> = None;
    let mut stats = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--raw" => raw = Some(PathBuf::from(next_value(&args, &mut i, "--raw")?)),
            "--dim" => {
                let x = parse_value(&args, &mut i, "--dim")?;
                let y = parse_value(&args, &mut i, "--dim")?;
                let z = parse_value(&args, &mut i, "--dim")?;
                dim = Some([x, y, z]);
            }
            "--sample-size" => sample_size = parse_value(&args, &mut i, "--sample-size")?,
            "--threshold" => threshold = parse_value(&args, &mut i, "--threshold")?,
            "--terrain" => terrain = Some(parse_value(&args, &mut i, "--terrain")?),
            "--seed" => seed = parse_value(&args, &mut i, "--seed")?,
            "--height" => height = Some(parse_value(&args, &mut i, "--height")?),
            "--cube" => cube = Some(parse_value(&args, &mut i, "--cube")?),
            "--config" => config = Some(PathBuf::from(next_value(&args, &mut i, "--config")?)),
            "--rays" => rays = Some(parse_value(&args, &mut i, "--rays")?),
            "--ball" => {
                let x = parse_value(&args, &mut i, "--ball")?;
                let y = parse_value(&args, &mut i, "--ball")?;
                let z = parse_value(&args, &mut i, "--ball")?;
                let r = parse_value(&args, &mut i, "--ball")?;
                ball = Some((Point::new(x, y, z), r));
            }
            "--stats" => stats = true,
            arg => return Err(format!("Unknown option: {}", arg)),
        }
        i += 1;
    }

    let source = match (raw, terrain, cube) {
        (Some(path), None, None) => {
            let dim = dim.ok_or("--raw needs --dim X Y Z")?;
            Source::Raw { path, dim, sample_size, threshold }
        }
        (None, Some(size), None) => Source::Terrain { size, seed, height },
        (None, None, Some(k)) => Source::Cube(k),
        (None, None, None) => return Err("No data source given".to_string()),
        _ => return Err("Only one of --raw, --terrain and --cube may be given".to_string()),
    };

    Ok(Args { source, config, rays, ball, stats })
}

fn run(args: &Args) -> voxtree::Result<()> {
    let config = match &args.config {
        Some(path) => TreeConfig::load(path)?,
        None => TreeConfig::default(),
    };
    let grid = config.grid();

    let mut points = match &args.source {
        Source::Raw { path, dim, sample_size, threshold } => {
            let format = RawFormat::new(*dim, *sample_size, *threshold);
            read_raw_points(path, &format, &grid)?
        }
        Source::Terrain { size, seed, height } => {
            sample::terrain(*size, *seed, height.unwrap_or(*size / 4), &grid)
        }
        Source::Cube(k) => sample::cube(*k, &grid),
    };

    let start = Instant::now();
    let tree = VoxTree::build_with_config(&config, &mut points);
    log::info!("Built tree of {} voxels in {:.2?}", tree.voxel_count(), start.elapsed());
    if let Some(bbox) = tree.bounding_box() {
        log::info!("Bounding box: {} .. {}", bbox.min, bbox.max);
    }

    if args.stats {
        log::info!("Tree statistics:\n{}", tree.stats());
    }

    if let Some((center, radius)) = args.ball {
        let hit = tree.ball_collide(center, radius);
        log::info!("Ball at {} radius {}: {}", center, radius, if hit { "collides" } else { "free" });
    }

    if let Some(n) = args.rays {
        cast_fan(tree, n);
    }

    Ok(())
}

/// Rays from a point above the scene through an n x n grid on its floor
fn fan(tree: &VoxTree, n: u32) -> Vec<Ray> {
    let Some(bbox) = tree.bounding_box() else {
        return Vec::new();
    };
    let size = bbox.size();
    let eye = Point::new(bbox.center().x, bbox.max.y + size.y.max(1.0), bbox.center().z);
    let n = n.max(1);
    let mut rays = Vec::with_capacity(n as usize * n as usize);
    for i in 0..n {
        for j in 0..n {
            let u = (i as f32 + 0.5) / n as f32;
            let v = (j as f32 + 0.5) / n as f32;
            let target = Point::new(bbox.min.x + u * size.x, bbox.min.y, bbox.min.z + v * size.z);
            rays.push(Ray::new(eye, target - eye));
        }
    }
    rays
}

fn cast_fan(tree: VoxTree, n: u32) {
    let rays = fan(&tree, n);
    if rays.is_empty() {
        log::warn!("Tree is empty, no rays cast");
        return;
    }

    // Neighbouring rays in scan order, so the previous path is usually close
    let start = Instant::now();
    let mut path = TreePath::new();
    let mut local_hits = 0usize;
    let mut hits = 0usize;
    for ray in &rays {
        let hit = match tree.local_ray_intersect(&path, ray.origin, ray.direction) {
            Some(hit) => {
                local_hits += 1;
                Some(hit)
            }
            None => tree.ray_intersect_with_path(ray.origin, ray.direction, &mut path),
        };
        hits += hit.is_some() as usize;
    }
    let elapsed = start.elapsed();
    log::info!(
        "Sequential: {} rays, {} hits ({} from local search) in {:.2?} ({:.0} rays/sec)",
        rays.len(),
        hits,
        local_hits,
        elapsed,
        rays.len() as f64 / elapsed.as_secs_f64().max(1e-9),
    );

    let shared = SharedTree::new(tree);
    let start = Instant::now();
    let parallel_hits = shared.cast_rays(&rays).iter().filter(|h| h.is_some()).count();
    let elapsed = start.elapsed();
    log::info!(
        "Parallel:   {} rays, {} hits in {:.2?} ({:.0} rays/sec)",
        rays.len(),
        parallel_hits,
        elapsed,
        rays.len() as f64 / elapsed.as_secs_f64().max(1e-9),
    );
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
