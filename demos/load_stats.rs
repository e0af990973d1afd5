use churn_set::FlaggedSet;
use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "capacity", default_value_t = 100_000)]
    capacity: usize,
    #[arg(short = 'f', long = "fill_ratio", default_value_t = 1.0)]
    fill_ratio: f64,
    #[arg(short = 'm', long = "max_id", default_value_t = 10_000_000)]
    max_id: u32,
}

fn main() {
    let args = Args::parse();

    println!(
        "Filling FlaggedSet<u32, 2, 8> (capacity {}) to {:.0}% from ids 0..{}",
        args.capacity,
        args.fill_ratio * 100.0,
        args.max_id
    );

    let mut set: FlaggedSet<u32, 2, 8> = FlaggedSet::with_capacity(args.capacity);
    let inserts = (args.capacity as f64 * args.fill_ratio) as usize;

    let mut rng = SmallRng::seed_from_u64(336);
    let mut duplicates = 0usize;
    for _ in 0..inserts {
        if !set.insert(rng.random_range(0..args.max_id)) {
            duplicates += 1;
        }
    }

    println!("Inserted {} distinct ids ({} duplicate draws)", set.len(), duplicates);
    println!(
        "Load factor: {:.2}%",
        set.len() as f64 / set.capacity() as f64 * 100.0
    );
    println!(
        "Overflow nodes: {} ({:.4} per bucket)",
        set.overdrawn_size(),
        set.overdrawn_size() as f64 / set.capacity() as f64
    );

    let clear_start = std::time::Instant::now();
    set.clear();
    println!("clear() took {:?}", clear_start.elapsed());
}
