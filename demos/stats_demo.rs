use clap::Parser;
use int_value_map::IntValueMap;
use int_value_map::MapConfig;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.65)]
    load_factor: f32,

    /// Percentage of entries removed before compacting.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 75)]
    remove_percent: u64,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating IntValueMap with target capacity: {} and load factor: {}",
        args.target_capacity, args.load_factor
    );

    let config = MapConfig::new(i32::MIN)
        .with_initial_capacity(args.target_capacity)
        .with_load_factor(args.load_factor);
    let mut map: IntValueMap<u64> = match IntValueMap::with_config(config) {
        Ok(map) => map,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };

    println!("Actual capacity: {}", map.capacity());
    println!("Resize threshold: {}", map.resize_threshold());
    println!("Filling map up to the resize threshold...");

    let num_values = map.resize_threshold() as u64;
    for i in 0..num_values {
        if let Err(err) = map.put(i, i as i32) {
            panic!("insert of {i} failed: {err}");
        }
    }

    println!("Inserted {} values into map", map.len());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    map.probe_histogram().print();
    map.debug_stats().print();

    let to_remove = num_values * args.remove_percent.min(100) / 100;
    println!("Removing {to_remove} values and compacting...");
    map.retain(|key, _| *key >= to_remove);
    map.compact();

    println!("Capacity after compaction: {}", map.capacity());
    map.probe_histogram().print();
    map.debug_stats().print();
}
