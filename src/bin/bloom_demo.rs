use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bloom_filters::{BloomFilter, BloomFilterBuilder, DigestAlgorithm};

const ELEMENT_LEN: usize = 200;

#[derive(Parser)]
#[command(name = "bloom_demo", about = "Bloom filter demonstration and benchmark")]
struct Cli {
    /// Log filter decisions (overridden by RUST_LOG)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print sizing and false positive probabilities of an empty filter
    Stats {
        #[arg(long, default_value_t = 1000)]
        bit_set_size: usize,
        #[arg(long, default_value_t = 100)]
        capacity: usize,
        /// Element counts to evaluate the false positive probability at
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        at: Vec<f64>,
    },

    /// Time add() and contains() on random elements
    Bench {
        #[arg(long, default_value_t = 500)]
        elements: usize,
        /// Total bits; defaults to 100 bits per element
        #[arg(long)]
        bit_set_size: Option<usize>,
        #[arg(long, default_value_t = DigestAlgorithm::Md5)]
        digest: DigestAlgorithm,
        /// Run the element and hash count sweeps instead of a single run
        #[arg(long, default_value_t = false)]
        sweep: bool,
    },

    /// Fill, probe, clear, compare and overflow a filter step by step
    Walkthrough {
        #[arg(long, default_value_t = 500)]
        capacity: usize,
        #[arg(long, default_value_t = 1000)]
        bit_set_size: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Cmd::Stats {
            bit_set_size,
            capacity,
            at,
        } => stats(bit_set_size, capacity, &at),
        Cmd::Bench {
            elements,
            bit_set_size,
            digest,
            sweep,
        } => {
            if sweep {
                bench_sweep(digest)
            } else {
                let bit_set_size = bit_set_size.unwrap_or(elements.saturating_mul(100));
                bench(elements, bit_set_size, digest)
            }
        }
        Cmd::Walkthrough {
            capacity,
            bit_set_size,
        } => walkthrough(bit_set_size, capacity),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn random_elements(count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            OsRng
                .sample_iter(&Alphanumeric)
                .take(ELEMENT_LEN)
                .map(char::from)
                .collect()
        })
        .collect()
}

fn print_sizing(filter: &BloomFilter) {
    println!("Elements in the bloom filter: {}", filter.elements_count());
    println!("Bit set size: {}", filter.bit_set_size());
    println!("Bits per element: {}", filter.bits_per_element());
    println!("Hash functions: {}", filter.hash_functions_count());
}

fn stats(bit_set_size: usize, capacity: usize, at: &[f64]) -> Result<()> {
    let filter = BloomFilter::with_bit_set_size(bit_set_size, capacity)?;

    println!(
        "Bloom filter with {} requested bits and {} expected elements",
        bit_set_size, capacity
    );
    print_sizing(&filter);
    println!(
        "Expected false positive probability: {}",
        filter.expected_false_positive_probability()
    );
    println!(
        "False positive probability with no added elements: {}",
        filter.false_positive_probability()
    );
    for n in at {
        if *n < 0.0 {
            bail!("element count must not be negative: {}", n);
        }
        println!(
            "False positive probability with {} added elements: {}",
            n,
            filter.false_positive_probability_at(*n)
        );
    }

    Ok(())
}

fn print_rate(label: &str, count: usize, started: Instant) {
    let seconds = started.elapsed().as_secs_f64();
    let rate = if seconds > 0.0 {
        count as f64 / seconds
    } else {
        f64::INFINITY
    };
    println!("{}: {:.6}s, {:.0} elements/s", label, seconds, rate);
}

fn bench(elements: usize, bit_set_size: usize, digest: DigestAlgorithm) -> Result<()> {
    let mut filter = BloomFilterBuilder::with_bit_set_size(bit_set_size, elements)
        .digest(digest)
        .build()?;

    let existing = random_elements(elements);
    let missing = random_elements(elements);

    println!(
        "Testing performance with {} elements, {} bits, {} hash functions ({})",
        elements,
        filter.bit_set_size(),
        filter.hash_functions_count(),
        filter.digest_algorithm()
    );

    let started = Instant::now();
    for element in &existing {
        filter.add(element)?;
    }
    print_rate("add()", elements, started);

    let started = Instant::now();
    let present = existing.iter().filter(|e| filter.contains(*e)).count();
    print_rate("contains(), existing", elements, started);

    let started = Instant::now();
    let false_positives = missing.iter().filter(|e| filter.contains(*e)).count();
    print_rate("contains(), nonexisting", elements, started);

    println!("Maybes for existing elements: {}/{}", present, elements);
    println!(
        "False positives: {}/{} (expected rate {:.6})",
        false_positives,
        elements,
        filter.false_positive_probability()
    );
    println!();

    Ok(())
}

fn bench_sweep(digest: DigestAlgorithm) -> Result<()> {
    let base = 500;

    // More elements at a fixed 100 bits per element.
    let mut factor = 1;
    while factor <= 100 {
        bench(base * factor, 10_000 * 5 * factor, digest)?;
        factor *= 10;
    }

    // Fewer elements in a fixed million bits, so more hash functions.
    let mut divisor = 1;
    while divisor <= 100 {
        bench(base / divisor, 1_000_000, digest)?;
        divisor *= 5;
    }

    Ok(())
}

fn walkthrough(bit_set_size: usize, capacity: usize) -> Result<()> {
    if capacity < 2 {
        bail!("walkthrough needs a capacity of at least 2, got {}", capacity);
    }

    let mut filter = BloomFilter::with_bit_set_size(bit_set_size, capacity)?;
    println!(
        "Bloom filter with {} requested bits and {} expected elements",
        bit_set_size, capacity
    );
    print_sizing(&filter);

    let elements = random_elements(capacity);
    let half = capacity / 2;

    println!("Adding {} random elements", half);
    for element in &elements[..half] {
        filter.add(element)?;
    }
    println!("False positive probability: {}", filter.false_positive_probability());
    println!("Elements in the bloom filter: {}", filter.elements_count());

    filter.add("evgeni")?;
    println!("Added element: evgeni");
    println!(
        "False positive probability now: {}",
        filter.false_positive_probability()
    );

    if filter.contains("evgeni") {
        println!("Contains evgeni: maybe => everything is ok");
    } else {
        println!("Contains evgeni: definitely not => something went wrong");
    }
    if filter.contains("61769") {
        println!("Contains 61769: maybe => false positive");
    } else {
        println!("Contains 61769: definitely not => everything is ok");
    }

    filter.clear();
    info!("filter cleared");
    println!("Bloom filter is cleared");
    println!("Bloom filter is empty: {}", filter.is_empty());
    println!("Elements in the bloom filter: {}", filter.elements_count());

    println!("Adding {} random elements generated before", capacity);
    for element in &elements {
        filter.add(element)?;
    }
    let maybes = elements.iter().filter(|e| filter.contains(*e)).count();
    println!("{} maybes out of {}", maybes, capacity);

    let same = &filter;
    println!("Equal to itself: {}", filter == *same);
    let fresh = BloomFilter::with_bit_set_size(bit_set_size, capacity)?;
    println!("Equal to a fresh filter of the same size: {}", filter == fresh);

    match filter.add("a") {
        Err(err) if err.is_capacity_exceeded() => {
            println!("Adding element {} failed as expected: {}", capacity + 1, err)
        }
        Err(err) => return Err(err.into()),
        Ok(()) => bail!("full filter accepted element {}", capacity + 1),
    }

    Ok(())
}
