use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use vgsales_viewer::data::export::save_csv;
use vgsales_viewer::data::model::Record;

/// Write a synthetic sales table in the `vgsales.csv` layout.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Cli {
    /// Output file.
    #[arg(default_value = "vgsales.csv")]
    output: PathBuf,

    /// Number of rows.
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// PRNG seed; the same seed always gives the same file.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Heavy-tailed sales figure in millions, rounded like the source (0.01).
    fn sales(&mut self, scale: f64) -> f64 {
        let u = self.next_f64().max(1e-12);
        round2(-u.ln() * scale * self.next_f64().powi(3))
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

const PLATFORMS: [&str; 10] = [
    "Wii", "NES", "GB", "DS", "X360", "PS3", "PS2", "SNES", "PS4", "3DS",
];
const GENRES: [&str; 12] = [
    "Action",
    "Adventure",
    "Fighting",
    "Misc",
    "Platform",
    "Puzzle",
    "Racing",
    "Role-Playing",
    "Shooter",
    "Simulation",
    "Sports",
    "Strategy",
];
const PUBLISHERS: [&str; 8] = [
    "Nintendo",
    "Electronic Arts",
    "Activision",
    "Sony Computer Entertainment",
    "Ubisoft",
    "Take-Two Interactive",
    "THQ",
    "Sega",
];
const TITLE_HEADS: [&str; 10] = [
    "Super", "Legend of", "Grand", "Final", "Mega", "Street", "Call of", "Wii", "Pokemon", "Dragon",
];
const TITLE_TAILS: [&str; 10] = [
    "Quest", "Kart", "Fighter", "Racer", "Party", "Saga", "Duty", "Sports", "Adventure", "World",
];

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut rng = SimpleRng::new(cli.seed);

    let mut records: Vec<Record> = (0..cli.rows)
        .map(|i| {
            let head = rng.pick(&TITLE_HEADS);
            let tail = rng.pick(&TITLE_TAILS);
            let name = format!("{head} {tail} {}", i % 97 + 1);
            // About 2% unknown years and 1% unknown publishers, as in the real table.
            let year = (rng.next_f64() >= 0.02).then(|| 1980 + (rng.next_u64() % 37) as i32);
            let publisher = (rng.next_f64() >= 0.01).then(|| rng.pick(&PUBLISHERS).to_string());
            let sales_na = rng.sales(1.2);
            let sales_eu = rng.sales(0.7);
            let sales_jp = rng.sales(0.4);
            let sales_other = rng.sales(0.2);
            Record {
                rank: 0,
                name,
                platform: rng.pick(&PLATFORMS).to_string(),
                year,
                genre: rng.pick(&GENRES).to_string(),
                publisher,
                sales_na,
                sales_eu,
                sales_jp,
                sales_other,
                sales_global: round2(sales_na + sales_eu + sales_jp + sales_other),
            }
        })
        .collect();

    // Rank by global sales, ties in generation order.
    records.sort_by(|a, b| b.sales_global.total_cmp(&a.sales_global));
    for (i, rec) in records.iter_mut().enumerate() {
        rec.rank = i as u32 + 1;
    }

    let written = save_csv(&cli.output, &records)?;
    println!("Wrote {written} records to {}", cli.output.display());
    Ok(())
}
