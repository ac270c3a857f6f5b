use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Cost model the synthetic links follow: `cost = COST_SCALE · distM^COST_EXPONENT`.
const COST_SCALE: f64 = 2.5;
const COST_EXPONENT: f64 = 1.1;
const PATCHES: usize = 40;
const LINKSET: &str = "sample";

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One link between two habitat patches.
struct Link {
    id: i64,
    patches: String,
    cost: f64,
    distance: f64,
}

/// Patches scattered over a 20 km square; every pair closer than 6 km is linked.
fn generate_links(rng: &mut SimpleRng) -> Vec<Link> {
    let patches: Vec<(f64, f64)> = (0..PATCHES)
        .map(|_| (rng.next_f64() * 20_000.0, rng.next_f64() * 20_000.0))
        .collect();

    let mut links = Vec::new();
    for i in 0..PATCHES {
        for j in (i + 1)..PATCHES {
            let (dx, dy) = (patches[i].0 - patches[j].0, patches[i].1 - patches[j].1);
            let distance = (dx * dx + dy * dy).sqrt();
            if distance > 6_000.0 {
                continue;
            }
            // Multiplicative log-normal noise keeps costs positive.
            let cost = COST_SCALE * distance.powf(COST_EXPONENT) * rng.gauss(0.0, 0.15).exp();
            links.push(Link {
                id: links.len() as i64 + 1,
                patches: format!("{}-{}", i + 1, j + 1),
                cost,
                distance,
            });
        }
    }
    links
}

fn write_csv(path: &Path, links: &[Link]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["ID", "Patches", "Dist", "DistM"])?;
    for link in links {
        writer.write_record([
            link.id.to_string(),
            link.patches.clone(),
            format!("{:.3}", link.cost),
            format!("{:.3}", link.distance),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, links: &[Link]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("ID", DataType::Int64, false),
        Field::new("Patches", DataType::Utf8, false),
        Field::new("Dist", DataType::Float64, false),
        Field::new("DistM", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(links.iter().map(|l| l.id))),
            Arc::new(StringArray::from_iter_values(links.iter().map(|l| l.patches.as_str()))),
            Arc::new(Float64Array::from_iter_values(links.iter().map(|l| l.cost))),
            Arc::new(Float64Array::from_iter_values(links.iter().map(|l| l.distance))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut dir = PathBuf::from(".");
    let mut parquet = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--parquet" => parquet = true,
            other => dir = PathBuf::from(other),
        }
    }
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let links = generate_links(&mut rng);

    let csv_path = dir.join(format!("{LINKSET}-links.csv"));
    write_csv(&csv_path, &links)?;
    log::info!("Wrote {} links to {}", links.len(), csv_path.display());

    if parquet {
        let pq_path = dir.join(format!("{LINKSET}-links.parquet"));
        write_parquet(&pq_path, &links)?;
        log::info!("Wrote {} links to {}", links.len(), pq_path.display());
    }

    // Project marker so the viewer can be pointed at the directory's project.
    let project_path = dir.join(format!("{LINKSET}.xml"));
    if !project_path.exists() {
        std::fs::write(&project_path, "").context("writing project marker")?;
    }

    println!(
        "Wrote {} links (cost = {COST_SCALE} · distM^{COST_EXPONENT}) to {}",
        links.len(),
        dir.display()
    );
    Ok(())
}
