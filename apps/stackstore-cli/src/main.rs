use clap::{Parser, Subcommand};
use stackstore_common::{EntityKind, Location};
use stackstore_kernel::{LiveEntity, World, capture_snapshot};
use stackstore_store::StackedEntityStore;
use stackstore_tag::codec;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stackstore-cli", about = "CLI tool for stackstore operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version info
    Info,
    /// Stack a group of entities and pop them back out
    Stack {
        /// Number of entities to stack
        #[arg(short, long, default_value = "5")]
        count: usize,
    },
    /// Serialize a stack and restore it, reporting sizes
    Roundtrip {
        /// Number of entities to stack
        #[arg(short, long, default_value = "100")]
        count: usize,
        /// Maximum entries written to the checkpoint
        #[arg(short, long, default_value = "100")]
        max_amount: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("stackstore-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: entities={}", World::new().entity_count());
        }
        Commands::Stack { count } => {
            println!("Stack demo: stacking {count} entities onto one anchor");

            let mut world = World::new();
            let anchor = LiveEntity::new(EntityKind::Zombie, Location::new(0.0, 64.0, 0.0));
            let mut store = StackedEntityStore::new(&anchor);
            world.spawn(anchor);

            for i in 0..count {
                let variant = LiveEntity::new(EntityKind::Zombie, Location::new(0.0, 64.0, 0.0))
                    .with_health(20.0 - i as f64 % 10.0);
                store.add(&variant);
            }
            println!("Queued: {} entries", store.len());

            let mut visited = 0;
            store.for_each_capped(&mut world, count, |entity| {
                tracing::debug!(health = entity.health, "visiting stacked entity");
                visited += 1;
            })?;
            println!("Visited: {visited} live instances at the anchor");

            let popped = store.pop_many(count);
            println!(
                "Popped: {} snapshots, head health = {:?}",
                popped.len(),
                popped.first().and_then(|e| e.tag().get_f64("Health"))
            );
        }
        Commands::Roundtrip { count, max_amount } => {
            println!("Roundtrip demo: {count} entities, checkpoint cap {max_amount}");

            let anchor = LiveEntity::new(EntityKind::Skeleton, Location::new(0.0, 64.0, 0.0));
            let mut store = StackedEntityStore::new(&anchor);
            for i in 0..count {
                let variant = LiveEntity::new(EntityKind::Skeleton, Location::new(0.0, 64.0, 0.0))
                    .with_fire_ticks(i as i64 % 3);
                store.add(&variant);
            }

            let bytes = store.serialize(max_amount)?;

            // What full snapshots would have cost instead of diffs.
            let mut naive = Vec::new();
            for entry in store.get_all().iter().take(max_amount.min(store.len())) {
                codec::encode(entry.tag(), &mut naive)?;
            }

            println!("Checkpoint: {} bytes for {} entries", bytes.len(), store.len().min(max_amount));
            println!("Full snapshots would take: {} bytes", naive.len());

            let restored = StackedEntityStore::from_bytes(&anchor, &bytes)?;
            println!(
                "Restored: {} entries, match = {}",
                restored.len(),
                if restored.get_all()
                    == store
                        .get_all()
                        .into_iter()
                        .take(max_amount)
                        .collect::<Vec<_>>()
                {
                    "OK"
                } else {
                    "MISMATCH"
                }
            );
        }
    }

    Ok(())
}
