use clap::{Parser as ClapParser, ValueEnum};
use std::process;

use varhandle::{
    ByteOrder,
    stress::{self, StressOp, StressSettings, StressTarget},
};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Order {
    Big,
    Little,
    Native,
}

#[derive(ClapParser, Debug)]
#[command(author, version, about = "Hammer one shared long through a VarHandle", long_about = None)]
struct Cli {
    #[arg(short, long, default_value_t = 4, help = "Number of worker threads")]
    threads: usize,

    #[arg(short, long, default_value_t = 100_000, help = "Increments per thread")]
    iterations: u64,

    #[arg(long, value_enum, default_value_t = StressTarget::ArrayElement)]
    target: StressTarget,

    #[arg(long, value_enum, default_value_t = StressOp::GetAndAdd)]
    op: StressOp,

    /// Byte order of the view targets
    #[arg(long, value_enum, default_value_t = Order::Native)]
    order: Order,

    /// Run every target/operation pair instead of a single one
    #[arg(long)]
    all: bool,
}

impl From<Order> for ByteOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Big => ByteOrder::BigEndian,
            Order::Little => ByteOrder::LittleEndian,
            Order::Native => ByteOrder::NATIVE,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let base = StressSettings {
        threads: cli.threads,
        iterations: cli.iterations,
        target: cli.target,
        op: cli.op,
        order: cli.order.into(),
    };

    let runs: Vec<StressSettings> = if cli.all {
        let base = &base;
        StressTarget::value_variants()
            .iter()
            .flat_map(|&target| {
                StressOp::value_variants().iter().map(move |&op| StressSettings {
                    target,
                    op,
                    ..base.clone()
                })
            })
            .collect()
    } else {
        vec![base]
    };

    for settings in &runs {
        match stress::run(settings) {
            Ok(report) => println!("{report}"),
            Err(err) => {
                eprintln!("Error in {:?}/{:?}: {}", settings.target, settings.op, err);
                process::exit(1);
            }
        }
    }
}
