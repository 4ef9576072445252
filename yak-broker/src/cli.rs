use clap::Parser;

/// YAK broker node.
#[derive(Debug, Parser)]
#[command(name = "yak-broker", about = "A replicated, topic-partitioned message broker")]
pub struct Opts {
    /// This broker's numeric identity. Must be unique within the cluster.
    #[arg(long)]
    pub broker_id: u64,

    /// Port the HTTP surface listens on.
    #[arg(long)]
    pub port: u16,

    /// Host of the external coordinator.
    #[arg(long, default_value = "127.0.0.1")]
    pub redis_host: String,

    /// Port of the external coordinator.
    #[arg(long, default_value_t = 6379)]
    pub redis_port: u16,

    /// Host peers should use to reach this broker; defaults to `127.0.0.1`
    /// when not given.
    #[arg(long)]
    pub advertise_host: Option<String>,

    /// Root directory under which `broker-<id>/<topic>/partition-0/` is kept.
    #[arg(long, default_value = "./data")]
    pub data_root: std::path::PathBuf,
}

impl Opts {
    pub fn advertise_host(&self) -> String {
        self.advertise_host.clone().unwrap_or_else(|| "127.0.0.1".to_string())
    }
}
