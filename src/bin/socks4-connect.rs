use std::env;

use log::{error, info};
use socks4::{from_url, ConnectConfig, Dialer, TcpOpener};
use tokio::io::{self, AsyncWriteExt};
use tokio::runtime::Runtime;

fn main() {
    let mut args = env::args();
    if args.len() != 2 {
        println!("Usage: {} config.toml", args.next().unwrap_or_default());
        return;
    }

    env_logger::builder()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let path = args.nth(1).unwrap_or_default();
    let config = match ConnectConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("load {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(config)) {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: ConnectConfig) -> std::io::Result<()> {
    let mut dialer = from_url(&config.proxy, TcpOpener)?;
    if let Some(identity) = config.identity {
        dialer.config_mut().identity = identity;
    }

    let stream = dialer.dial("tcp", &config.target).await?;
    info!("Proxy - {} via {}", config.target, config.proxy);

    let (mut reader, mut writer) = io::split(stream);
    let upload = async {
        io::copy(&mut io::stdin(), &mut writer).await?;
        writer.shutdown().await
    };
    let download = async {
        let mut stdout = io::stdout();
        io::copy(&mut reader, &mut stdout).await?;
        stdout.flush().await
    };

    futures::try_join!(upload, download)?;
    Ok(())
}
