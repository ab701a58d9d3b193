mod cli;

use btc_transfer::{
    from_base_units, Coin, EsploraClient, FeePriority, NetworkConfig, TransactionStatus,
};
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    // Initialize logger (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = NetworkConfig::from_env_with_testnet(cli.testnet);
    if let Commands::Wait(args) = &cli.command {
        let interval = config.poll_interval;
        config = config.with_polling(interval, args.max_polls);
    }

    log::debug!("Using indexer {} on {}", config.api_url, config.network());
    let client = EsploraClient::new(config.clone())?;
    let coin = Coin::new(&client, &config);

    match cli.command {
        Commands::Balance(args) => {
            let balance = coin.balance(&args.address)?;
            println!("{} {}", from_base_units(balance), coin.symbol());
        }
        Commands::Send(args) => {
            let priority = FeePriority::try_from(args.priority)?;
            let intent = coin.transfer(&args.from, &args.to, &args.amount)?;
            let signed = coin.signer().sign(intent, &args.wif, priority)?;
            let fee = signed.fee();
            let txid = coin.broadcaster().send(signed)?;

            println!("txid: {}", txid);
            println!("fee:  {} {}", from_base_units(fee), coin.symbol());

            let mut tracker = coin.track(txid.to_string());
            println!("url:  {}", tracker.url());
            if args.wait {
                let status = tracker.await_finality();
                println!("status: {}", status);
                if status != TransactionStatus::Confirmed {
                    anyhow::bail!("Transaction {} did not confirm", txid);
                }
            }
        }
        Commands::Status(args) => {
            let mut tracker = coin.track(args.txid);
            let status = tracker.status()?;
            println!("status:        {}", status);
            println!("confirmations: {}", tracker.confirmation_count()?);
            println!("block height:  {}", tracker.block_height()?);
            if let Some(time) = tracker.block_timestamp()? {
                println!("block time:    {}", time.to_rfc3339());
            }
            println!("fee:           {} {}", from_base_units(tracker.fee()?), coin.symbol());
            println!("url:           {}", tracker.url());
        }
        Commands::Wait(args) => {
            let status = coin.track(args.txid).await_finality();
            println!("{}", status);
            if status != TransactionStatus::Confirmed {
                std::process::exit(1);
            }
        }
        Commands::Verify(args) => {
            let mut tx = coin.transaction(args.txid);
            let status = tx.verify_transfer(args.direction.into(), &args.address, &args.amount)?;
            println!("{}", status);
            if status == TransactionStatus::Failed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
