use clap::Parser;
use waldur_provision::core::floating_ip;
use waldur_provision::utils::{logger, validation::Validate};
use waldur_provision::{reconcile, CliConfig, Command, WaldurClient};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let client = WaldurClient::new(&config.api_url, &config.access_token);

    let result = match &config.command {
        Command::SecurityGroup(args) => match args.to_request() {
            Ok(request) => reconcile(&client, &request)
                .await
                .and_then(|outcome| Ok(serde_json::to_value(outcome)?)),
            Err(e) => Err(e),
        },
        Command::FloatingIp(args) => floating_ip::assign(&client, &args.to_request())
            .await
            .map(|meta| serde_json::json!({ "changed": true, "meta": meta })),
    };

    match result {
        Ok(output) => {
            // Single JSON object on stdout, logs stay on stderr.
            println!("{}", output);
        }
        Err(e) => {
            tracing::error!("Provisioning failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
