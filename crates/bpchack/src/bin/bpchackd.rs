use bpchack::{
    configs::settings::{CmdLineConf, Settings},
    errors::ApplicationResult,
    logger,
};

#[tokio::main]
async fn main() -> ApplicationResult<()> {
    let cmd_line = <CmdLineConf as clap::Parser>::parse();

    // .env may carry BPCHACK_CONFIG_FILE, so it loads before the config does;
    // its absence is reported once logging is up.
    let dotenv_error = dotenv::dotenv().err();

    let conf = Settings::with_config_path(cmd_line.config_path)?;
    conf.validate()?;

    logger::setup();
    if let Some(error) = dotenv_error {
        tracing::warn!(%error, "error loading .env, ignoring");
    }
    tracing::info!("starting bpc hack proxy");

    let server = bpchack::start_server(conf.clone()).await?;
    tracing::info!(listen = %conf.listen_address, "starting http api server");
    server.await?;

    tracing::warn!("http api server closed");
    Ok(())
}
