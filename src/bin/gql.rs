use std::process::ExitCode;

use graphql_clap::{interrupted, App, AppError, CliConfig, HttpTransport, Settings};

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("gql: {err}");
            return ExitCode::FAILURE;
        }
    };
    let dispatch = match settings.log.dispatch() {
        Ok(dispatch) => dispatch,
        Err(err) => {
            eprintln!("gql: failed to set up logging: {err}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = tracing::dispatcher::set_default(&dispatch);
    for warning in &settings.log.warnings {
        tracing::warn!("{warning}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Cli(err)) => {
            let _ = err.print();
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
        Err(err) => {
            tracing::error!(
                config = %settings.document_path.display(),
                error = %err,
                "failed to run command"
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: &Settings) -> Result<(), AppError> {
    let config = CliConfig::new(settings.command_name(), env!("CARGO_PKG_DESCRIPTION"));
    let app = App::load(&settings.document_path, config)?;
    let transport = HttpTransport::new(settings.endpoint.clone(), settings.timeout)?;
    tracing::debug!(url = transport.url(), "executing cli");

    let mut stdout = std::io::stdout().lock();
    app.run(&transport, std::env::args_os(), &mut stdout, interrupted())
        .await
}
